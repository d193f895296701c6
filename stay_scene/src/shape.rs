// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shapes: the drawable leaves carried by scene nodes.
//!
//! The scene never does geometry on its own. It talks to shapes only through the
//! [`ShapeBehavior`] capability set:
//!
//! - [`draw`](ShapeBehavior::draw) onto a [`Surface`],
//! - [`translate`](ShapeBehavior::translate) and [`scale_about`](ShapeBehavior::scale_about)
//!   for camera moves and zooms,
//! - [`update`](ShapeBehavior::update) with a partial [`ShapeUpdate`],
//! - [`contains`](ShapeBehavior::contains), [`bound`](ShapeBehavior::bound) and
//!   [`center`](ShapeBehavior::center) for queries.
//!
//! `Clone` plays the role of copying a shape; history snapshots are plain clones.
//!
//! The variants form a closed set under [`Shape`]. They share a [`ShapeBase`] holding the
//! paint attributes, the resolved paint layer, and the back-reference to the owning node.

use alloc::vec::Vec;
use kurbo::{
    Affine, BezPath, Circle, Line, ParamCurveNearest, Point, Rect, RoundedRect, Shape as _, Size,
    Vec2,
};

use crate::types::ChildId;

/// Flattening tolerance used when converting curves to paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Smallest hit radius around strokes, so hairlines stay pickable.
pub const MIN_HIT_RADIUS: f64 = 0.5;

/// Accuracy passed to nearest-point queries.
const NEAREST_ACCURACY: f64 = 1e-6;

/// An sRGB color with 8-bit channels and straight alpha.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Paint attributes shared by every shape variant.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Fill color; `None` leaves the interior unpainted.
    pub fill: Option<Rgba8>,
    /// Stroke color; `None` skips the outline.
    pub stroke: Option<Rgba8>,
    /// Stroke width in surface units. Also widens the hit area of open shapes.
    pub stroke_width: f64,
    /// Overall opacity in `0.0..=1.0`.
    pub opacity: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Rgba8::BLACK),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

impl Paint {
    fn apply(&mut self, update: &ShapeUpdate) {
        if let Some(fill) = update.fill {
            self.fill = fill;
        }
        if let Some(stroke) = update.stroke {
            self.stroke = stroke;
        }
        if let Some(width) = update.stroke_width {
            self.stroke_width = width;
        }
        if let Some(opacity) = update.opacity {
            self.opacity = opacity;
        }
    }

    fn hit_radius(&self) -> f64 {
        (self.stroke_width * 0.5).max(MIN_HIT_RADIUS)
    }
}

/// State common to all shapes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeBase {
    /// Paint attributes.
    pub paint: Paint,
    pub(crate) layer: usize,
    pub(crate) owner: Option<ChildId>,
}

impl ShapeBase {
    /// A base with the given paint. Layer and owner are assigned when the shape is
    /// attached to a node.
    pub fn new(paint: Paint) -> Self {
        Self {
            paint,
            layer: 0,
            owner: None,
        }
    }

    /// The concrete paint layer this shape was resolved to.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// The node that owns this shape, once attached.
    pub fn owner(&self) -> Option<&ChildId> {
        self.owner.as_ref()
    }
}

/// A partial update applied by [`ShapeBehavior::update`].
///
/// Unset fields leave the shape untouched. Geometry fields apply to the variants where
/// they make sense and are ignored elsewhere.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeUpdate {
    /// New fill; `Some(None)` clears it.
    pub fill: Option<Option<Rgba8>>,
    /// New stroke; `Some(None)` clears it.
    pub stroke: Option<Option<Rgba8>>,
    /// New stroke width.
    pub stroke_width: Option<f64>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// Move the shape's reference point here: a rectangle's top-left corner, a circle's
    /// center, a line's start, or the top-left of a polyline's or path's bounds.
    pub position: Option<Point>,
    /// New size of a rectangle.
    pub size: Option<Size>,
    /// New radius of a circle, or corner radius of a rectangle.
    pub radius: Option<f64>,
}

impl ShapeUpdate {
    /// An update that only moves the reference point.
    pub fn position(position: impl Into<Point>) -> Self {
        Self {
            position: Some(position.into()),
            ..Default::default()
        }
    }
}

/// Drawing target supplied by the rendering collaborator.
///
/// Each layer is an independent surface that the render pass clears and repaints as a
/// whole when it is dirty.
pub trait Surface {
    /// Erase everything on `layer`.
    fn clear_layer(&mut self, layer: usize);
    /// Paint `path` on `layer` with `paint`.
    fn draw_path(&mut self, layer: usize, path: &BezPath, paint: &Paint);
}

/// Capability set every shape variant provides.
pub trait ShapeBehavior {
    /// Shared paint, layer and owner state.
    fn base(&self) -> &ShapeBase;
    /// Mutable access to the shared state.
    fn base_mut(&mut self) -> &mut ShapeBase;
    /// The outline as a path, used for drawing.
    fn outline(&self) -> BezPath;
    /// Axis-aligned bounds.
    fn bound(&self) -> Rect;
    /// Centroid used for area membership.
    fn center(&self) -> Point;
    /// Point containment used for hit testing.
    fn contains(&self, pt: Point) -> bool;
    /// Move by `delta`.
    fn translate(&mut self, delta: Vec2);
    /// Scale by `scale` around `origin`.
    fn scale_about(&mut self, scale: f64, origin: Point);
    /// Move the reference point to `position`.
    fn set_position(&mut self, position: Point);

    /// Resize; only meaningful for some variants.
    fn set_size(&mut self, _size: Size) {}

    /// Change the radius; only meaningful for some variants.
    fn set_radius(&mut self, _radius: f64) {}

    /// Apply a partial update.
    fn update(&mut self, update: &ShapeUpdate) {
        self.base_mut().paint.apply(update);
        if let Some(position) = update.position {
            self.set_position(position);
        }
        if let Some(size) = update.size {
            self.set_size(size);
        }
        if let Some(radius) = update.radius {
            self.set_radius(radius);
        }
    }

    /// Draw onto the shape's resolved layer.
    fn draw(&self, surface: &mut dyn Surface) {
        let base = self.base();
        surface.draw_path(base.layer, &self.outline(), &base.paint);
    }
}

fn scale_affine(scale: f64, origin: Point) -> Affine {
    Affine::translate(origin.to_vec2()) * Affine::scale(scale) * Affine::translate(-origin.to_vec2())
}

fn near_line(line: Line, pt: Point, radius: f64) -> bool {
    line.nearest(pt, NEAREST_ACCURACY).distance_sq <= radius * radius
}

/// An axis-aligned rectangle with optional rounded corners.
#[derive(Clone, Debug, PartialEq)]
pub struct RectShape {
    /// Shared state.
    pub base: ShapeBase,
    /// Geometry.
    pub rect: Rect,
    /// Corner radius.
    pub radius: f64,
}

impl ShapeBehavior for RectShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }
    fn outline(&self) -> BezPath {
        if self.radius > 0.0 {
            RoundedRect::from_rect(self.rect, self.radius).to_path(PATH_TOLERANCE)
        } else {
            self.rect.to_path(PATH_TOLERANCE)
        }
    }
    fn bound(&self) -> Rect {
        self.rect
    }
    fn center(&self) -> Point {
        self.rect.center()
    }
    fn contains(&self, pt: Point) -> bool {
        self.rect.contains(pt)
    }
    fn translate(&mut self, delta: Vec2) {
        self.rect = self.rect + delta;
    }
    fn scale_about(&mut self, scale: f64, origin: Point) {
        self.rect = scale_affine(scale, origin).transform_rect_bbox(self.rect);
        self.radius *= scale;
    }
    fn set_position(&mut self, position: Point) {
        self.rect = self.rect.with_origin(position);
    }
    fn set_size(&mut self, size: Size) {
        self.rect = self.rect.with_size(size);
    }
    fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }
}

/// A circle.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleShape {
    /// Shared state.
    pub base: ShapeBase,
    /// Geometry.
    pub circle: Circle,
}

impl ShapeBehavior for CircleShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }
    fn outline(&self) -> BezPath {
        self.circle.to_path(PATH_TOLERANCE)
    }
    fn bound(&self) -> Rect {
        self.circle.bounding_box()
    }
    fn center(&self) -> Point {
        self.circle.center
    }
    fn contains(&self, pt: Point) -> bool {
        (pt - self.circle.center).hypot2() <= self.circle.radius * self.circle.radius
    }
    fn translate(&mut self, delta: Vec2) {
        self.circle.center += delta;
    }
    fn scale_about(&mut self, scale: f64, origin: Point) {
        self.circle.center = scale_affine(scale, origin) * self.circle.center;
        self.circle.radius *= scale;
    }
    fn set_position(&mut self, position: Point) {
        self.circle.center = position;
    }
    fn set_radius(&mut self, radius: f64) {
        self.circle.radius = radius;
    }
}

/// A straight segment. Hit testing uses the stroke width.
#[derive(Clone, Debug, PartialEq)]
pub struct LineShape {
    /// Shared state.
    pub base: ShapeBase,
    /// Geometry.
    pub line: Line,
}

impl ShapeBehavior for LineShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }
    fn outline(&self) -> BezPath {
        self.line.to_path(PATH_TOLERANCE)
    }
    fn bound(&self) -> Rect {
        Rect::from_points(self.line.p0, self.line.p1)
    }
    fn center(&self) -> Point {
        self.line.p0.midpoint(self.line.p1)
    }
    fn contains(&self, pt: Point) -> bool {
        near_line(self.line, pt, self.base.paint.hit_radius())
    }
    fn translate(&mut self, delta: Vec2) {
        self.line = Line::new(self.line.p0 + delta, self.line.p1 + delta);
    }
    fn scale_about(&mut self, scale: f64, origin: Point) {
        let affine = scale_affine(scale, origin);
        self.line = Line::new(affine * self.line.p0, affine * self.line.p1);
    }
    fn set_position(&mut self, position: Point) {
        let delta = position - self.line.p0;
        self.translate(delta);
    }
}

/// An open chain of points, such as a freehand stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineShape {
    /// Shared state.
    pub base: ShapeBase,
    /// Vertices in drawing order.
    pub points: Vec<Point>,
}

impl ShapeBehavior for PolylineShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }
    fn outline(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for p in points {
                path.line_to(*p);
            }
        }
        path
    }
    fn bound(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
    }
    fn center(&self) -> Point {
        self.bound().center()
    }
    fn contains(&self, pt: Point) -> bool {
        let radius = self.base.paint.hit_radius();
        match self.points.as_slice() {
            [] => false,
            [only] => (pt - *only).hypot2() <= radius * radius,
            points => points
                .windows(2)
                .any(|w| near_line(Line::new(w[0], w[1]), pt, radius)),
        }
    }
    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }
    fn scale_about(&mut self, scale: f64, origin: Point) {
        let affine = scale_affine(scale, origin);
        for p in &mut self.points {
            *p = affine * *p;
        }
    }
    fn set_position(&mut self, position: Point) {
        let delta = position - self.bound().origin();
        self.translate(delta);
    }
}

/// An arbitrary Bézier path. Closed regions hit by winding; every segment is also
/// hittable within the stroke radius.
#[derive(Clone, Debug, PartialEq)]
pub struct PathShape {
    /// Shared state.
    pub base: ShapeBase,
    /// Geometry.
    pub path: BezPath,
}

impl ShapeBehavior for PathShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }
    fn outline(&self) -> BezPath {
        self.path.clone()
    }
    fn bound(&self) -> Rect {
        self.path.bounding_box()
    }
    fn center(&self) -> Point {
        self.bound().center()
    }
    fn contains(&self, pt: Point) -> bool {
        if self.path.contains(pt) {
            return true;
        }
        let radius = self.base.paint.hit_radius();
        self.path
            .segments()
            .any(|seg| seg.nearest(pt, NEAREST_ACCURACY).distance_sq <= radius * radius)
    }
    fn translate(&mut self, delta: Vec2) {
        self.path.apply_affine(Affine::translate(delta));
    }
    fn scale_about(&mut self, scale: f64, origin: Point) {
        self.path.apply_affine(scale_affine(scale, origin));
    }
    fn set_position(&mut self, position: Point) {
        let delta = position - self.bound().origin();
        self.translate(delta);
    }
}

/// The closed set of shape variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// See [`RectShape`].
    Rect(RectShape),
    /// See [`CircleShape`].
    Circle(CircleShape),
    /// See [`LineShape`].
    Line(LineShape),
    /// See [`PolylineShape`].
    Polyline(PolylineShape),
    /// See [`PathShape`].
    Path(PathShape),
}

macro_rules! each_variant {
    ($shape:expr, $s:ident => $body:expr) => {
        match $shape {
            Shape::Rect($s) => $body,
            Shape::Circle($s) => $body,
            Shape::Line($s) => $body,
            Shape::Polyline($s) => $body,
            Shape::Path($s) => $body,
        }
    };
}

impl Shape {
    /// A rectangle with default paint.
    pub fn rect(rect: Rect) -> Self {
        Self::Rect(RectShape {
            base: ShapeBase::default(),
            rect,
            radius: 0.0,
        })
    }

    /// A circle with default paint.
    pub fn circle(center: impl Into<Point>, radius: f64) -> Self {
        Self::Circle(CircleShape {
            base: ShapeBase::default(),
            circle: Circle::new(center, radius),
        })
    }

    /// A line segment with default paint.
    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::Line(LineShape {
            base: ShapeBase::default(),
            line: Line::new(p0, p1),
        })
    }

    /// A polyline with default paint.
    pub fn polyline(points: impl IntoIterator<Item = Point>) -> Self {
        Self::Polyline(PolylineShape {
            base: ShapeBase::default(),
            points: points.into_iter().collect(),
        })
    }

    /// A Bézier path with default paint.
    pub fn path(path: BezPath) -> Self {
        Self::Path(PathShape {
            base: ShapeBase::default(),
            path,
        })
    }

    /// Replace the paint attributes.
    #[must_use]
    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.base_mut().paint = paint;
        self
    }

    /// Set the fill color.
    #[must_use]
    pub fn with_fill(mut self, fill: Rgba8) -> Self {
        self.base_mut().paint.fill = Some(fill);
        self
    }

    /// Set the stroke color and width.
    #[must_use]
    pub fn with_stroke(mut self, stroke: Rgba8, width: f64) -> Self {
        let paint = &mut self.base_mut().paint;
        paint.stroke = Some(stroke);
        paint.stroke_width = width;
        self
    }

    /// Paint attributes.
    pub fn paint(&self) -> &Paint {
        &self.base().paint
    }

    /// Resolved paint layer.
    pub fn layer(&self) -> usize {
        self.base().layer
    }

    /// Owning node, once attached.
    pub fn owner(&self) -> Option<&ChildId> {
        self.base().owner()
    }

    /// The rectangle geometry, if this is a rectangle.
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            _ => None,
        }
    }

    pub(crate) fn attach(&mut self, owner: &ChildId, layer: usize) {
        let base = self.base_mut();
        base.owner = Some(owner.clone());
        base.layer = layer;
    }
}

impl ShapeBehavior for Shape {
    fn base(&self) -> &ShapeBase {
        each_variant!(self, s => s.base())
    }
    fn base_mut(&mut self) -> &mut ShapeBase {
        each_variant!(self, s => s.base_mut())
    }
    fn outline(&self) -> BezPath {
        each_variant!(self, s => s.outline())
    }
    fn bound(&self) -> Rect {
        each_variant!(self, s => s.bound())
    }
    fn center(&self) -> Point {
        each_variant!(self, s => s.center())
    }
    fn contains(&self, pt: Point) -> bool {
        each_variant!(self, s => s.contains(pt))
    }
    fn translate(&mut self, delta: Vec2) {
        each_variant!(self, s => s.translate(delta));
    }
    fn scale_about(&mut self, scale: f64, origin: Point) {
        each_variant!(self, s => s.scale_about(scale, origin));
    }
    fn set_position(&mut self, position: Point) {
        each_variant!(self, s => s.set_position(position));
    }
    fn set_size(&mut self, size: Size) {
        each_variant!(self, s => s.set_size(size));
    }
    fn set_radius(&mut self, radius: f64) {
        each_variant!(self, s => s.set_radius(radius));
    }
    fn update(&mut self, update: &ShapeUpdate) {
        each_variant!(self, s => s.update(update));
    }
    fn draw(&self, surface: &mut dyn Surface) {
        each_variant!(self, s => s.draw(surface));
    }
}

impl From<RectShape> for Shape {
    fn from(s: RectShape) -> Self {
        Self::Rect(s)
    }
}

impl From<CircleShape> for Shape {
    fn from(s: CircleShape) -> Self {
        Self::Circle(s)
    }
}

impl From<LineShape> for Shape {
    fn from(s: LineShape) -> Self {
        Self::Line(s)
    }
}

impl From<PolylineShape> for Shape {
    fn from(s: PolylineShape) -> Self {
        Self::Polyline(s)
    }
}

impl From<PathShape> for Shape {
    fn from(s: PathShape) -> Self {
        Self::Path(s)
    }
}
