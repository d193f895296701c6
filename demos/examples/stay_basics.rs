// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene, history and rendering basics.
//!
//! Appends a few nodes, logs, edits, renders to a printing surface and walks the
//! history back and forth.
//!
//! Run:
//! - `cargo run -p stay_demos --example stay_basics`

use kurbo::{BezPath, Point, Rect, Vec2};
use stay::{
    AppendChild, LayerHint, Paint, Rgba8, Shape, ShapeSet, Stay, StayConfig, Surface, UpdateChild,
};

struct Printer;

impl Surface for Printer {
    fn clear_layer(&mut self, layer: usize) {
        println!("  clear layer {layer}");
    }

    fn draw_path(&mut self, layer: usize, path: &BezPath, paint: &Paint) {
        println!(
            "  layer {layer}: {} elements, stroke {:?}, fill {:?}",
            path.elements().len(),
            paint.stroke,
            paint.fill
        );
    }
}

fn dump(stay: &Stay) {
    for child in stay.tools().children_by_selector("*", None).unwrap() {
        println!(
            "  {:<12} {:<20} z={:<11} bound={:?}",
            child.id().to_string(),
            child.class_name(),
            child.z_index(),
            child.bound()
        );
    }
}

fn main() {
    let mut stay = Stay::new(StayConfig::default().with_size(320.0, 240.0));
    let tools = stay.tools_mut();

    let a = tools
        .append_child(
            AppendChild::new(
                "box",
                Shape::rect(Rect::new(10.0, 10.0, 60.0, 40.0)).with_fill(Rgba8::rgb(200, 40, 40)),
            )
            .with_id("a"),
        )
        .unwrap();
    tools
        .append_child(
            AppendChild::new(
                "annotation",
                ShapeSet::named([
                    ("label", Shape::rect(Rect::new(100.0, 100.0, 140.0, 120.0))),
                    ("pin", Shape::circle((100.0, 100.0), 4.0)),
                ]),
            )
            .with_id("note")
            .with_layer(LayerHint::Top)
            .with_z_index(5),
        )
        .unwrap();
    tools.log().unwrap();
    println!("== After append ==");
    dump(&stay);

    println!("== First render ==");
    let frame = stay.render(&mut Printer);
    println!("  frame {} repainted {:?}", frame.number, frame.layers);

    let tools = stay.tools_mut();
    tools
        .update_child(&a, UpdateChild::new().class_name("box:selected").z_index(10))
        .unwrap();
    let moved = tools.move_by(Vec2::new(20.0, 0.0), None).unwrap();
    tools.zoom(2.0, Point::ZERO, Some(".annotation")).unwrap();
    tools.log().unwrap();
    println!("== After edit ==");
    dump(&stay);

    let frame = stay.render(&mut Printer);
    println!("  move visible in frame {:?} (rendered {})", moved.frame(), frame.number);

    stay.tools_mut().undo();
    println!("== After undo ==");
    dump(&stay);

    stay.tools_mut().redo();
    println!("== After redo ==");
    dump(&stay);
}
