// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-to-move through the event pipeline.
//!
//! A listener on the default drag chain moves whichever box was grabbed, remembers the
//! grab point in its compose store and logs one undo step per gesture. A second listener,
//! gated on a different state, shows state gating.
//!
//! Run:
//! - `cargo run -p stay_demos --example stay_drag`

use kurbo::{Point, Rect};
use stay::defaults::{DRAG, DRAG_END, DRAG_START};
use stay::input::{KeyKind, PointerKind, RawEvent};
use stay::store::Store;
use stay::{AppendChild, ChildId, Compose, ListenerDefinition, Shape, Stay, StayConfig};

fn main() {
    let mut stay = Stay::new(StayConfig::default().with_size(400.0, 300.0));
    for (id, x) in [("left", 20.0), ("right", 200.0)] {
        stay.tools_mut()
            .append_child(
                AppendChild::new("box", Shape::rect(Rect::new(x, 20.0, x + 60.0, 60.0)))
                    .with_id(id),
            )
            .unwrap();
    }
    stay.tools_mut().log().unwrap();

    stay.add_event_listener(
        ListenerDefinition::new("drag-box", |cx| {
            let point = cx.event.input.point;
            match cx.event.name.as_str() {
                DRAG_START => {
                    let grabbed = cx.event.target.clone();
                    Ok(Compose::none().on(DRAG_START, move |_| {
                        Store::new().with("last", point).with("grabbed", grabbed)
                    }))
                }
                DRAG => {
                    let last = cx.compose.get::<Point>("last").copied().unwrap_or(point);
                    if let Some(Some(id)) = cx.compose.get::<Option<ChildId>>("grabbed") {
                        let selector = format!("#{id}");
                        cx.tools.move_by(point - last, Some(&selector))?;
                    }
                    Ok(Compose::none().on(DRAG, move |_| Store::new().with("last", point)))
                }
                _ => {
                    cx.tools.log()?;
                    Ok(Compose::none().reset())
                }
            }
        })
        .events([DRAG_START, DRAG, DRAG_END])
        .selector(".box"),
    )
    .unwrap();

    stay.add_event_listener(
        ListenerDefinition::new("inspect", |cx| {
            println!("  inspecting in state {}", cx.tools.current_state());
            Ok(Compose::none())
        })
        .event("keyup")
        .state("inspecting"),
    )
    .unwrap();

    let gesture = [
        RawEvent::pointer(PointerKind::Down, (30.0, 30.0)),
        RawEvent::pointer(PointerKind::Move, (50.0, 40.0)),
        RawEvent::pointer(PointerKind::Move, (70.0, 50.0)),
        RawEvent::pointer(PointerKind::Up, (70.0, 50.0)),
    ];
    println!("== Gesture ==");
    for event in &gesture {
        let tick = stay.handle(event).unwrap();
        println!("  {:?} fired {:?}", event.trigger(), tick.fired);
    }

    let bound = |stay: &Stay, id: &str| stay.tools().child(&id.into()).and_then(|c| c.bound());
    println!("  left now {:?}", bound(&stay, "left"));
    println!("  right now {:?}", bound(&stay, "right"));

    stay.tools_mut().undo();
    println!("== After undo ==");
    println!("  left now {:?}", bound(&stay, "left"));

    println!("== State gating ==");
    let key = RawEvent::key(KeyKind::Up, "i");
    let tick = stay.handle(&key).unwrap();
    println!(
        "  in {}: {} invocations",
        stay.tools().current_state(),
        tick.invocations.len()
    );
    stay.tools_mut().switch_state("inspecting").unwrap();
    stay.handle(&key).unwrap();
}
