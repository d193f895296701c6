// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector algebra basics.
//!
//! Evaluates a few expressions over a fixed universe of names and shows how a malformed
//! expression is reported.
//!
//! Run:
//! - `cargo run -p stay_demos --example selector_basics`

fn main() {
    let universe = ["default-state", "drawing", "annotationSelected", "panning"];
    let subset = |token: &str| -> Vec<&str> {
        universe.iter().copied().filter(|s| *s == token).collect()
    };

    for expr in [
        "drawing | panning",
        "!drawing",
        "!(drawing | panning) & annotationSelected",
        "drawing & panning",
        "unknown | drawing",
    ] {
        let out = stay_selector::evaluate(expr, &universe, subset).unwrap();
        println!("{expr:<45} => {out:?}");
    }

    println!("== Errors ==");
    for bad in ["drawing &", "(drawing", "drawing panning )"] {
        match stay_selector::evaluate(bad, &universe, subset) {
            Ok(out) => println!("{bad:<45} => unexpectedly {out:?}"),
            Err(err) => println!("{bad:<45} => {err}"),
        }
    }
}
