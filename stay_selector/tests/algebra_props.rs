// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the selector algebra laws.
//!
//! 1. Results are always a subset of the universe
//! 2. `!X` and `X` together cover the universe, and never overlap
//! 3. `A & A == A` and `A | A == A`
//! 4. De Morgan: `!(A | B) == !A & !B`

use proptest::prelude::*;
use stay_selector::evaluate;

// ── Strategies ──────────────────────────────────────────────────────────

const TOKENS: [&str; 4] = ["a", "b", "c", "missing"];

/// A universe of small integers plus, for each named token, a random subset.
#[derive(Debug, Clone)]
struct World {
    universe: Vec<u8>,
    members: [Vec<u8>; 3],
}

impl World {
    fn subset(&self, token: &str) -> Vec<u8> {
        match token {
            "a" => self.members[0].clone(),
            "b" => self.members[1].clone(),
            "c" => self.members[2].clone(),
            _ => Vec::new(),
        }
    }

    fn eval(&self, expr: &str) -> Vec<u8> {
        evaluate(expr, &self.universe, |t| self.subset(t)).expect("well-formed expression")
    }
}

fn world_strategy() -> impl Strategy<Value = World> {
    proptest::collection::btree_set(0u8..32, 0..16).prop_flat_map(|set| {
        let universe: Vec<u8> = set.into_iter().collect();
        let pick = proptest::sample::subsequence(universe.clone(), 0..=universe.len());
        (Just(universe), pick.clone(), pick.clone(), pick)
            .prop_map(|(universe, a, b, c)| World {
                universe,
                members: [a, b, c],
            })
    })
}

/// Random well-formed expressions over the named tokens.
fn expr_strategy() -> impl Strategy<Value = String> {
    let leaf = proptest::sample::select(TOKENS.to_vec()).prop_map(String::from);
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| format!("!{e}")),
            inner.clone().prop_map(|e| format!("({e})")),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l}) & ({r})")),
            (inner.clone(), inner).prop_map(|(l, r)| format!("({l}) | ({r})")),
        ]
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Laws
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn result_is_subset_of_universe(world in world_strategy(), expr in expr_strategy()) {
        let result = world.eval(&expr);
        for item in &result {
            prop_assert!(world.universe.contains(item));
        }
    }

    #[test]
    fn complement_covers_universe(world in world_strategy(), expr in expr_strategy()) {
        let x = world.eval(&expr);
        let not_x = world.eval(&format!("!({expr})"));
        for item in &world.universe {
            prop_assert!(x.contains(item) != not_x.contains(item));
        }
    }

    #[test]
    fn and_or_are_idempotent(world in world_strategy(), expr in expr_strategy()) {
        let x = world.eval(&expr);
        prop_assert_eq!(world.eval(&format!("({expr}) & ({expr})")), x.clone());
        prop_assert_eq!(world.eval(&format!("({expr}) | ({expr})")), x);
    }

    #[test]
    fn de_morgan(world in world_strategy(), l in expr_strategy(), r in expr_strategy()) {
        let lhs = world.eval(&format!("!(({l}) | ({r}))"));
        let rhs = world.eval(&format!("(!({l})) & (!({r}))"));
        prop_assert_eq!(lhs, rhs);
    }
}
