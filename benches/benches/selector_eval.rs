// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use stay::states::StateSet;

fn universe(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("state{i}")).collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for &n in &[8usize, 64, 512] {
        let states = universe(n);
        let expr = "(state1 | state2 | state3) & !state2 | !(state4 & state5)";
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("mixed_n{n}"), |b| {
            b.iter(|| {
                let out = stay_selector::evaluate(black_box(expr), &states, |t| {
                    states.iter().filter(|s| *s == t).cloned().collect()
                })
                .unwrap();
                black_box(out.len())
            });
        });
    }
    group.finish();
}

fn bench_long_or_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("or_chain");
    for &n in &[16usize, 128] {
        let states = universe(n);
        let expr = states.join("|");
        group.bench_function(format!("terms_n{n}"), |b| {
            b.iter(|| {
                let out = stay_selector::evaluate(black_box(&expr), &states, |t| {
                    states.iter().filter(|s| *s == t).cloned().collect()
                })
                .unwrap();
                black_box(out.len())
            });
        });
    }
    group.finish();
}

fn bench_state_gate(c: &mut Criterion) {
    let mut states = StateSet::new();
    for name in ["drawing", "annotationSelected", "panning", "erasing"] {
        states.switch(name).unwrap();
    }
    c.bench_function("state_gate_all_states_minus_one", |b| {
        b.iter(|| black_box(states.is_active(black_box("all-states & !panning")).unwrap()));
    });
    c.bench_function("validate_only", |b| {
        b.iter(|| stay_selector::validate(black_box("(a|b)&!(c|d)&e")).unwrap());
    });
}

criterion_group!(benches, bench_evaluate, bench_long_or_chain, bench_state_gate);
criterion_main!(benches);
