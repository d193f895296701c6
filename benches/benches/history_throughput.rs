// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Vec2};
use stay_scene::{AppendChild, ChildRegistry, History, Shape};

fn populated(n: usize) -> (ChildRegistry, History) {
    let mut reg = ChildRegistry::new("root", "stage", Rect::new(0.0, 0.0, 4096.0, 4096.0), 2);
    for i in 0..n {
        let x = (i % 64) as f64 * 12.0;
        let y = (i / 64) as f64 * 12.0;
        reg.append(AppendChild::new("cell", Shape::rect(Rect::new(x, y, x + 10.0, y + 10.0))))
            .unwrap();
    }
    let mut history = History::new(&reg);
    history.log(&mut reg, "default-state").unwrap();
    (reg, history)
}

fn bench_log(c: &mut Criterion) {
    let mut group = c.benchmark_group("log");
    for &n in &[64usize, 512, 4096] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("append_n{n}"), |b| {
            b.iter_batched(
                || {
                    let reg =
                        ChildRegistry::new("root", "stage", Rect::new(0.0, 0.0, 4096.0, 4096.0), 2);
                    let history = History::new(&reg);
                    (reg, history)
                },
                |(mut reg, mut history)| {
                    for i in 0..n {
                        let x = i as f64;
                        reg.append(AppendChild::new("cell", Shape::circle((x, x), 3.0)))
                            .unwrap();
                    }
                    black_box(history.log(&mut reg, "default-state").unwrap())
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("pan_all_n{n}"), |b| {
            b.iter_batched(
                || populated(n),
                |(mut reg, mut history)| {
                    reg.translate("*", Vec2::new(3.0, 4.0)).unwrap();
                    black_box(history.log(&mut reg, "default-state").unwrap())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_undo_redo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo_redo");
    for &n in &[64usize, 512, 4096] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("zoom_all_n{n}"), |b| {
            b.iter_batched(
                || {
                    let (mut reg, mut history) = populated(n);
                    reg.scale_about("*", 1.5, Point::new(100.0, 100.0)).unwrap();
                    history.log(&mut reg, "default-state").unwrap();
                    (reg, history)
                },
                |(mut reg, mut history)| {
                    history.undo(&mut reg);
                    history.redo(&mut reg);
                    black_box(reg.len())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let (reg, _) = populated(4096);
    c.bench_function("contain_point_4096", |b| {
        b.iter(|| {
            let q = stay_scene::PointQuery::new(black_box(Point::new(305.0, 125.0))).first();
            black_box(reg.contain_point(&q).unwrap().len())
        });
    });
}

criterion_group!(benches, bench_log, bench_undo_redo, bench_hit_test);
criterion_main!(benches);
