// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Quadrature Benchmarks
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use criterion::{criterion_group, criterion_main, Criterion};
use fusion_math::interp::CubicHermite;
use fusion_math::quadrature::{chebgauss2, leggauss};
use fusion_math::roots::cubic_roots_in;
use std::hint::black_box;

fn bench_rule_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_construction");
    group.bench_function("leggauss_32_sin", |b| {
        b.iter(|| black_box(leggauss(black_box(32)).map(|q| q.with_automorphism())))
    });
    group.bench_function("chebgauss2_32", |b| {
        b.iter(|| black_box(chebgauss2(black_box(32))))
    });
    group.finish();
}

fn bench_hermite_eval(c: &mut Criterion) {
    let n = 1000;
    let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.0628).collect();
    let y: Vec<f64> = x.iter().map(|t| 1.0 - 0.1 * (5.0 * t).cos()).collect();
    let spline = match CubicHermite::with_finite_difference_slopes(x, y) {
        Ok(s) => s,
        Err(e) => panic!("bench spline: {e}"),
    };

    c.bench_function("hermite_eval_1000_knots", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for k in 0..256 {
                acc += spline.eval(black_box(k as f64 * 0.2437));
            }
            black_box(acc)
        })
    });
}

fn bench_segment_roots(c: &mut Criterion) {
    c.bench_function("cubic_roots_in_segment", |b| {
        b.iter(|| {
            black_box(cubic_roots_in(
                black_box([-0.00525, 0.1175, -0.75, 1.0]),
                black_box(0.5),
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_rule_construction,
    bench_hermite_eval,
    bench_segment_roots
);
criterion_main!(benches);
