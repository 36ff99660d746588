// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Polynomial Roots
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Real roots of low-order polynomials in closed form.

use std::f64::consts::PI;

/// Leading coefficients below this fraction of the largest one are treated
/// as zero, dropping to the next lower degree.
const DEGENERATE_RTOL: f64 = 1e-12;
/// Slack on the unit interval before a root is rejected as outside.
const INTERVAL_SLACK: f64 = 1e-10;
const NEWTON_POLISH_STEPS: usize = 2;

/// Real roots of a·x² + b·x + c, ascending. Linear when `a == 0`.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // Cancellation-free form.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let mut roots = if q == 0.0 {
        vec![0.0]
    } else {
        vec![q / a, c / q]
    };
    roots.sort_by(f64::total_cmp);
    roots
}

/// Real roots of a·x³ + b·x² + c·x + d, ascending.
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= DEGENERATE_RTOL * scale {
        return quadratic_roots(b, c, d);
    }
    let (b, c, d) = (b / a, c / a, d / a);
    let shift = b / 3.0;
    let p = c - b * shift;
    let q = 2.0 * shift * shift * shift - shift * c + d;
    let disc = 0.25 * q * q + p * p * p / 27.0;

    let mut roots = if disc > 0.0 {
        let s = disc.sqrt();
        let t = (-0.5 * q + s).cbrt() + (-0.5 * q - s).cbrt();
        vec![t - shift]
    } else if p == 0.0 {
        vec![-shift]
    } else {
        let r = 2.0 * (-p / 3.0).sqrt();
        let arg = (3.0 * q / (p * r)).clamp(-1.0, 1.0);
        let phi = arg.acos() / 3.0;
        (0..3)
            .map(|k| r * (phi - 2.0 * PI * k as f64 / 3.0).cos() - shift)
            .collect()
    };
    roots.sort_by(f64::total_cmp);
    roots
}

fn horner(c: &[f64; 4], s: f64) -> (f64, f64) {
    let p = c[0] + s * (c[1] + s * (c[2] + s * c[3]));
    let dp = c[1] + s * (2.0 * c[2] + s * 3.0 * c[3]);
    (p, dp)
}

/// Roots in `[0, width]` of c0 + c1·t + c2·t² + c3·t³, ascending.
///
/// Solved on the unit interval after rescaling t = width·s, then polished by
/// Newton steps on the scaled polynomial.
pub fn cubic_roots_in(coeffs: [f64; 4], width: f64) -> Vec<f64> {
    if width.is_nan() || width <= 0.0 {
        return Vec::new();
    }
    let scaled = [
        coeffs[0],
        coeffs[1] * width,
        coeffs[2] * width * width,
        coeffs[3] * width * width * width,
    ];
    let mut roots: Vec<f64> = cubic_roots(scaled[3], scaled[2], scaled[1], scaled[0])
        .into_iter()
        .filter(|s| s.is_finite())
        .map(|mut s| {
            for _ in 0..NEWTON_POLISH_STEPS {
                let (p, dp) = horner(&scaled, s);
                if dp == 0.0 {
                    break;
                }
                let step = p / dp;
                if !step.is_finite() {
                    break;
                }
                s -= step;
            }
            s
        })
        .filter(|&s| (-INTERVAL_SLACK..=1.0 + INTERVAL_SLACK).contains(&s))
        .map(|s| s.clamp(0.0, 1.0) * width)
        .collect();
    roots.sort_by(f64::total_cmp);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roots(found: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(found.len(), expected.len(), "{found:?} vs {expected:?}");
        for (f, e) in found.iter().zip(expected) {
            assert!((f - e).abs() < tol, "{found:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_quadratic_roots() {
        assert_roots(&quadratic_roots(1.0, -3.0, 2.0), &[1.0, 2.0], 1e-15);
        assert_roots(&quadratic_roots(0.0, 2.0, -1.0), &[0.5], 1e-15);
        assert_roots(&quadratic_roots(1.0, -2.0, 1.0), &[1.0], 1e-15);
        assert!(quadratic_roots(1.0, 0.0, 1.0).is_empty());
        assert!(quadratic_roots(0.0, 0.0, 1.0).is_empty());
        // Tiny root without cancellation.
        let r = quadratic_roots(1.0, -1e8, 1.0);
        assert!((r[0] - 1e-8).abs() < 1e-22, "{r:?}");
    }

    #[test]
    fn test_cubic_three_real_roots() {
        // (x − 1)(x + 2)(x − 0.5)
        let r = cubic_roots(1.0, 0.5, -2.5, 1.0);
        assert_roots(&r, &[-2.0, 0.5, 1.0], 1e-12);
    }

    #[test]
    fn test_cubic_one_real_root() {
        // (x − 2)(x² + 1)
        let r = cubic_roots(1.0, -2.0, 1.0, -2.0);
        assert_roots(&r, &[2.0], 1e-12);
    }

    #[test]
    fn test_cubic_degenerate_to_quadratic() {
        let r = cubic_roots(1e-20, 1.0, -3.0, 2.0);
        assert_roots(&r, &[1.0, 2.0], 1e-12);
        assert!(cubic_roots(0.0, 0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_cubic_roots_in_interval() {
        // (t − 0.1)(t − 0.25)(t − 0.7) on [0, 0.5]
        let (r1, r2, r3): (f64, f64, f64) = (0.1, 0.25, 0.7);
        let coeffs = [
            -r1 * r2 * r3,
            r1 * r2 + r1 * r3 + r2 * r3,
            -(r1 + r2 + r3),
            1.0,
        ];
        let r = cubic_roots_in(coeffs, 0.5);
        assert_roots(&r, &[0.1, 0.25], 1e-13);
        assert!(cubic_roots_in(coeffs, 0.0).is_empty());
    }

    #[test]
    fn test_cubic_roots_in_keeps_endpoint_root() {
        // Root exactly on the left knot.
        let r = cubic_roots_in([0.0, -1.0, 0.0, 0.0], 1.0);
        assert_roots(&r, &[0.0], 1e-15);
    }
}
