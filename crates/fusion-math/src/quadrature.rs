// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Quadrature rules on the canonical interval [-1, 1].
//!
//! Chebyshev rules are returned with the weight function folded into the
//! weights, so every rule here integrates `f(x)` directly:
//!   ∫₋₁¹ f(x) dx ≈ Σ w_i f(x_i)
//! Nodes are always ascending.

use fusion_types::error::{FusionError, FusionResult};
use std::f64::consts::{FRAC_PI_2, PI};

const LEGENDRE_NEWTON_TOL: f64 = 1e-15;
const LEGENDRE_NEWTON_MAX_ITER: usize = 100;

/// Nodes and weights on [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrature {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl Quadrature {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Σ w_i f(x_i).
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(x))
            .sum()
    }

    /// Compose with the sine automorphism x ↦ sin(πx/2).
    ///
    /// Clusters nodes toward ±1, which suits integrands with inverse
    /// square-root singularities at both endpoints.
    pub fn with_automorphism(&self) -> Quadrature {
        Quadrature {
            nodes: self.nodes.iter().map(|&x| automorphism_sin(x)).collect(),
            weights: self
                .nodes
                .iter()
                .zip(&self.weights)
                .map(|(&x, &w)| w * grad_automorphism_sin(x))
                .collect(),
        }
    }
}

fn require_order(rule: &str, n: usize, min: usize) -> FusionResult<()> {
    if n < min {
        return Err(FusionError::ConfigError(format!(
            "{rule} quadrature needs at least {min} nodes, got {n}"
        )));
    }
    Ok(())
}

/// Midpoint rule with `n` equal cells.
pub fn uniform(n: usize) -> FusionResult<Quadrature> {
    require_order("uniform", n, 1)?;
    let h = 2.0 / n as f64;
    Ok(Quadrature {
        nodes: (0..n).map(|i| -1.0 + (i as f64 + 0.5) * h).collect(),
        weights: vec![h; n],
    })
}

/// Open Simpson rule: composite Simpson on an interior sub-interval,
/// completed by one midpoint cell at each boundary.
///
/// Uses `n` nodes when `n` is odd and `n - 1` when it is even. Never places a
/// node on ±1.
pub fn simpson2(n: usize) -> FusionResult<Quadrature> {
    require_order("open Simpson", n, 5)?;
    // Simpson needs an odd number of interior nodes.
    let m = if n % 2 == 0 { n - 3 } else { n - 2 };
    let h = 2.0 / (m + 1) as f64;

    let mut nodes = Vec::with_capacity(m + 2);
    let mut weights = Vec::with_capacity(m + 2);
    nodes.push(-1.0 + 0.5 * h);
    weights.push(h);
    for i in 0..m {
        nodes.push(-1.0 + (i + 1) as f64 * h);
        let coeff = if i == 0 || i == m - 1 {
            1.0
        } else if i % 2 == 1 {
            4.0
        } else {
            2.0
        };
        weights.push(coeff * h / 3.0);
    }
    nodes.push(1.0 - 0.5 * h);
    weights.push(h);
    Ok(Quadrature { nodes, weights })
}

/// Legendre polynomial P_n(x) and its derivative by the three-term recurrence.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

/// Gauss–Legendre rule of order `n`.
pub fn leggauss(n: usize) -> FusionResult<Quadrature> {
    require_order("Gauss-Legendre", n, 2)?;
    let nf = n as f64;
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    for i in 0..n.div_ceil(2) {
        let mut x = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..LEGENDRE_NEWTON_MAX_ITER {
            let (p, d) = legendre(n, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() <= LEGENDRE_NEWTON_TOL {
                break;
            }
        }
        let (_, d) = legendre(n, x);
        if d.is_finite() {
            dp = d;
        }
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        if !x.is_finite() || !w.is_finite() {
            return Err(FusionError::PhysicsViolation(format!(
                "Gauss-Legendre root {i} of order {n} did not converge"
            )));
        }
        // Root i is the i-th largest; mirror it for the negative half.
        nodes[n - 1 - i] = x;
        nodes[i] = -x;
        weights[n - 1 - i] = w;
        weights[i] = w;
    }
    if n % 2 == 1 {
        nodes[n / 2] = 0.0;
    }
    Ok(Quadrature { nodes, weights })
}

/// Chebyshev–Gauss rule of the first kind with the weight 1/√(1−x²) folded in.
pub fn chebgauss1(n: usize) -> FusionResult<Quadrature> {
    require_order("Chebyshev-Gauss (first kind)", n, 2)?;
    let nf = n as f64;
    let (nodes, weights) = (0..n)
        .rev()
        .map(|i| {
            let theta = (2 * i + 1) as f64 * PI / (2.0 * nf);
            (theta.cos(), PI / nf * theta.sin())
        })
        .unzip();
    Ok(Quadrature { nodes, weights })
}

/// Chebyshev–Gauss rule of the second kind with the weight √(1−x²) folded in.
///
/// The folded weight vanishes like √(1−x²) at the ends, which makes this the
/// natural rule for integrands that carry a √|1−λB| factor.
pub fn chebgauss2(n: usize) -> FusionResult<Quadrature> {
    require_order("Chebyshev-Gauss (second kind)", n, 2)?;
    let nf = n as f64;
    let (nodes, weights) = (0..n)
        .rev()
        .map(|i| {
            let theta = (i + 1) as f64 * PI / (nf + 1.0);
            (theta.cos(), PI / (nf + 1.0) * theta.sin())
        })
        .unzip();
    Ok(Quadrature { nodes, weights })
}

/// x ↦ sin(πx/2), a bijection of [-1, 1] onto itself.
#[inline]
pub fn automorphism_sin(x: f64) -> f64 {
    (FRAC_PI_2 * x).sin()
}

#[inline]
pub fn grad_automorphism_sin(x: f64) -> f64 {
    FRAC_PI_2 * (FRAC_PI_2 * x).cos()
}

/// Affine map of [-1, 1] onto [a, b].
#[inline]
pub fn bijection_from_disc(x: f64, a: f64, b: f64) -> f64 {
    0.5 * (b - a) * (x + 1.0) + a
}

#[inline]
pub fn grad_bijection_from_disc(a: f64, b: f64) -> f64 {
    0.5 * (b - a)
}

/// Composite Simpson rule on possibly irregular nodes.
///
/// With an even number of intervals every pair of intervals uses the
/// three-point rule for unequal spacing. With an odd number the last interval
/// gets the quadratic correction through the last three points. Two nodes fall
/// back to the trapezoid rule.
pub fn simpson_irregular(y: &[f64], x: &[f64]) -> FusionResult<f64> {
    let n = x.len();
    if y.len() != n {
        return Err(FusionError::ConfigError(format!(
            "simpson: {} samples on {n} nodes",
            y.len()
        )));
    }
    if n < 2 {
        return Err(FusionError::ConfigError(format!(
            "simpson: needs at least 2 nodes, got {n}"
        )));
    }
    if n == 2 {
        return Ok(0.5 * (x[1] - x[0]) * (y[0] + y[1]));
    }

    // Points 0..=last form an even number of intervals.
    let last = if n % 2 == 1 { n - 1 } else { n - 2 };
    let mut total = 0.0;
    let mut i = 0;
    while i + 2 <= last {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hs = h0 + h1;
        total += hs / 6.0
            * ((2.0 - h1 / h0) * y[i]
                + hs * hs / (h0 * h1) * y[i + 1]
                + (2.0 - h0 / h1) * y[i + 2]);
        i += 2;
    }

    if n % 2 == 0 {
        let h0 = x[n - 2] - x[n - 3];
        let h1 = x[n - 1] - x[n - 2];
        let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
        let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
        let eta = h1 * h1 * h1 / (6.0 * h0 * (h0 + h1));
        total += alpha * y[n - 1] + beta * y[n - 2] - eta * y[n - 3];
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_sum(q: &Quadrature) -> f64 {
        q.weights.iter().sum()
    }

    fn ascending_inside(q: &Quadrature) -> bool {
        q.nodes.windows(2).all(|w| w[0] < w[1])
            && q.nodes.iter().all(|&x| x > -1.0 && x < 1.0)
    }

    #[test]
    fn test_uniform_is_midpoint() {
        let q = uniform(4).unwrap();
        assert_eq!(q.nodes, vec![-0.75, -0.25, 0.25, 0.75]);
        assert!((weight_sum(&q) - 2.0).abs() < 1e-15);
        assert!(uniform(0).is_err());
    }

    #[test]
    fn test_simpson2_layout() {
        let q = simpson2(7).unwrap();
        assert_eq!(q.len(), 7);
        assert!(ascending_inside(&q));
        assert!((weight_sum(&q) - 2.0).abs() < 1e-14);
        // Even request drops one interior node.
        let q = simpson2(8).unwrap();
        assert_eq!(q.len(), 7);
        assert!(simpson2(4).is_err());
        // Integrates a quadratic to within the boundary-cell error.
        let q = simpson2(101).unwrap();
        let val = q.integrate(|x| x * x);
        assert!((val - 2.0 / 3.0).abs() < 1e-3, "got {val}");
    }

    #[test]
    fn test_leggauss_exact_for_polynomials() {
        for n in [2usize, 3, 8, 32] {
            let q = leggauss(n).unwrap();
            assert!(ascending_inside(&q), "order {n}");
            assert!((weight_sum(&q) - 2.0).abs() < 1e-13, "order {n}");
            // Exact through degree 2n - 1.
            let deg = (2 * n - 1).min(9) as i32;
            let even = if deg % 2 == 0 { deg } else { deg - 1 };
            let val = q.integrate(|x| x.powi(even));
            let exact = 2.0 / (even as f64 + 1.0);
            assert!((val - exact).abs() < 1e-13, "order {n}: {val} vs {exact}");
        }
    }

    #[test]
    fn test_leggauss_odd_order_has_center_node() {
        let q = leggauss(5).unwrap();
        assert_eq!(q.nodes[2], 0.0);
        assert!((q.weights[2] - 128.0 / 225.0).abs() < 1e-14);
    }

    #[test]
    fn test_chebgauss1_singular_endpoints() {
        // ∫ 1/√(1−x²) dx = π
        let q = chebgauss1(16).unwrap();
        assert!(ascending_inside(&q));
        let val = q.integrate(|x| 1.0 / (1.0 - x * x).sqrt());
        assert!((val - PI).abs() < 1e-12, "got {val}");
    }

    #[test]
    fn test_chebgauss2_sqrt_weight() {
        // ∫ √(1−x²) dx = π/2
        let q = chebgauss2(16).unwrap();
        assert!(ascending_inside(&q));
        let val = q.integrate(|x| (1.0 - x * x).sqrt());
        assert!((val - FRAC_PI_2).abs() < 1e-12, "got {val}");
        // ∫ x² √(1−x²) dx = π/8
        let val = q.integrate(|x| x * x * (1.0 - x * x).sqrt());
        assert!((val - PI / 8.0).abs() < 1e-12, "got {val}");
    }

    #[test]
    fn test_sine_automorphism_handles_inverse_sqrt() {
        // ∫ 1/√(1−x²) dx = π with singularities at both ends.
        let q = leggauss(32).unwrap().with_automorphism();
        assert!(ascending_inside(&q));
        assert!((weight_sum(&q) - 2.0).abs() < 1e-12);
        let val = q.integrate(|x| 1.0 / (1.0 - x * x).sqrt());
        assert!((val - PI).abs() < 1e-10, "got {val}");
    }

    #[test]
    fn test_bijection_from_disc() {
        assert_eq!(bijection_from_disc(-1.0, 2.0, 5.0), 2.0);
        assert_eq!(bijection_from_disc(1.0, 2.0, 5.0), 5.0);
        assert_eq!(grad_bijection_from_disc(2.0, 5.0), 1.5);
        assert!((grad_automorphism_sin(0.0) - FRAC_PI_2).abs() < 1e-15);
        assert!((automorphism_sin(1.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_simpson_irregular_quadratic_exact() {
        let x = [0.0, 0.1, 0.35, 0.5, 0.9, 1.3, 2.0];
        let y: Vec<f64> = x.iter().map(|t| 3.0 * t * t - t + 2.0).collect();
        let exact = 8.0 - 2.0 + 4.0;
        let val = simpson_irregular(&y, &x).unwrap();
        assert!((val - exact).abs() < 1e-12, "odd node count: {val}");

        // Odd number of intervals exercises the last-interval correction.
        let x = &x[..6];
        let y = &y[..6];
        let b: f64 = 1.3;
        let exact = b.powi(3) - 0.5 * b * b + 2.0 * b;
        let val = simpson_irregular(y, x).unwrap();
        assert!((val - exact).abs() < 1e-12, "even node count: {val}");
    }

    #[test]
    fn test_simpson_irregular_small_inputs() {
        assert!((simpson_irregular(&[1.0, 3.0], &[0.0, 2.0]).unwrap() - 4.0).abs() < 1e-15);
        assert!(simpson_irregular(&[1.0], &[0.0]).is_err());
        assert!(simpson_irregular(&[1.0, 2.0], &[0.0, 1.0, 2.0]).is_err());
    }
}
