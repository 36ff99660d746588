// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Interpolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Piecewise cubic Hermite interpolation on strictly increasing knots.
//!
//! On segment i with h = x[i+1] − x[i] and dx = t − x[i] the interpolant is
//!   p(dx) = c0 + c1 dx + c2 dx² + c3 dx³
//! with value and slope matching the data at both knots.

use crate::roots::quadratic_roots;
use fusion_types::error::{FusionError, FusionResult};

#[derive(Debug, Clone)]
pub struct CubicHermite {
    x: Vec<f64>,
    y: Vec<f64>,
    dydx: Vec<f64>,
}

impl CubicHermite {
    pub fn new(x: Vec<f64>, y: Vec<f64>, dydx: Vec<f64>) -> FusionResult<Self> {
        let n = x.len();
        if n < 2 {
            return Err(FusionError::ConfigError(format!(
                "cubic Hermite needs at least 2 knots, got {n}"
            )));
        }
        if y.len() != n || dydx.len() != n {
            return Err(FusionError::ConfigError(format!(
                "cubic Hermite: {n} knots but {} values and {} slopes",
                y.len(),
                dydx.len()
            )));
        }
        if x.windows(2).any(|w| w[1] <= w[0] || w[1].is_nan() || w[0].is_nan()) {
            return Err(FusionError::ConfigError(
                "cubic Hermite knots must be strictly increasing".to_string(),
            ));
        }
        Ok(CubicHermite { x, y, dydx })
    }

    /// Slopes estimated by [`finite_difference_slopes`].
    pub fn with_finite_difference_slopes(x: Vec<f64>, y: Vec<f64>) -> FusionResult<Self> {
        if x.len() != y.len() {
            return Err(FusionError::ConfigError(format!(
                "cubic Hermite: {} knots but {} values",
                x.len(),
                y.len()
            )));
        }
        let dydx = finite_difference_slopes(&x, &y);
        Self::new(x, y, dydx)
    }

    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    pub fn values(&self) -> &[f64] {
        &self.y
    }

    pub fn num_segments(&self) -> usize {
        self.x.len() - 1
    }

    /// Segment containing `t`; points outside the knots use the end segments.
    pub fn segment(&self, t: f64) -> usize {
        let last = self.num_segments() - 1;
        // partition_point counts knots <= t
        self.x.partition_point(|&xk| xk <= t).saturating_sub(1).min(last)
    }

    /// Power-basis coefficients `[c0, c1, c2, c3]` of segment `i` in dx.
    pub fn coefficients(&self, i: usize) -> [f64; 4] {
        let h = self.x[i + 1] - self.x[i];
        let y0 = self.y[i];
        let m0 = self.dydx[i];
        let m1 = self.dydx[i + 1];
        let delta = (self.y[i + 1] - y0) / h;
        [
            y0,
            m0,
            (3.0 * delta - 2.0 * m0 - m1) / h,
            (m0 + m1 - 2.0 * delta) / (h * h),
        ]
    }

    pub fn eval(&self, t: f64) -> f64 {
        let i = self.segment(t);
        let [c0, c1, c2, c3] = self.coefficients(i);
        let dx = t - self.x[i];
        c0 + dx * (c1 + dx * (c2 + dx * c3))
    }

    pub fn derivative(&self, t: f64) -> f64 {
        let i = self.segment(t);
        let [_, c1, c2, c3] = self.coefficients(i);
        let dx = t - self.x[i];
        c1 + dx * (2.0 * c2 + dx * 3.0 * c3)
    }

    /// Interior extrema of segment `i`, in absolute coordinates.
    pub fn critical_points(&self, i: usize) -> Vec<f64> {
        let [_, c1, c2, c3] = self.coefficients(i);
        let h = self.x[i + 1] - self.x[i];
        quadratic_roots(3.0 * c3, 2.0 * c2, c1)
            .into_iter()
            .filter(|&dx| dx > 0.0 && dx < h)
            .map(|dx| self.x[i] + dx)
            .collect()
    }

    /// Location of the minimum of the interpolant on `[lo, hi]`.
    ///
    /// Candidates are the interval ends, interior knots and interior extrema.
    pub fn argmin(&self, lo: f64, hi: f64) -> f64 {
        let mut best = lo;
        let mut best_val = self.eval(lo);
        let mut consider = |t: f64| {
            let v = self.eval(t);
            if v < best_val {
                best = t;
                best_val = v;
            }
        };
        consider(hi);
        for i in self.segment(lo)..=self.segment(hi) {
            if self.x[i] > lo && self.x[i] < hi {
                consider(self.x[i]);
            }
            for t in self.critical_points(i) {
                if t > lo && t < hi {
                    consider(t);
                }
            }
        }
        best
    }
}

/// Second-order finite-difference slopes on irregular knots.
///
/// Interior knots use the three-point formula for unequal spacing, the two
/// end knots a one-sided difference.
pub fn finite_difference_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let mut dydx = vec![0.0; n];
    dydx[0] = (y[1] - y[0]) / (x[1] - x[0]);
    dydx[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        let h0 = x[i] - x[i - 1];
        let h1 = x[i + 1] - x[i];
        let a = -h1 / (h0 * (h0 + h1));
        let b = (h1 - h0) / (h0 * h1);
        let c = h0 / (h1 * (h0 + h1));
        dydx[i] = a * y[i - 1] + b * y[i] + c * y[i + 1];
    }
    dydx
}
