// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Pitch Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Quadrature over the inverse pitch 1/λ of trapped particles.
//!
//! Trapped orbits exist for min|B| < 1/λ < max|B| on a flux surface. The
//! nodes stay strictly inside that interval so the integrands, which blow up
//! or vanish at the trapped-passing boundary, are never sampled on it.

use fusion_math::quadrature::{bijection_from_disc, grad_bijection_from_disc, simpson2, uniform};
use fusion_types::config::PitchRule;
use fusion_types::constants::UNTRAPPED_RTOL;
use fusion_types::error::{FusionError, FusionResult};

#[derive(Debug, Clone, PartialEq)]
pub struct PitchQuadrature {
    /// Nodes in 1/λ, ascending.
    pub pitch_inv: Vec<f64>,
    /// Weights in d(1/λ); they sum to max|B| − min|B|.
    pub weights: Vec<f64>,
}

impl PitchQuadrature {
    /// Build the rule for one flux surface from its |B| extrema.
    pub fn build(min_b: f64, max_b: f64, num_pitch: usize, rule: PitchRule) -> FusionResult<Self> {
        if !min_b.is_finite() || !max_b.is_finite() || min_b <= 0.0 {
            return Err(FusionError::ConfigError(format!(
                "pitch quadrature needs finite, positive |B| extrema, got min={min_b}, max={max_b}"
            )));
        }
        if max_b <= min_b {
            return Err(FusionError::ConfigError(format!(
                "pitch quadrature needs max|B| > min|B| (no trapped particles otherwise), \
                 got min={min_b}, max={max_b}"
            )));
        }
        if num_pitch == 0 {
            return Err(FusionError::ConfigError(
                "pitch quadrature needs num_pitch >= 1".to_string(),
            ));
        }

        let canonical = match rule {
            PitchRule::Uniform => uniform(num_pitch)?,
            PitchRule::OpenSimpson => simpson2(num_pitch)?,
        };
        let jac = grad_bijection_from_disc(min_b, max_b);
        Ok(PitchQuadrature {
            pitch_inv: canonical
                .nodes
                .iter()
                .map(|&x| bijection_from_disc(x, min_b, max_b))
                .collect(),
            weights: canonical.weights.iter().map(|&w| w * jac).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.pitch_inv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitch_inv.is_empty()
    }
}

/// Whether |B| is flat enough on a surface that no particle is trapped.
pub fn is_untrapped(min_b: f64, max_b: f64) -> bool {
    max_b - min_b <= UNTRAPPED_RTOL * max_b.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_nodes_inside_trapped_range() {
        let q = PitchQuadrature::build(0.8, 1.2, 50, PitchRule::Uniform).unwrap();
        assert_eq!(q.len(), 50);
        assert!(q.pitch_inv.iter().all(|&p| p > 0.8 && p < 1.2));
        assert!(q.pitch_inv.windows(2).all(|w| w[0] < w[1]));
        let total: f64 = q.weights.iter().sum();
        assert!((total - 0.4).abs() < 1e-14, "weight sum {total}");
        // λ itself stays inside (1/max, 1/min).
        for p in &q.pitch_inv {
            let lambda = 1.0 / p;
            assert!(lambda > 1.0 / 1.2 && lambda < 1.0 / 0.8);
        }
    }

    #[test]
    fn test_open_simpson_nodes() {
        let q = PitchQuadrature::build(2.0, 3.0, 9, PitchRule::OpenSimpson).unwrap();
        assert_eq!(q.len(), 9);
        assert!(q.pitch_inv[0] > 2.0 && q.pitch_inv[8] < 3.0);
        let total: f64 = q.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_degenerate_surface_is_rejected() {
        for (lo, hi) in [(1.0, 1.0), (1.2, 0.8), (0.0, 1.0), (f64::NAN, 1.0)] {
            let err = PitchQuadrature::build(lo, hi, 10, PitchRule::Uniform).unwrap_err();
            assert!(matches!(err, FusionError::ConfigError(_)), "({lo}, {hi}): {err}");
        }
        assert!(PitchQuadrature::build(0.5, 1.0, 0, PitchRule::Uniform).is_err());
        assert!(PitchQuadrature::build(0.5, 1.0, 3, PitchRule::OpenSimpson).is_err());
    }

    #[test]
    fn test_untrapped_detection() {
        assert!(is_untrapped(1.0, 1.0));
        assert!(is_untrapped(1.0, 1.0 + 1e-14));
        assert!(!is_untrapped(0.9, 1.0));
    }
}
