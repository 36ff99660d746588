// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};

/// Quadrature rule over the inverse pitch 1/λ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchRule {
    /// Midpoint rule with equal weights.
    #[default]
    Uniform,
    /// Composite Simpson completed by midpoint cells at both boundaries.
    OpenSimpson,
}

/// Which published Γ_c expression to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GammaCFormulation {
    /// Nemov et al. 2008: the secular drift term is removed, converges in
    /// the limit of infinitely many toroidal transits.
    #[default]
    Nemov,
    /// Velasco et al. 2021: keeps the secular binormal drift, so the value
    /// decays with the number of transits unless it is averaged out.
    Velasco,
}

/// Static hyperparameters of the bounce integrals.
///
/// Contains no floats so it can be hashed and used as the identity of a
/// specialized evaluation (see the quadrature cache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BounceConfig {
    /// Order of the canonical quadrature applied to every well.
    #[serde(default = "default_num_quad")]
    pub num_quad: usize,
    /// Number of inverse-pitch nodes. `None` picks the quantity default.
    #[serde(default)]
    pub num_pitch: Option<usize>,
    /// Maximum number of wells kept per pitch and field line.
    /// `None` keeps every well that is found.
    #[serde(default)]
    pub num_well: Option<usize>,
    /// Evaluate all pitch values of a field line in one pass.
    #[serde(default = "default_batch")]
    pub batch: bool,
    #[serde(default)]
    pub pitch_rule: PitchRule,
}

fn default_num_quad() -> usize {
    32
}
fn default_batch() -> bool {
    true
}

impl Default for BounceConfig {
    fn default() -> Self {
        BounceConfig {
            num_quad: default_num_quad(),
            num_pitch: None,
            num_well: None,
            batch: default_batch(),
            pitch_rule: PitchRule::default(),
        }
    }
}

impl BounceConfig {
    pub fn num_pitch_or(&self, default: usize) -> usize {
        self.num_pitch.unwrap_or(default)
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.num_quad < 2 {
            return Err(FusionError::ConfigError(format!(
                "bounce num_quad must be >= 2, got {}",
                self.num_quad
            )));
        }
        if let Some(num_pitch) = self.num_pitch {
            let min = match self.pitch_rule {
                PitchRule::Uniform => 1,
                PitchRule::OpenSimpson => 5,
            };
            if num_pitch < min {
                return Err(FusionError::ConfigError(format!(
                    "bounce num_pitch must be >= {min} for {:?}, got {num_pitch}",
                    self.pitch_rule
                )));
            }
        }
        if self.num_well == Some(0) {
            return Err(FusionError::ConfigError(
                "bounce num_well must be >= 1 when given".to_string(),
            ));
        }
        Ok(())
    }
}

/// Construction parameters of a neoclassical objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    /// Flux surface labels to evaluate on.
    #[serde(default = "default_rho")]
    pub rho: Vec<f64>,
    /// Field line labels traced on every surface.
    #[serde(default = "default_alpha")]
    pub alpha: Vec<f64>,
    /// Number of toroidal transits to follow each field line.
    #[serde(default = "default_num_transit")]
    pub num_transit: usize,
    /// Samples of |B| per toroidal transit.
    #[serde(default = "default_knots_per_transit")]
    pub knots_per_transit: usize,
    #[serde(default)]
    pub bounce: BounceConfig,
    #[serde(default)]
    pub gamma_c: GammaCFormulation,
}

fn default_rho() -> Vec<f64> {
    vec![1.0]
}
fn default_alpha() -> Vec<f64> {
    vec![0.0]
}
fn default_num_transit() -> usize {
    10
}
fn default_knots_per_transit() -> usize {
    100
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        ObjectiveConfig {
            rho: default_rho(),
            alpha: default_alpha(),
            num_transit: default_num_transit(),
            knots_per_transit: default_knots_per_transit(),
            bounce: BounceConfig::default(),
            gamma_c: GammaCFormulation::default(),
        }
    }
}

impl ObjectiveConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> FusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.rho.is_empty() {
            return Err(FusionError::ConfigError(
                "objective requires at least one flux surface".to_string(),
            ));
        }
        if self.alpha.is_empty() {
            return Err(FusionError::ConfigError(
                "objective requires at least one field line".to_string(),
            ));
        }
        if let Some(bad) = self.rho.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return Err(FusionError::ConfigError(format!(
                "flux surface labels must be finite and >= 0, got {bad}"
            )));
        }
        if let Some(bad) = self.alpha.iter().find(|a| !a.is_finite()) {
            return Err(FusionError::ConfigError(format!(
                "field line labels must be finite, got {bad}"
            )));
        }
        if self.num_transit < 1 {
            return Err(FusionError::ConfigError(
                "num_transit must be >= 1".to_string(),
            ));
        }
        if self.knots_per_transit < 4 {
            return Err(FusionError::ConfigError(format!(
                "knots_per_transit must be >= 4, got {}",
                self.knots_per_transit
            )));
        }
        self.bounce.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let cfg: ObjectiveConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.rho, vec![1.0]);
        assert_eq!(cfg.alpha, vec![0.0]);
        assert_eq!(cfg.num_transit, 10);
        assert_eq!(cfg.knots_per_transit, 100);
        assert_eq!(cfg.bounce, BounceConfig::default());
        assert_eq!(cfg.bounce.num_quad, 32);
        assert!(cfg.bounce.batch);
        assert_eq!(cfg.gamma_c, GammaCFormulation::Nemov);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "rho": [0.25, 0.5, 1.0],
            "alpha": [0.0, 1.5],
            "num_transit": 20,
            "knots_per_transit": 64,
            "bounce": {
                "num_quad": 24,
                "num_pitch": 40,
                "num_well": 60,
                "batch": false,
                "pitch_rule": "open_simpson"
            },
            "gamma_c": "velasco"
        }"#;
        let cfg: ObjectiveConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.rho.len(), 3);
        assert_eq!(cfg.bounce.num_pitch, Some(40));
        assert_eq!(cfg.bounce.num_well, Some(60));
        assert_eq!(cfg.bounce.pitch_rule, PitchRule::OpenSimpson);
        assert_eq!(cfg.gamma_c, GammaCFormulation::Velasco);
        assert!(!cfg.bounce.batch);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_num_pitch_default_resolution() {
        let cfg = BounceConfig::default();
        assert_eq!(cfg.num_pitch_or(50), 50);
        let cfg = BounceConfig {
            num_pitch: Some(8),
            ..BounceConfig::default()
        };
        assert_eq!(cfg.num_pitch_or(50), 8);
    }

    #[test]
    fn test_rejects_invalid_hyperparameters() {
        let bad_quad = BounceConfig {
            num_quad: 1,
            ..BounceConfig::default()
        };
        assert!(bad_quad.validate().is_err());

        let bad_simpson = BounceConfig {
            num_pitch: Some(2),
            pitch_rule: PitchRule::OpenSimpson,
            ..BounceConfig::default()
        };
        assert!(bad_simpson.validate().is_err());

        let bad_well = BounceConfig {
            num_well: Some(0),
            ..BounceConfig::default()
        };
        assert!(bad_well.validate().is_err());

        let cfg = ObjectiveConfig {
            rho: vec![0.5, f64::NAN],
            ..ObjectiveConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = ObjectiveConfig {
            knots_per_transit: 3,
            ..ObjectiveConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = ObjectiveConfig {
            rho: vec![0.3, 0.9],
            bounce: BounceConfig {
                num_well: Some(12),
                ..BounceConfig::default()
            },
            ..ObjectiveConfig::default()
        };
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: ObjectiveConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.rho, cfg2.rho);
        assert_eq!(cfg.bounce, cfg2.bounce);
        assert_eq!(cfg.gamma_c, cfg2.gamma_c);
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let err = ObjectiveConfig::from_file("/nonexistent/neoclassical.json").unwrap_err();
        assert!(matches!(err, FusionError::Io(_)));
    }
}
