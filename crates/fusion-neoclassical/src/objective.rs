// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Neoclassical Objective
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Optimization objective: one transport proxy value per flux surface.
//!
//! Lifecycle: `new` validates the configuration, `build` fixes the ζ sampling,
//! resolves the evaluation plan and fills the quadrature cache, and `compute`
//! runs the plan for a parameter set. `compute` reads only state fixed by
//! `build`.

use crate::cache::QuadratureCache;
use crate::registry::{ComputeContext, EvaluationPlan, Registry};
use fusion_types::config::{GammaCFormulation, ObjectiveConfig};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{DataMap, FieldLineGrid};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Source of the field quantities the neoclassical kernels consume.
pub trait Equilibrium {
    type Params;

    /// Evaluate every quantity in `names` at every node of `grid`.
    ///
    /// Fails with [`FusionError::UnknownQuantity`] for names it cannot
    /// provide.
    fn compute_quantities(
        &self,
        params: &Self::Params,
        grid: &FieldLineGrid,
        names: &[String],
    ) -> FusionResult<DataMap>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    EffectiveRipple,
    GammaC,
}

impl Target {
    /// Registered quantity evaluated for this target.
    pub fn quantity(self, formulation: GammaCFormulation) -> &'static str {
        match (self, formulation) {
            (Target::EffectiveRipple, _) => "effective ripple",
            (Target::GammaC, GammaCFormulation::Nemov) => "Gamma_c",
            (Target::GammaC, GammaCFormulation::Velasco) => "Gamma_c Velasco",
        }
    }
}

/// State fixed by [`NeoclassicalObjective::build`].
#[derive(Debug)]
struct Built {
    zeta: Vec<f64>,
    plan: EvaluationPlan,
    quadratures: QuadratureCache,
}

#[derive(Debug)]
pub struct NeoclassicalObjective<E: Equilibrium> {
    equilibrium: E,
    target: Target,
    config: ObjectiveConfig,
    built: Option<Built>,
}

impl<E: Equilibrium> NeoclassicalObjective<E> {
    pub fn new(equilibrium: E, target: Target, config: ObjectiveConfig) -> FusionResult<Self> {
        config.validate()?;
        // The flux surface labels become a meshgrid axis.
        let mut sorted = config.rho.clone();
        sorted.sort_by(f64::total_cmp);
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(FusionError::ConfigError(
                "flux surface labels must be unique".to_string(),
            ));
        }
        Ok(NeoclassicalObjective {
            equilibrium,
            target,
            config,
            built: None,
        })
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn config(&self) -> &ObjectiveConfig {
        &self.config
    }

    pub fn equilibrium(&self) -> &E {
        &self.equilibrium
    }

    /// Name of the registered quantity this objective evaluates.
    pub fn quantity(&self) -> &'static str {
        self.target.quantity(self.config.gamma_c)
    }

    /// Number of objective values: one per flux surface.
    pub fn dim_f(&self) -> usize {
        self.config.rho.len()
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Sampling of ζ shared by every field line.
    pub fn zeta(&self) -> Option<&[f64]> {
        self.built.as_ref().map(|b| b.zeta.as_slice())
    }

    /// External quantities requested from the equilibrium, once built.
    pub fn inputs(&self) -> Option<&[String]> {
        self.built.as_ref().map(|b| b.plan.inputs())
    }

    /// Precompute everything that does not depend on the parameters.
    pub fn build(&mut self) -> FusionResult<()> {
        let num_zeta = self.config.knots_per_transit * self.config.num_transit;
        let end = 2.0 * PI * self.config.num_transit as f64;
        let zeta = Array1::linspace(0.0, end, num_zeta).to_vec();

        let plan = Registry::neoclassical().resolve(&[self.quantity()])?;
        let mut quadratures = QuadratureCache::new();
        plan.prepare(&mut quadratures, self.config.bounce.num_quad)?;

        info!(
            quantity = self.quantity(),
            surfaces = self.config.rho.len(),
            field_lines = self.config.alpha.len(),
            zeta_knots = num_zeta,
            order = ?plan.order(),
            "neoclassical objective built"
        );
        self.built = Some(Built {
            zeta,
            plan,
            quadratures,
        });
        Ok(())
    }

    /// Every quantity of the evaluation plan at every grid node.
    pub fn compute_data(&self, params: &E::Params) -> FusionResult<(FieldLineGrid, DataMap)> {
        let built = self.built.as_ref().ok_or_else(|| {
            FusionError::ConfigError("objective must be built before compute".to_string())
        })?;
        let grid = FieldLineGrid::meshgrid(&self.config.rho, &self.config.alpha, &built.zeta)?;
        let inputs = self
            .equilibrium
            .compute_quantities(params, &grid, built.plan.inputs())?;
        debug!(nodes = grid.num_nodes(), inputs = inputs.len(), "equilibrium evaluated");
        let ctx = ComputeContext::new(&grid, self.config.bounce, &built.quadratures);
        let data = built.plan.execute(&ctx, inputs)?;
        Ok((grid, data))
    }

    /// Target value on every flux surface, in construction order.
    pub fn compute(&self, params: &E::Params) -> FusionResult<Array1<f64>> {
        let (grid, data) = self.compute_data(params)?;
        let name = self.quantity();
        let values = data
            .get(name)
            .ok_or_else(|| FusionError::MissingQuantity {
                name: name.to_string(),
            })?;
        grid.compress(values.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_field::{ModelParams, ModelStellarator};

    fn config() -> ObjectiveConfig {
        ObjectiveConfig {
            rho: vec![0.8, 0.4],
            alpha: vec![0.0],
            num_transit: 4,
            knots_per_transit: 48,
            ..ObjectiveConfig::default()
        }
    }

    fn model() -> ModelStellarator {
        ModelStellarator::new(10.0, 1.0, 2, 5).unwrap()
    }

    #[test]
    fn test_compute_before_build_fails() {
        let obj = NeoclassicalObjective::new(model(), Target::EffectiveRipple, config()).unwrap();
        assert!(!obj.is_built());
        assert!(matches!(
            obj.compute(&ModelParams::default()),
            Err(FusionError::ConfigError(_))
        ));
    }

    #[test]
    fn test_build_fixes_sampling_and_inputs() {
        let mut obj = NeoclassicalObjective::new(model(), Target::GammaC, config()).unwrap();
        obj.build().unwrap();
        let zeta = obj.zeta().unwrap();
        assert_eq!(zeta.len(), 4 * 48);
        assert_eq!(zeta[0], 0.0);
        assert!((zeta[zeta.len() - 1] - 8.0 * PI).abs() < 1e-12);
        let inputs = obj.inputs().unwrap();
        assert!(inputs.iter().any(|i| i == "K"));
        assert!(!inputs.iter().any(|i| i == "fieldline length"));
        assert_eq!(obj.quantity(), "Gamma_c");
    }

    #[test]
    fn test_values_follow_construction_order() {
        let mut obj = NeoclassicalObjective::new(model(), Target::EffectiveRipple, config()).unwrap();
        obj.build().unwrap();
        let eps = obj.compute(&ModelParams::default()).unwrap();
        assert_eq!(eps.len(), obj.dim_f());
        assert!(eps.iter().all(|e| e.is_finite() && *e > 0.0), "{eps}");
        // Helical ripple grows like ρ², so the outer surface comes first and is larger.
        assert!(eps[0] > eps[1], "{eps}");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let duplicate = ObjectiveConfig {
            rho: vec![0.5, 0.5],
            ..config()
        };
        assert!(NeoclassicalObjective::new(model(), Target::EffectiveRipple, duplicate).is_err());
        let mut bad = config();
        bad.bounce.num_quad = 1;
        assert!(NeoclassicalObjective::new(model(), Target::GammaC, bad).is_err());
    }

    #[test]
    fn test_target_quantities() {
        assert_eq!(Target::EffectiveRipple.quantity(GammaCFormulation::Velasco), "effective ripple");
        assert_eq!(Target::GammaC.quantity(GammaCFormulation::Nemov), "Gamma_c");
        assert_eq!(Target::GammaC.quantity(GammaCFormulation::Velasco), "Gamma_c Velasco");
    }
}
