// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Quantity Registry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named quantities, their dependencies, and evaluation plans.
//!
//! A [`QuantityDef`] declares what a quantity needs. [`Registry::resolve`]
//! turns a set of targets into an [`EvaluationPlan`] once: a dependency-first
//! order of registered quantities plus the external inputs the caller must
//! supply. Executing a plan only adds new keys to the data map.

use crate::cache::{QuadratureCache, QuadratureKind};
use crate::{gamma_c, length, ripple};
use fusion_types::config::BounceConfig;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{DataMap, FieldLineGrid};
use ndarray::Array1;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Everything a compute function may read besides the data map.
#[derive(Debug, Clone, Copy)]
pub struct ComputeContext<'a> {
    pub grid: &'a FieldLineGrid,
    pub bounce: BounceConfig,
    pub quadratures: &'a QuadratureCache,
    /// Value on axis surfaces; set per quantity by the plan.
    pub axis_limit: Option<f64>,
}

impl<'a> ComputeContext<'a> {
    pub fn new(grid: &'a FieldLineGrid, bounce: BounceConfig, quadratures: &'a QuadratureCache) -> Self {
        ComputeContext {
            grid,
            bounce,
            quadratures,
            axis_limit: None,
        }
    }
}

/// Computes one quantity, one value per grid node.
pub type ComputeFn = fn(&ComputeContext<'_>, &DataMap) -> FusionResult<Array1<f64>>;

/// Grid layout a quantity needs.
///
/// Recorded for the schema only. Every [`FieldLineGrid`] is a meshgrid:
/// [`FieldLineGrid::meshgrid`] builds one and [`FieldLineGrid::from_nodes`]
/// rejects any node set that is not, so `execute` has nothing left to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridRequirement {
    Any,
    /// Tensor-product grid over (rho, alpha, zeta) with zeta fastest.
    Meshgrid,
}

/// Documented tunable of a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hyperparameter {
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityDef {
    pub name: &'static str,
    /// LaTeX label.
    pub label: &'static str,
    pub units: &'static str,
    pub description: &'static str,
    pub dependencies: &'static [&'static str],
    pub grid_requirement: GridRequirement,
    pub hyperparameters: &'static [Hyperparameter],
    /// Canonical rules the compute function reads from the cache.
    pub quadratures: &'static [QuadratureKind],
    /// Value taken on the magnetic axis instead of evaluating there.
    pub axis_limit: Option<f64>,
    #[serde(skip)]
    pub compute: ComputeFn,
}

/// Hyperparameters shared by every bounce-integral quantity.
pub(crate) const fn bounce_hyperparameters(num_pitch_default: &'static str) -> [Hyperparameter; 5] {
    [
        Hyperparameter {
            name: "num_quad",
            default: "32",
            description: "Order of the quadrature applied to every bounce well.",
        },
        Hyperparameter {
            name: "num_pitch",
            default: num_pitch_default,
            description: "Number of inverse-pitch nodes per flux surface.",
        },
        Hyperparameter {
            name: "num_well",
            default: "all",
            description: "Maximum wells kept per pitch and field line. Wells beyond the cap \
                          are dropped in profile order.",
        },
        Hyperparameter {
            name: "batch",
            default: "true",
            description: "Evaluate all pitch values of a field line in one block.",
        },
        Hyperparameter {
            name: "pitch_rule",
            default: "uniform",
            description: "Quadrature over 1/λ: uniform (midpoint) or open_simpson.",
        },
    ]
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    defs: Vec<QuantityDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The neoclassical transport quantities.
    pub fn neoclassical() -> Self {
        Registry {
            defs: vec![
                length::FIELDLINE_LENGTH,
                length::FIELDLINE_LENGTH_OVER_VOLUME,
                ripple::EFFECTIVE_RIPPLE_32,
                ripple::EFFECTIVE_RIPPLE,
                gamma_c::GAMMA_C,
                gamma_c::GAMMA_C_VELASCO,
            ],
        }
    }

    pub fn register(&mut self, def: QuantityDef) -> FusionResult<()> {
        if self.get(def.name).is_some() {
            return Err(FusionError::ConfigError(format!(
                "quantity '{}' is already registered",
                def.name
            )));
        }
        self.defs.push(def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&QuantityDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Registered definitions in registration order.
    pub fn schema(&self) -> &[QuantityDef] {
        &self.defs
    }

    /// Dependency-first evaluation order of `targets`.
    ///
    /// Dependencies are visited depth-first in declaration order, so the plan
    /// is deterministic. Names that are not registered become external inputs.
    pub fn resolve(&self, targets: &[&str]) -> FusionResult<EvaluationPlan> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();
        let mut plan = EvaluationPlan::default();
        for &target in targets {
            if self.get(target).is_none() {
                return Err(FusionError::UnknownQuantity(target.to_string()));
            }
            self.visit(target, &mut marks, &mut path, &mut plan)?;
        }
        Ok(plan)
    }

    fn visit<'r>(
        &'r self,
        name: &'r str,
        marks: &mut HashMap<&'r str, Mark>,
        path: &mut Vec<&'r str>,
        plan: &mut EvaluationPlan,
    ) -> FusionResult<()> {
        let Some(def) = self.get(name) else {
            if !plan.inputs.iter().any(|i| i == name) {
                plan.inputs.push(name.to_string());
            }
            return Ok(());
        };
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|&p| p == name).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..].to_vec();
                cycle.push(name);
                return Err(FusionError::DependencyCycle(cycle.join(" -> ")));
            }
            None => {}
        }
        marks.insert(def.name, Mark::Visiting);
        path.push(def.name);
        for &dep in def.dependencies {
            self.visit(dep, marks, path, plan)?;
        }
        path.pop();
        marks.insert(def.name, Mark::Done);
        plan.steps.push(*def);
        Ok(())
    }
}

/// Resolved evaluation order for a set of targets.
#[derive(Debug, Clone, Default)]
pub struct EvaluationPlan {
    steps: Vec<QuantityDef>,
    inputs: Vec<String>,
}

impl EvaluationPlan {
    /// Registered quantities in evaluation order.
    pub fn order(&self) -> Vec<&'static str> {
        self.steps.iter().map(|d| d.name).collect()
    }

    /// External quantities the caller must supply, in first-use order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Canonical quadratures any step reads.
    pub fn quadratures(&self) -> BTreeSet<QuadratureKind> {
        self.steps
            .iter()
            .flat_map(|d| d.quadratures.iter().copied())
            .collect()
    }

    /// Fill `cache` with every rule the plan reads at order `num_quad`.
    pub fn prepare(&self, cache: &mut QuadratureCache, num_quad: usize) -> FusionResult<()> {
        for kind in self.quadratures() {
            cache.ensure(kind, num_quad)?;
        }
        Ok(())
    }

    /// Run every step, adding each computed quantity to `data`.
    ///
    /// Quantities already present in `data` are taken as given.
    pub fn execute(&self, ctx: &ComputeContext<'_>, mut data: DataMap) -> FusionResult<DataMap> {
        for name in &self.inputs {
            let values = data.get(name).ok_or_else(|| FusionError::MissingQuantity {
                name: name.clone(),
            })?;
            ctx.grid.check_len(name, values.view())?;
        }
        for def in &self.steps {
            if data.contains_key(def.name) {
                debug!(quantity = def.name, "supplied by caller, not recomputed");
                continue;
            }
            if ctx.grid.has_axis() && def.axis_limit.is_none() {
                debug!(quantity = def.name, "no axis limit, evaluating on the axis surface");
            }
            let step = ComputeContext {
                axis_limit: def.axis_limit,
                ..*ctx
            };
            let values = (def.compute)(&step, &data)?;
            ctx.grid.check_len(def.name, values.view())?;
            data.insert(def.name.to_string(), values);
        }
        Ok(data)
    }
}
