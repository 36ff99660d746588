// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Model Stellarator Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Analytic large-aspect-ratio stellarator field in Boozer-like angles.
//!
//!   |B| = B₀ [1 − ε_t(ρ) cos θ − ε_h(ρ) cos(mθ − Nζ)],  θ = α + ι(ρ) ζ,
//!   ε_t = e_t ρ,  ε_h = e_h ρ²,  ι = ι₀ + ι₁ ρ².
//!
//! Every quantity the neoclassical kernels read is closed-form, including the
//! exact extrema of |B| over a flux surface. `e_h = 0` gives a tokamak.

use crate::objective::Equilibrium;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{DataMap, FieldLineGrid};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Differentiable parameters of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Field strength on axis [T].
    pub b0: f64,
    /// Toroidal modulation per unit ρ.
    pub e_t: f64,
    /// Helical modulation per unit ρ².
    pub e_h: f64,
    pub iota0: f64,
    pub iota1: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            b0: 1.0,
            e_t: 0.1,
            e_h: 0.1,
            iota0: 0.42,
            iota1: 0.1,
        }
    }
}

/// Fixed geometry of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelStellarator {
    /// Major radius [m].
    pub r0: f64,
    /// Minor radius [m].
    pub a: f64,
    /// Poloidal mode number of the helical ripple.
    pub m: u32,
    /// Toroidal mode number (field periods) of the helical ripple.
    pub n: i32,
}

impl ModelStellarator {
    pub fn new(r0: f64, a: f64, m: u32, n: i32) -> FusionResult<Self> {
        if !r0.is_finite() || !a.is_finite() || a <= 0.0 || r0 <= a {
            return Err(FusionError::ConfigError(format!(
                "model geometry needs 0 < a < R0, got a = {a}, R0 = {r0}"
            )));
        }
        if n == 0 {
            return Err(FusionError::ConfigError(
                "helical ripple needs a nonzero toroidal mode number".to_string(),
            ));
        }
        Ok(ModelStellarator { r0, a, m, n })
    }

    /// Exact (min, max) of |B| over the surface ρ.
    pub fn extrema(&self, params: &ModelParams, rho: f64) -> (f64, f64) {
        let depth = params.e_t.abs() * rho + params.e_h.abs() * rho * rho;
        (params.b0 * (1.0 - depth), params.b0 * (1.0 + depth))
    }

    fn check(&self, params: &ModelParams, grid: &FieldLineGrid) -> FusionResult<()> {
        if !params.b0.is_finite() || params.b0 <= 0.0 {
            return Err(FusionError::PhysicsViolation(format!(
                "B0 must be finite and positive, got {}",
                params.b0
            )));
        }
        for &rho in grid.rho() {
            let (min_b, _) = self.extrema(params, rho);
            if min_b.is_nan() || min_b <= 0.0 {
                return Err(FusionError::PhysicsViolation(format!(
                    "|B| vanishes on surface rho = {rho}: modulation too deep"
                )));
            }
        }
        Ok(())
    }

    /// One named quantity at every node.
    fn quantity(&self, params: &ModelParams, grid: &FieldLineGrid, name: &str) -> FusionResult<Array1<f64>> {
        let nodes = grid.nodes();
        let point = |i: usize| ModelPoint::new(self, params, nodes[[i, 0]], nodes[[i, 1]], nodes[[i, 2]]);
        let grad_rho = 1.0 / self.a;
        let map = |f: &dyn Fn(&ModelPoint) -> f64| Array1::from_shape_fn(grid.num_nodes(), |i| f(&point(i)));
        let surface = |f: &dyn Fn(f64) -> f64| Array1::from_shape_fn(grid.num_nodes(), |i| f(nodes[[i, 0]]));

        let values = match name {
            "|B|" => map(&|p: &ModelPoint| p.b),
            "|B|_z|r,a" => map(&|p: &ModelPoint| p.b_z),
            "B^zeta" => map(&|p: &ModelPoint| p.b / self.r0),
            "B^zeta_z|r,a" => map(&|p: &ModelPoint| p.b_z / self.r0),
            "min_tz |B|" => surface(&|rho: f64| self.extrema(params, rho).0),
            "max_tz |B|" => surface(&|rho: f64| self.extrema(params, rho).1),
            "R0" => Array1::from_elem(grid.num_nodes(), self.r0),
            "|grad(rho)|" | "<|grad(rho)|>" => Array1::from_elem(grid.num_nodes(), grad_rho),
            "kappa_g" => map(&|p: &ModelPoint| p.kappa_g),
            "cvdrift0" => map(&|p: &ModelPoint| grad_rho * p.kappa_g),
            "gbdrift" => map(&|p: &ModelPoint| grad_rho * (p.b_rho / params.b0 - p.shear * p.zeta * p.kappa_g)),
            "|B|_psi|v,p" => map(&|p: &ModelPoint| p.b_rho),
            "K" => map(&|p: &ModelPoint| p.shear * p.theta.cos() / self.r0),
            "|grad(rho)|*|e_alpha|r,p|" => map(&|p: &ModelPoint| p.rho * (1.0 + params.e_t * p.rho * p.theta.cos())),
            "sqrt(g)" => surface(&|rho: f64| self.a * self.a * rho * self.r0),
            "iota" => surface(&|rho: f64| params.iota0 + params.iota1 * rho * rho),
            other => return Err(FusionError::UnknownQuantity(other.to_string())),
        };
        Ok(values)
    }
}

/// Model state at one node.
struct ModelPoint {
    rho: f64,
    zeta: f64,
    theta: f64,
    b: f64,
    /// ∂|B|/∂ζ at fixed (ρ, α).
    b_z: f64,
    /// ∂|B|/∂ρ at fixed Boozer angles.
    b_rho: f64,
    /// ι'(ρ).
    shear: f64,
    kappa_g: f64,
}

impl ModelPoint {
    fn new(model: &ModelStellarator, p: &ModelParams, rho: f64, alpha: f64, zeta: f64) -> Self {
        let m = f64::from(model.m);
        let n = f64::from(model.n);
        let iota = p.iota0 + p.iota1 * rho * rho;
        let theta = alpha + iota * zeta;
        let phase = m * theta - n * zeta;
        let eps_t = p.e_t * rho;
        let eps_h = p.e_h * rho * rho;
        ModelPoint {
            rho,
            zeta,
            theta,
            b: p.b0 * (1.0 - eps_t * theta.cos() - eps_h * phase.cos()),
            b_z: p.b0 * (eps_t * iota * theta.sin() + eps_h * (m * iota - n) * phase.sin()),
            b_rho: p.b0 * (-p.e_t * theta.cos() - 2.0 * p.e_h * rho * phase.cos()),
            shear: 2.0 * p.iota1 * rho,
            // (1/(B₀ r)) ∂|B|/∂θ with the 1/ρ cancelled, so the axis is finite.
            kappa_g: (p.e_t * theta.sin() + m * p.e_h * rho * phase.sin()) / model.a,
        }
    }
}

impl Equilibrium for ModelStellarator {
    type Params = ModelParams;

    fn compute_quantities(
        &self,
        params: &ModelParams,
        grid: &FieldLineGrid,
        names: &[String],
    ) -> FusionResult<DataMap> {
        self.check(params, grid)?;
        let mut data = DataMap::new();
        for name in names {
            data.insert(name.clone(), self.quantity(params, grid, name)?);
        }
        Ok(data)
    }
}
