// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Energetic Ion Confinement Proxy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Γ_c, the fraction of trapped fast ions lost by the bounce-averaged radial
//! drift.
//!
//!   Γ_c = π/(2√2) ∫ d(1/λ) λ² ⟨Σ_j v τ_j γ_c,j²⟩ / L,
//!   γ_c = (2/π) arctan(v_r / v_θ).
//!
//! Two published expressions for the poloidal drift v_θ are provided.
//! Nemov et al., Phys. Plasmas 15, 052501 (2008) split v_θ into a part
//! singular at the bounce points and a regular part carrying K, which makes
//! the result converge with the number of transits. Velasco et al., Nucl.
//! Fusion 61, 116059 (2021) use the secular binormal drift directly.

use crate::bounce::{FieldLine, LocalPoint};
use crate::cache::QuadratureKind;
use crate::pitch::PitchQuadrature;
use crate::reduce::{alpha_mean, require, sweep, PitchSetup};
use crate::registry::{bounce_hyperparameters, ComputeContext, GridRequirement, Hyperparameter, QuantityDef};
use fusion_math::quadrature::Quadrature;
use fusion_math::safe_div;
use fusion_types::config::BounceConfig;
use fusion_types::constants::{GAMMA_C_ANGLE_NORM, GAMMA_C_PREFACTOR};
use fusion_types::error::FusionResult;
use fusion_types::state::{DataMap, FieldLineGrid};
use ndarray::{Array1, Array2};

/// Default number of inverse-pitch nodes.
pub const GAMMA_C_NUM_PITCH: usize = 64;

const HYPERPARAMETERS: [Hyperparameter; 5] = bounce_hyperparameters("64");

pub const GAMMA_C: QuantityDef = QuantityDef {
    name: "Gamma_c",
    label: "\\Gamma_c = \\frac{\\pi}{2\\sqrt{2}} \\int d\\lambda \\lambda^{-2} \
            \\langle \\sum_j v \\tau \\gamma_c^2 \\rangle",
    units: "~",
    description: "Energetic ion confinement proxy, Nemov et al.",
    dependencies: &[
        "fieldline length",
        "min_tz |B|",
        "max_tz |B|",
        "B^zeta",
        "B^zeta_z|r,a",
        "|B|",
        "|B|_z|r,a",
        "|grad(rho)|",
        "kappa_g",
        "|B|_psi|v,p",
        "K",
        "|grad(rho)|*|e_alpha|r,p|",
    ],
    grid_requirement: GridRequirement::Meshgrid,
    hyperparameters: &HYPERPARAMETERS,
    quadratures: &[QuadratureKind::GaussLegendreSin, QuadratureKind::ChebGauss2],
    axis_limit: Some(0.0),
    compute: gamma_c_nemov,
};

pub const GAMMA_C_VELASCO: QuantityDef = QuantityDef {
    name: "Gamma_c Velasco",
    label: "\\Gamma_c = \\frac{\\pi}{2\\sqrt{2}} \\int d\\lambda \\lambda^{-2} \
            \\langle \\sum_j v \\tau \\gamma_c^2 \\rangle",
    units: "~",
    description: "Energetic ion confinement proxy, Velasco et al.",
    dependencies: &[
        "fieldline length",
        "min_tz |B|",
        "max_tz |B|",
        "B^zeta",
        "B^zeta_z|r,a",
        "|B|",
        "|B|_z|r,a",
        "cvdrift0",
        "gbdrift",
    ],
    grid_requirement: GridRequirement::Meshgrid,
    hyperparameters: &HYPERPARAMETERS,
    quadratures: &[QuadratureKind::GaussLegendreSin],
    axis_limit: Some(0.0),
    compute: gamma_c_velasco,
};

/// (2/π)² Σ_k w_k (1/λ_k)^{-2} Σ_j v τ_j γ_j².
fn angle_sum(pitch: &PitchQuadrature, v_tau: &Array2<f64>, gamma: &Array2<f64>) -> f64 {
    let mut total = 0.0;
    for (k, (&pitch_inv, &w)) in pitch.pitch_inv.iter().zip(&pitch.weights).enumerate() {
        let wells_sum: f64 = v_tau
            .row(k)
            .iter()
            .zip(gamma.row(k))
            .map(|(&vt, &g)| vt * g * g)
            .sum();
        total += w * pitch_inv.powi(-2) * wells_sum;
    }
    GAMMA_C_ANGLE_NORM * total
}

/// Per-line sum of the Nemov expression.
///
/// Line fields: |∇ρ|κ_g, ∂|B|/∂ψ, K, |∇ρ||e_α|.
pub fn nemov_line_sum(
    line: &FieldLine,
    pitch: &PitchQuadrature,
    singular: &Quadrature,
    regular: &Quadrature,
    bounce: &BounceConfig,
) -> FusionResult<f64> {
    let wells = line.points(&pitch.pitch_inv, bounce.num_well);
    let v_tau = |p: &LocalPoint| 2.0 / (1.0 - p.pitch * p.b).abs().sqrt();
    let radial = |p: &LocalPoint| {
        (1.0 - 0.5 * p.pitch * p.b) / (1.0 - p.pitch * p.b).abs().sqrt() * p.fields[0] / p.b
    };
    let poloidal = |p: &LocalPoint| {
        (1.0 - 0.5 * p.pitch * p.b) / (1.0 - p.pitch * p.b).abs().sqrt() * p.fields[1] / p.b
    };
    let shear = |p: &LocalPoint| (1.0 - p.pitch * p.b).abs().sqrt() * p.fields[2] / p.b;

    let out = line.integrate(
        &[&v_tau, &radial, &poloidal],
        singular,
        &pitch.pitch_inv,
        &wells,
        bounce.batch,
    )?;
    let regular_part = line.integrate(&[&shear], regular, &pitch.pitch_inv, &wells, bounce.batch)?;
    let grad_e_alpha = line.interp_to_argmin(3, &wells)?;

    let gamma = Array2::from_shape_fn(out[0].dim(), |kj| {
        let v_theta = (out[2][kj] + regular_part[0][kj]) * grad_e_alpha[kj];
        safe_div(out[1][kj], v_theta).atan()
    });
    Ok(angle_sum(pitch, &out[0], &gamma))
}

/// Per-line sum of the Velasco expression.
///
/// Line fields: cvdrift0, gbdrift.
pub fn velasco_line_sum(
    line: &FieldLine,
    pitch: &PitchQuadrature,
    singular: &Quadrature,
    bounce: &BounceConfig,
) -> FusionResult<f64> {
    let wells = line.points(&pitch.pitch_inv, bounce.num_well);
    let v_tau = |p: &LocalPoint| 2.0 / (1.0 - p.pitch * p.b).abs().sqrt();
    let radial = |p: &LocalPoint| {
        (1.0 - 0.5 * p.pitch * p.b) / (1.0 - p.pitch * p.b).abs().sqrt() * p.fields[0] / p.b
    };
    let poloidal = |p: &LocalPoint| {
        (1.0 - 0.5 * p.pitch * p.b) / (1.0 - p.pitch * p.b).abs().sqrt() * p.fields[1] / p.b
    };
    let out = line.integrate(
        &[&v_tau, &radial, &poloidal],
        singular,
        &pitch.pitch_inv,
        &wells,
        bounce.batch,
    )?;
    let gamma = Array2::from_shape_fn(out[0].dim(), |kj| safe_div(out[1][kj], out[2][kj]).atan());
    Ok(angle_sum(pitch, &out[0], &gamma))
}

/// π/(2√2) mean_α(S) / L, broadcast to every node.
fn normalize(grid: &FieldLineGrid, data: &DataMap, per_line: &Array2<f64>) -> FusionResult<Array1<f64>> {
    let mean = grid.expand(alpha_mean(per_line).view())?;
    let length = require(data, "fieldline length")?;
    grid.check_len("fieldline length", length.view())?;
    Ok(GAMMA_C_PREFACTOR * mean / length)
}

fn pitch_setup(bounce: &BounceConfig) -> PitchSetup {
    PitchSetup {
        num_pitch: bounce.num_pitch_or(GAMMA_C_NUM_PITCH),
        rule: bounce.pitch_rule,
    }
}

pub fn gamma_c_nemov(ctx: &ComputeContext<'_>, data: &DataMap) -> FusionResult<Array1<f64>> {
    let grid = ctx.grid;
    let singular = ctx.quadratures.get(QuadratureKind::GaussLegendreSin, ctx.bounce.num_quad)?;
    let regular = ctx.quadratures.get(QuadratureKind::ChebGauss2, ctx.bounce.num_quad)?;
    let grad_rho = require(data, "|grad(rho)|")?;
    let kappa_g = require(data, "kappa_g")?;
    grid.check_len("|grad(rho)|", grad_rho.view())?;
    grid.check_len("kappa_g", kappa_g.view())?;
    let radial_drift = grad_rho * kappa_g;

    let per_line = sweep(
        grid,
        data,
        &[
            ("|grad(rho)|*kappa_g", &radial_drift),
            ("|B|_psi|v,p", require(data, "|B|_psi|v,p")?),
            ("K", require(data, "K")?),
            ("|grad(rho)|*|e_alpha|r,p|", require(data, "|grad(rho)|*|e_alpha|r,p|")?),
        ],
        pitch_setup(&ctx.bounce),
        ctx.axis_limit,
        |line, pitch| nemov_line_sum(line, pitch, &singular, &regular, &ctx.bounce),
    )?;
    normalize(grid, data, &per_line)
}

pub fn gamma_c_velasco(ctx: &ComputeContext<'_>, data: &DataMap) -> FusionResult<Array1<f64>> {
    let grid = ctx.grid;
    let singular = ctx.quadratures.get(QuadratureKind::GaussLegendreSin, ctx.bounce.num_quad)?;
    let per_line = sweep(
        grid,
        data,
        &[
            ("cvdrift0", require(data, "cvdrift0")?),
            ("gbdrift", require(data, "gbdrift")?),
        ],
        pitch_setup(&ctx.bounce),
        ctx.axis_limit,
        |line, pitch| velasco_line_sum(line, pitch, &singular, &ctx.bounce),
    )?;
    normalize(grid, data, &per_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QuadratureCache;
    use std::f64::consts::PI;

    /// |B| = 1 − 0.2 cos ζ on one surface, drifts given as functions of ζ.
    fn data(grid: &FieldLineGrid, radial: fn(f64) -> f64, poloidal: fn(f64) -> f64) -> DataMap {
        let nodes = grid.nodes();
        let z = nodes.column(2);
        let n = grid.num_nodes();
        let mut data = DataMap::new();
        data.insert("|B|".into(), z.mapv(|z| 1.0 - 0.2 * z.cos()));
        data.insert("|B|_z|r,a".into(), z.mapv(|z| 0.2 * z.sin()));
        data.insert("B^zeta".into(), Array1::from_elem(n, 1.0));
        data.insert("B^zeta_z|r,a".into(), Array1::zeros(n));
        data.insert("min_tz |B|".into(), Array1::from_elem(n, 0.8));
        data.insert("max_tz |B|".into(), Array1::from_elem(n, 1.2));
        data.insert("|grad(rho)|".into(), Array1::from_elem(n, 1.0));
        data.insert("kappa_g".into(), z.mapv(radial));
        data.insert("cvdrift0".into(), z.mapv(radial));
        data.insert("|B|_psi|v,p".into(), z.mapv(poloidal));
        data.insert("gbdrift".into(), z.mapv(poloidal));
        data.insert("K".into(), Array1::zeros(n));
        data.insert("|grad(rho)|*|e_alpha|r,p|".into(), Array1::from_elem(n, 1.0));
        let span = grid.zeta()[grid.num_zeta() - 1] - grid.zeta()[0];
        data.insert("fieldline length".into(), Array1::from_elem(n, span));
        data
    }

    fn grid(rho: &[f64]) -> FieldLineGrid {
        let zeta: Vec<f64> = Array1::linspace(0.0, 8.0 * PI, 257).to_vec();
        FieldLineGrid::meshgrid(rho, &[0.0], &zeta).unwrap()
    }

    fn cache(num_quad: usize) -> QuadratureCache {
        let mut cache = QuadratureCache::new();
        cache.ensure(QuadratureKind::GaussLegendreSin, num_quad).unwrap();
        cache.ensure(QuadratureKind::ChebGauss2, num_quad).unwrap();
        cache
    }

    fn with_axis_limit<'a>(ctx: ComputeContext<'a>) -> ComputeContext<'a> {
        ComputeContext {
            axis_limit: Some(0.0),
            ..ctx
        }
    }

    #[test]
    fn test_zero_poloidal_drift_contributes_nothing() {
        // v_θ = 0 makes safe_div give 0, so a nonzero radial drift with zero
        // poloidal drift contributes nothing, while equal drifts give γ = π/4.
        let grid = grid(&[0.5]);
        let cache = cache(32);
        let ctx = with_axis_limit(ComputeContext::new(&grid, BounceConfig::default(), &cache));
        let zero = gamma_c_velasco(&ctx, &data(&grid, |_| 1.0, |_| 0.0)).unwrap();
        assert!(zero.iter().all(|&g| g == 0.0));
        let equal = gamma_c_velasco(&ctx, &data(&grid, |_| 1.0, |_| 1.0)).unwrap();
        assert!(equal[0] > 0.0 && equal[0].is_finite());
    }

    #[test]
    fn test_formulations_agree_without_shear() {
        // With K = 0 and unit |∇ρ||e_α| the two expressions coincide.
        let grid = grid(&[0.5]);
        let cache = cache(32);
        let ctx = with_axis_limit(ComputeContext::new(&grid, BounceConfig::default(), &cache));
        let data = data(&grid, |z| 0.3 + z.cos(), |z| 1.0 + 0.5 * z.sin());
        let nemov = gamma_c_nemov(&ctx, &data).unwrap();
        let velasco = gamma_c_velasco(&ctx, &data).unwrap();
        assert!(nemov[0] > 0.0);
        assert!((nemov[0] - velasco[0]).abs() <= 1e-12 * velasco[0].abs());
    }

    #[test]
    fn test_bounded_by_angle_limit() {
        // γ_c² ≤ 1, so S is at most the same sum with γ_c = 1.
        let grid = grid(&[0.5]);
        let cache = cache(32);
        let ctx = with_axis_limit(ComputeContext::new(&grid, BounceConfig::default(), &cache));
        let huge = gamma_c_velasco(&ctx, &data(&grid, |_| 1e9, |_| 1.0)).unwrap();
        let moderate = gamma_c_velasco(&ctx, &data(&grid, |_| 1.0, |_| 1.0)).unwrap();
        assert!(huge[0] > moderate[0]);
        assert!(huge[0].is_finite());
    }

    #[test]
    fn test_axis_surface_is_zero() {
        let grid = grid(&[0.0, 0.5]);
        let cache = cache(32);
        let ctx = with_axis_limit(ComputeContext::new(&grid, BounceConfig::default(), &cache));
        let data = data(&grid, |z| z.cos(), |_| 1.0);
        let g = gamma_c_nemov(&ctx, &data).unwrap();
        let axis = grid.surface_nodes(0);
        assert!(g.slice(ndarray::s![axis]).iter().all(|&v| v == 0.0));
        assert!(g[grid.num_nodes() - 1] > 0.0);
    }

    #[test]
    fn test_requires_prepared_quadrature() {
        let grid = grid(&[0.5]);
        let mut cache = QuadratureCache::new();
        cache.ensure(QuadratureKind::GaussLegendreSin, 32).unwrap();
        let ctx = ComputeContext::new(&grid, BounceConfig::default(), &cache);
        let data = data(&grid, |z| z.cos(), |_| 1.0);
        assert!(gamma_c_velasco(&ctx, &data).is_ok());
        assert!(gamma_c_nemov(&ctx, &data).is_err());
    }
}
