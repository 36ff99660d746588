// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Effective Ripple
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Effective ripple ε_eff, the geometric factor of 1/ν neoclassical transport.
//!
//! Nemov, Kasilov, Kernbichler, Heyn, Phys. Plasmas 6, 4622 (1999):
//!   ε_eff^{3/2} = π/(8√2) (B₀R₀/⟨|∇ρ|⟩)² ∫ d(1/λ) λ³ ⟨Σ_j H_j²/I_j⟩ / L
//! with B₀ = max|B| on the surface and the well integrals
//!   H_j = ∫ √|1−λB| (4/(λB) − 1) |∇ρ|κ_g / B dℓ,
//!   I_j = ∫ √|1−λB| / B dℓ.

use crate::bounce::{FieldLine, LocalPoint};
use crate::cache::QuadratureKind;
use crate::pitch::PitchQuadrature;
use crate::reduce::{alpha_mean, require, sweep, PitchSetup};
use crate::registry::{bounce_hyperparameters, ComputeContext, GridRequirement, Hyperparameter, QuantityDef};
use fusion_math::quadrature::Quadrature;
use fusion_math::safe_div;
use fusion_types::config::BounceConfig;
use fusion_types::constants::EPSILON_EFF_PREFACTOR;
use fusion_types::error::FusionResult;
use fusion_types::state::DataMap;
use ndarray::Array1;

/// Default number of inverse-pitch nodes.
pub const EFFECTIVE_RIPPLE_NUM_PITCH: usize = 50;

const HYPERPARAMETERS: [Hyperparameter; 5] = bounce_hyperparameters("50");

pub const EFFECTIVE_RIPPLE_32: QuantityDef = QuantityDef {
    name: "effective ripple 3/2",
    label: "\\epsilon_{\\mathrm{eff}}^{3/2} = \\frac{\\pi}{8 \\sqrt{2}} R_0^2 \
            \\langle \\vert\\nabla \\psi\\vert \\rangle^{-2} B_0^{-1} \\int d\\lambda \
            \\lambda^{-2} \\langle \\sum_j H_j^2 / I_j \\rangle",
    units: "~",
    description: "Effective ripple modulation amplitude to 3/2 power",
    dependencies: &[
        "min_tz |B|",
        "max_tz |B|",
        "kappa_g",
        "R0",
        "|grad(rho)|",
        "<|grad(rho)|>",
        "fieldline length",
        "B^zeta",
        "B^zeta_z|r,a",
        "|B|",
        "|B|_z|r,a",
    ],
    grid_requirement: GridRequirement::Meshgrid,
    hyperparameters: &HYPERPARAMETERS,
    quadratures: &[QuadratureKind::ChebGauss2],
    axis_limit: Some(0.0),
    compute: effective_ripple_32,
};

pub const EFFECTIVE_RIPPLE: QuantityDef = QuantityDef {
    name: "effective ripple",
    label: "\\epsilon_{\\mathrm{eff}}",
    units: "~",
    description: "Effective ripple modulation amplitude",
    dependencies: &["effective ripple 3/2"],
    grid_requirement: GridRequirement::Any,
    hyperparameters: &[],
    quadratures: &[],
    axis_limit: Some(0.0),
    compute: effective_ripple,
};

/// Σ_k w_k (1/λ_k)^{-3} Σ_j H_j²/I_j along one field line.
///
/// The extra field of the line must be |∇ρ|κ_g.
pub fn ripple_line_sum(
    line: &FieldLine,
    pitch: &PitchQuadrature,
    quad: &Quadrature,
    bounce: &BounceConfig,
) -> FusionResult<f64> {
    let wells = line.points(&pitch.pitch_inv, bounce.num_well);
    let dh = |p: &LocalPoint| {
        (1.0 - p.pitch * p.b).abs().sqrt() * (4.0 / (p.pitch * p.b) - 1.0) * p.fields[0] / p.b
    };
    let di = |p: &LocalPoint| (1.0 - p.pitch * p.b).abs().sqrt() / p.b;
    let hi = line.integrate(&[&dh, &di], quad, &pitch.pitch_inv, &wells, bounce.batch)?;
    let (h, i) = (&hi[0], &hi[1]);

    let mut total = 0.0;
    for (k, (&pitch_inv, &w)) in pitch.pitch_inv.iter().zip(&pitch.weights).enumerate() {
        let wells_sum: f64 = h
            .row(k)
            .iter()
            .zip(i.row(k))
            .map(|(&h, &i)| safe_div(h * h, i))
            .sum();
        total += w * pitch_inv.powi(-3) * wells_sum;
    }
    Ok(total)
}

pub fn effective_ripple_32(ctx: &ComputeContext<'_>, data: &DataMap) -> FusionResult<Array1<f64>> {
    let grid = ctx.grid;
    let quad = ctx.quadratures.get(QuadratureKind::ChebGauss2, ctx.bounce.num_quad)?;
    let grad_rho = require(data, "|grad(rho)|")?;
    let kappa_g = require(data, "kappa_g")?;
    grid.check_len("|grad(rho)|", grad_rho.view())?;
    grid.check_len("kappa_g", kappa_g.view())?;
    let radial_drift = grad_rho * kappa_g;

    let setup = PitchSetup {
        num_pitch: ctx.bounce.num_pitch_or(EFFECTIVE_RIPPLE_NUM_PITCH),
        rule: ctx.bounce.pitch_rule,
    };
    let per_line = sweep(
        grid,
        data,
        &[("|grad(rho)|*kappa_g", &radial_drift)],
        setup,
        ctx.axis_limit,
        |line, pitch| ripple_line_sum(line, pitch, &quad, &ctx.bounce),
    )?;
    let mean = grid.expand(alpha_mean(&per_line).view())?;

    let b0 = require(data, "max_tz |B|")?;
    let r0 = require(data, "R0")?;
    let grad_rho_avg = require(data, "<|grad(rho)|>")?;
    let length = require(data, "fieldline length")?;
    for (name, values) in [
        ("max_tz |B|", b0),
        ("R0", r0),
        ("<|grad(rho)|>", grad_rho_avg),
        ("fieldline length", length),
    ] {
        grid.check_len(name, values.view())?;
    }
    Ok(Array1::from_shape_fn(grid.num_nodes(), |n| {
        let scale = b0[n] * r0[n] / grad_rho_avg[n];
        EPSILON_EFF_PREFACTOR * scale * scale * mean[n] / length[n]
    }))
}

pub fn effective_ripple(_: &ComputeContext<'_>, data: &DataMap) -> FusionResult<Array1<f64>> {
    Ok(require(data, "effective ripple 3/2")?.mapv(|e| e.powf(2.0 / 3.0)))
}
