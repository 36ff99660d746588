// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field Line Length
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Proper length of the traced field lines, the normalization of every
//! flux-surface average taken along them.

use crate::reduce::{alpha_mean, integrate_lines, require};
use crate::registry::{ComputeContext, GridRequirement, QuantityDef};
use fusion_types::error::FusionResult;
use fusion_types::state::DataMap;
use ndarray::Array1;

pub const FIELDLINE_LENGTH: QuantityDef = QuantityDef {
    name: "fieldline length",
    label: "\\int_{\\zeta_{\\mathrm{min}}}^{\\zeta_{\\mathrm{max}}} \\frac{d\\zeta}{|B^{\\zeta}|}",
    units: "m / T",
    description: "(Mean) proper length of field line(s)",
    dependencies: &["B^zeta"],
    grid_requirement: GridRequirement::Meshgrid,
    hyperparameters: &[],
    quadratures: &[],
    axis_limit: None,
    compute: fieldline_length,
};

pub const FIELDLINE_LENGTH_OVER_VOLUME: QuantityDef = QuantityDef {
    name: "fieldline length/volume",
    label: "\\int_{\\zeta_{\\mathrm{min}}}^{\\zeta_{\\mathrm{max}}} \\frac{d\\zeta}{|B^{\\zeta} \\sqrt g|}",
    units: "1 / Wb",
    description: "(Mean) proper length over volume of field line(s)",
    dependencies: &["B^zeta", "sqrt(g)"],
    grid_requirement: GridRequirement::Meshgrid,
    hyperparameters: &[],
    quadratures: &[],
    axis_limit: None,
    compute: fieldline_length_over_volume,
};

/// |mean over α of ∫ f dζ|, broadcast to every node of the surface.
fn mean_line_integral(ctx: &ComputeContext<'_>, name: &str, f: &Array1<f64>) -> FusionResult<Array1<f64>> {
    let per_line = integrate_lines(ctx.grid, name, f)?;
    let per_surface = alpha_mean(&per_line).mapv(f64::abs);
    ctx.grid.expand(per_surface.view())
}

pub fn fieldline_length(ctx: &ComputeContext<'_>, data: &DataMap) -> FusionResult<Array1<f64>> {
    let b_sup_zeta = require(data, "B^zeta")?;
    mean_line_integral(ctx, "1/B^zeta", &b_sup_zeta.mapv(|b| 1.0 / b))
}

pub fn fieldline_length_over_volume(
    ctx: &ComputeContext<'_>,
    data: &DataMap,
) -> FusionResult<Array1<f64>> {
    let b_sup_zeta = require(data, "B^zeta")?;
    let sqrt_g = require(data, "sqrt(g)")?;
    ctx.grid.check_len("sqrt(g)", sqrt_g.view())?;
    let f = Array1::from_shape_fn(b_sup_zeta.len(), |i| 1.0 / (b_sup_zeta[i] * sqrt_g[i]));
    mean_line_integral(ctx, "1/(B^zeta sqrt(g))", &f)
}
