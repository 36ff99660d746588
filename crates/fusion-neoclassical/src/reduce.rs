// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Surface Sweep
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sequential reduction over flux surfaces and field lines.
//!
//! Surfaces are visited one at a time in grid order and the field lines of a
//! surface one at a time in α order, so the peak scratch memory is that of a
//! single field line. Every field line of a surface shares the surface's pitch
//! quadrature.

use crate::bounce::{FieldLine, REQUIRED_NAMES};
use crate::pitch::{is_untrapped, PitchQuadrature};
use fusion_math::quadrature::simpson_irregular;
use fusion_types::config::PitchRule;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{DataMap, FieldLineGrid};
use ndarray::{Array1, Array2, ArrayView1, ArrayView3, Axis};
use tracing::debug;

/// Look up an input quantity, failing with the quantity's name.
pub fn require<'a>(data: &'a DataMap, name: &str) -> FusionResult<&'a Array1<f64>> {
    data.get(name).ok_or_else(|| FusionError::MissingQuantity {
        name: name.to_string(),
    })
}

/// One field line of a `(rho, alpha, zeta)` view.
fn line<'a>(view: ArrayView3<'a, f64>, ir: usize, ia: usize) -> ArrayView1<'a, f64> {
    view.index_axis_move(Axis(0), ir).index_axis_move(Axis(0), ia)
}

/// How the pitch quadrature of every surface is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchSetup {
    pub num_pitch: usize,
    pub rule: PitchRule,
}

/// Evaluate `per_line` on every (surface, field line) of the grid.
///
/// `extra` lists the node-valued fields each [`FieldLine`] interpolates, in
/// the order the integrands read them from [`crate::bounce::LocalPoint`].
/// Surfaces on the magnetic axis take `axis_limit` when one is given.
/// Surfaces without trapped particles take zero. Returns `(rho, alpha)`.
pub fn sweep<F>(
    grid: &FieldLineGrid,
    data: &DataMap,
    extra: &[(&str, &Array1<f64>)],
    pitch: PitchSetup,
    axis_limit: Option<f64>,
    mut per_line: F,
) -> FusionResult<Array2<f64>>
where
    F: FnMut(&FieldLine, &PitchQuadrature) -> FusionResult<f64>,
{
    let [b_sup, b_sup_z, b, b_z] = REQUIRED_NAMES;
    let b_sup = grid.meshgrid_reshape(b_sup, require(data, b_sup)?)?;
    let b_sup_z = grid.meshgrid_reshape(b_sup_z, require(data, b_sup_z)?)?;
    let b = grid.meshgrid_reshape(b, require(data, b)?)?;
    let b_z = grid.meshgrid_reshape(b_z, require(data, b_z)?)?;
    let extra = extra
        .iter()
        .map(|&(name, values)| Ok((name, grid.meshgrid_reshape(name, values)?)))
        .collect::<FusionResult<Vec<_>>>()?;
    let min_b = grid.compress(require(data, "min_tz |B|")?.view())?;
    let max_b = grid.compress(require(data, "max_tz |B|")?.view())?;
    let zeta = grid.zeta().to_vec();

    let mut out = Array2::zeros((grid.num_rho(), grid.num_alpha()));
    for ir in 0..grid.num_rho() {
        if let Some(limit) = axis_limit.filter(|_| grid.is_axis_surface(ir)) {
            debug!(surface = ir, value = limit, "axis surface takes its limit value");
            out.row_mut(ir).fill(limit);
            continue;
        }
        if is_untrapped(min_b[ir], max_b[ir]) {
            debug!(surface = ir, min_b = min_b[ir], "no trapped particles on surface");
            continue;
        }
        let quad = PitchQuadrature::build(min_b[ir], max_b[ir], pitch.num_pitch, pitch.rule)?;
        debug!(
            surface = ir,
            field_lines = grid.num_alpha(),
            num_pitch = quad.len(),
            "sweeping surface"
        );
        for ia in 0..grid.num_alpha() {
            let fields: Vec<(&str, ArrayView1<f64>)> = extra
                .iter()
                .map(|&(name, view)| (name, line(view, ir, ia)))
                .collect();
            let field_line = FieldLine::new(
                &zeta,
                line(b, ir, ia),
                line(b_z, ir, ia),
                line(b_sup, ir, ia),
                line(b_sup_z, ir, ia),
                &fields,
            )?;
            out[[ir, ia]] = per_line(&field_line, &quad)?;
        }
    }
    Ok(out)
}

/// Line integral ∫ f dζ of a node quantity along every field line, by the
/// composite Simpson rule on the grid's ζ nodes. Returns `(rho, alpha)`.
pub fn integrate_lines(
    grid: &FieldLineGrid,
    name: &str,
    integrand: &Array1<f64>,
) -> FusionResult<Array2<f64>> {
    let view = grid.meshgrid_reshape(name, integrand)?;
    let zeta = grid.zeta().to_vec();
    let mut out = Array2::zeros((grid.num_rho(), grid.num_alpha()));
    for ir in 0..grid.num_rho() {
        for ia in 0..grid.num_alpha() {
            let samples = line(view, ir, ia).to_vec();
            out[[ir, ia]] = simpson_irregular(&samples, &zeta)?;
        }
    }
    Ok(out)
}

/// Unweighted mean over field lines.
///
/// Field lines followed over several transits sample the surface unevenly in
/// α, so every line counts the same regardless of the α spacing.
pub fn alpha_mean(per_line: &Array2<f64>) -> Array1<f64> {
    let n = per_line.ncols() as f64;
    per_line.sum_axis(Axis(1)) / n
}
