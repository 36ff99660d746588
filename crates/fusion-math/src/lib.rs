// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mathematical primitives for SCPN Fusion Core.

pub mod interp;
pub mod quadrature;
pub mod roots;

/// Division that returns zero when the denominator is exactly zero.
///
/// Used where a vanishing denominator means a vanishing contribution,
/// e.g. a bounce well of zero measure.
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
