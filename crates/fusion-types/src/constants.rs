// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Effective ripple prefactor π / (8√2) (Nemov et al. 1999, eq. 29).
pub const EPSILON_EFF_PREFACTOR: f64 = 0.2776801836348979;

/// Γ_c prefactor π / (2√2) (Nemov et al. 2008, eq. 61).
pub const GAMMA_C_PREFACTOR: f64 = 1.1107207345395915;

/// (2/π)², converts arctan² into γ_c².
pub const GAMMA_C_ANGLE_NORM: f64 = 0.4052847345693511;

/// Surfaces with (max|B| - min|B|) / max|B| below this hold no trapped particles.
pub const UNTRAPPED_RTOL: f64 = 1e-12;

/// Flux surface label treated as the magnetic axis.
pub const AXIS_RHO_TOL: f64 = 1e-14;

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_prefactors_match_closed_form() {
        let sqrt2 = 2.0_f64.sqrt();
        assert!((EPSILON_EFF_PREFACTOR - PI / (8.0 * sqrt2)).abs() < 1e-15);
        assert!((GAMMA_C_PREFACTOR - PI / (2.0 * sqrt2)).abs() < 1e-15);
        assert!((GAMMA_C_ANGLE_NORM - 4.0 / (PI * PI)).abs() < 1e-15);
    }
}
