// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed grid (expected a meshgrid over (rho, alpha, zeta) with zeta fastest): {0}")]
    MalformedGrid(String),

    #[error("Missing quantity '{name}' in supplied data")]
    MissingQuantity { name: String },

    #[error("Unknown quantity: {0}")]
    UnknownQuantity(String),

    #[error("Dependency cycle through quantity '{0}'")]
    DependencyCycle(String),

    #[error("Quantity '{name}' has {got} values, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FusionResult<T> = Result<T, FusionError>;
