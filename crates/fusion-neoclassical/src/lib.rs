// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Neoclassical
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bounce-averaged neoclassical transport proxies on traced field lines.
//!
//! Pipeline: pitch quadrature per surface, bounce wells per field line,
//! bounce integrals per well, reduction over wells, pitch and field lines.
//! Quantities are declared in a registry and evaluated through a plan.

pub mod bounce;
pub mod cache;
pub mod gamma_c;
pub mod length;
pub mod model_field;
pub mod objective;
pub mod pitch;
pub mod reduce;
pub mod registry;
pub mod ripple;
pub mod wells;

pub use model_field::{ModelParams, ModelStellarator};
pub use objective::{Equilibrium, NeoclassicalObjective, Target};
pub use registry::{ComputeContext, EvaluationPlan, QuantityDef, Registry};
