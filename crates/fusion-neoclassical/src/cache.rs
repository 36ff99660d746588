// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Quadrature Cache
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Canonical bounce quadratures built once per (kind, order).

use fusion_math::quadrature::{chebgauss2, leggauss, Quadrature};
use fusion_types::error::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical rules on [-1, 1] used for bounce integrals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadratureKind {
    /// Chebyshev–Gauss, second kind, weight folded in. For integrands that
    /// vanish like √|1−λB| at the bounce points.
    ChebGauss2,
    /// Gauss–Legendre composed with x ↦ sin(πx/2). For integrands with
    /// 1/√|1−λB| singularities at the bounce points.
    GaussLegendreSin,
}

impl QuadratureKind {
    pub fn build(self, order: usize) -> FusionResult<Quadrature> {
        match self {
            QuadratureKind::ChebGauss2 => chebgauss2(order),
            QuadratureKind::GaussLegendreSin => Ok(leggauss(order)?.with_automorphism()),
        }
    }
}

/// Filled while an evaluation is set up, then only read.
#[derive(Debug, Clone, Default)]
pub struct QuadratureCache {
    rules: HashMap<(QuadratureKind, usize), Arc<Quadrature>>,
}

impl QuadratureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the rule unless it is already cached.
    pub fn ensure(&mut self, kind: QuadratureKind, order: usize) -> FusionResult<Arc<Quadrature>> {
        if let Some(rule) = self.rules.get(&(kind, order)) {
            return Ok(Arc::clone(rule));
        }
        let rule = Arc::new(kind.build(order)?);
        self.rules.insert((kind, order), Arc::clone(&rule));
        Ok(rule)
    }

    pub fn get(&self, kind: QuadratureKind, order: usize) -> FusionResult<Arc<Quadrature>> {
        self.rules
            .get(&(kind, order))
            .cloned()
            .ok_or_else(|| {
                FusionError::ConfigError(format!(
                    "quadrature {kind:?} of order {order} was not prepared before evaluation"
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
