// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Field-line grid and the named data carried on it.
//!
//! Nodes are ordered rho-major, then alpha, with zeta fastest, so the data of
//! one flux surface is contiguous and one field line is a contiguous run of
//! `num_zeta` values.

use crate::constants::AXIS_RHO_TOL;
use crate::error::{FusionError, FusionResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView3};
use std::collections::BTreeMap;
use std::ops::Range;

/// Named quantities, one value per grid node.
pub type DataMap = BTreeMap<String, Array1<f64>>;

/// Meshgrid over (flux surface rho, field line alpha, toroidal angle zeta).
#[derive(Debug, Clone)]
pub struct FieldLineGrid {
    rho: Array1<f64>,
    alpha: Array1<f64>,
    zeta: Array1<f64>,
    has_axis: bool,
    /// node -> owning surface
    owner: Vec<usize>,
    /// surface -> owned nodes
    members: Vec<Range<usize>>,
}

fn check_unique(label: &str, values: &[f64]) -> FusionResult<()> {
    if values.is_empty() {
        return Err(FusionError::MalformedGrid(format!("no {label} values")));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(FusionError::MalformedGrid(format!(
            "{label} values must be finite, got {bad}"
        )));
    }
    for (i, a) in values.iter().enumerate() {
        if values[i + 1..].iter().any(|b| b == a) {
            return Err(FusionError::MalformedGrid(format!(
                "{label} value {a} appears more than once"
            )));
        }
    }
    Ok(())
}

impl FieldLineGrid {
    /// Build the meshgrid from unique coordinate values.
    pub fn meshgrid(rho: &[f64], alpha: &[f64], zeta: &[f64]) -> FusionResult<Self> {
        check_unique("rho", rho)?;
        check_unique("alpha", alpha)?;
        if rho.iter().any(|&r| r < 0.0) {
            return Err(FusionError::MalformedGrid(
                "rho values must be >= 0".to_string(),
            ));
        }
        if zeta.len() < 2 {
            return Err(FusionError::MalformedGrid(format!(
                "each field line needs at least 2 zeta nodes, got {}",
                zeta.len()
            )));
        }
        if zeta.iter().any(|z| !z.is_finite()) || zeta.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FusionError::MalformedGrid(
                "zeta values must be finite and strictly increasing".to_string(),
            ));
        }

        let per_surface = alpha.len() * zeta.len();
        let mut owner = Vec::with_capacity(rho.len() * per_surface);
        let mut members = Vec::with_capacity(rho.len());
        for ir in 0..rho.len() {
            let start = ir * per_surface;
            members.push(start..start + per_surface);
            owner.extend(std::iter::repeat(ir).take(per_surface));
        }

        Ok(FieldLineGrid {
            rho: Array1::from_vec(rho.to_vec()),
            alpha: Array1::from_vec(alpha.to_vec()),
            zeta: Array1::from_vec(zeta.to_vec()),
            has_axis: rho.iter().any(|&r| r.abs() <= AXIS_RHO_TOL),
            owner,
            members,
        })
    }

    /// Recover the meshgrid structure from raw `[num_nodes, 3]` coordinates.
    ///
    /// Fails with [`FusionError::MalformedGrid`] unless every alpha carries the
    /// same zeta sampling on every surface.
    pub fn from_nodes(nodes: &Array2<f64>) -> FusionResult<Self> {
        let (n, cols) = nodes.dim();
        if cols != 3 {
            return Err(FusionError::MalformedGrid(format!(
                "nodes must have 3 columns, got {cols}"
            )));
        }
        if n == 0 {
            return Err(FusionError::MalformedGrid("grid has no nodes".to_string()));
        }

        let r0 = nodes[[0, 0]];
        let a0 = nodes[[0, 1]];
        let nz = (0..n)
            .take_while(|&i| nodes[[i, 0]] == r0 && nodes[[i, 1]] == a0)
            .count();
        let na = (0..n)
            .step_by(nz)
            .take_while(|&i| nodes[[i, 0]] == r0)
            .count();
        if n % (na * nz) != 0 {
            return Err(FusionError::MalformedGrid(format!(
                "{n} nodes is not a multiple of {na} field lines x {nz} zeta nodes"
            )));
        }
        let nr = n / (na * nz);

        let rho: Vec<f64> = (0..nr).map(|ir| nodes[[ir * na * nz, 0]]).collect();
        let alpha: Vec<f64> = (0..na).map(|ia| nodes[[ia * nz, 1]]).collect();
        let zeta: Vec<f64> = (0..nz).map(|iz| nodes[[iz, 2]]).collect();

        for ir in 0..nr {
            for ia in 0..na {
                for iz in 0..nz {
                    let i = (ir * na + ia) * nz + iz;
                    if nodes[[i, 0]] != rho[ir]
                        || nodes[[i, 1]] != alpha[ia]
                        || nodes[[i, 2]] != zeta[iz]
                    {
                        return Err(FusionError::MalformedGrid(format!(
                            "node {i} = ({}, {}, {}) breaks the tensor-product ordering \
                             at (rho={}, alpha={}, zeta={})",
                            nodes[[i, 0]],
                            nodes[[i, 1]],
                            nodes[[i, 2]],
                            rho[ir],
                            alpha[ia],
                            zeta[iz]
                        )));
                    }
                }
            }
        }

        Self::meshgrid(&rho, &alpha, &zeta)
    }

    pub fn rho(&self) -> &Array1<f64> {
        &self.rho
    }

    pub fn alpha(&self) -> &Array1<f64> {
        &self.alpha
    }

    pub fn zeta(&self) -> &Array1<f64> {
        &self.zeta
    }

    pub fn num_rho(&self) -> usize {
        self.rho.len()
    }

    pub fn num_alpha(&self) -> usize {
        self.alpha.len()
    }

    pub fn num_zeta(&self) -> usize {
        self.zeta.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.owner.len()
    }

    /// Whether some surface sits on the magnetic axis (rho = 0).
    pub fn has_axis(&self) -> bool {
        self.has_axis
    }

    pub fn is_axis_surface(&self, ir: usize) -> bool {
        self.has_axis && self.rho[ir].abs() <= AXIS_RHO_TOL
    }

    /// Flat node index of (surface, field line, zeta).
    pub fn index(&self, ir: usize, ia: usize, iz: usize) -> usize {
        (ir * self.num_alpha() + ia) * self.num_zeta() + iz
    }

    /// Surface owning a node.
    pub fn owner(&self, node: usize) -> usize {
        self.owner[node]
    }

    /// Nodes owned by a surface.
    pub fn surface_nodes(&self, ir: usize) -> Range<usize> {
        self.members[ir].clone()
    }

    /// Node coordinates as `[num_nodes, 3]`.
    pub fn nodes(&self) -> Array2<f64> {
        let nz = self.num_zeta();
        let na = self.num_alpha();
        Array2::from_shape_fn((self.num_nodes(), 3), |(i, c)| match c {
            0 => self.rho[self.owner[i]],
            1 => self.alpha[(i / nz) % na],
            _ => self.zeta[i % nz],
        })
    }

    pub fn check_len(&self, name: &str, values: ArrayView1<f64>) -> FusionResult<()> {
        if values.len() != self.num_nodes() {
            return Err(FusionError::ShapeMismatch {
                name: name.to_string(),
                expected: self.num_nodes(),
                got: values.len(),
            });
        }
        Ok(())
    }

    /// One value per surface: the mean over the surface's nodes.
    ///
    /// The mean is taken about the first node so that a surface-constant
    /// quantity compresses to exactly its value.
    pub fn compress(&self, values: ArrayView1<f64>) -> FusionResult<Array1<f64>> {
        if values.len() != self.num_nodes() {
            return Err(FusionError::ShapeMismatch {
                name: "compress input".to_string(),
                expected: self.num_nodes(),
                got: values.len(),
            });
        }
        Ok(self
            .members
            .iter()
            .map(|range| {
                let first = values[range.start];
                let shift: f64 = range.clone().map(|i| values[i] - first).sum();
                first + shift / range.len() as f64
            })
            .collect())
    }

    /// Broadcast one value per surface to every node of that surface.
    pub fn expand(&self, per_surface: ArrayView1<f64>) -> FusionResult<Array1<f64>> {
        if per_surface.len() != self.num_rho() {
            return Err(FusionError::ShapeMismatch {
                name: "expand input".to_string(),
                expected: self.num_rho(),
                got: per_surface.len(),
            });
        }
        Ok(self.owner.iter().map(|&ir| per_surface[ir]).collect())
    }

    /// Zero-copy `(rho, alpha, zeta)` view of node data.
    pub fn meshgrid_reshape<'a>(
        &self,
        name: &str,
        values: &'a Array1<f64>,
    ) -> FusionResult<ArrayView3<'a, f64>> {
        self.check_len(name, values.view())?;
        let slice = values.as_slice().ok_or_else(|| {
            FusionError::PhysicsViolation(format!("quantity '{name}' is not contiguous"))
        })?;
        ArrayView3::from_shape((self.num_rho(), self.num_alpha(), self.num_zeta()), slice)
            .map_err(|e| FusionError::MalformedGrid(format!("reshape of '{name}' failed: {e}")))
    }
}
