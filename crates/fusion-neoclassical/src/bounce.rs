// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Bounce Integrals
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bounce integrals along one field line.
//!
//! For a well [ζ₁, ζ₂] and integrand f the bounce integral is
//!   ∫ f dℓ/|B| = ∫_{ζ₁}^{ζ₂} f / |B^ζ| dζ,
//! evaluated by mapping a canonical rule on [-1, 1] affinely onto the well.
//! The rule is chosen by the caller to match the endpoint behaviour of f.
//!
//! `batch = true` evaluates every pitch of the line in one block;
//! `batch = false` evaluates one pitch per block, which bounds the scratch
//! memory by one pitch × well × node block. The arithmetic order is the same
//! in both modes, so the results are bit-identical. Under reverse-mode
//! differentiation the adjoint keeps every block's intermediates alive, so
//! `batch = false` does not reduce peak memory there.

use crate::wells::{bounce_points, BounceWells};
use fusion_math::interp::CubicHermite;
use fusion_math::quadrature::{bijection_from_disc, grad_bijection_from_disc, Quadrature};
use fusion_types::error::{FusionError, FusionResult};
use ndarray::{Array2, ArrayView1};
use std::ops::Range;

/// Quantities every field line needs: the field strength, the toroidal
/// contravariant component, and their ζ-derivatives along the line.
pub const REQUIRED_NAMES: [&str; 4] = ["B^zeta", "B^zeta_z|r,a", "|B|", "|B|_z|r,a"];

/// Local state handed to an integrand at one quadrature node.
#[derive(Debug, Clone, Copy)]
pub struct LocalPoint<'a> {
    /// |B| at the node.
    pub b: f64,
    /// Pitch λ.
    pub pitch: f64,
    /// Extra fields interpolated to the node, in the order given to
    /// [`FieldLine::new`].
    pub fields: &'a [f64],
}

/// Integrand of a bounce integral, without the 1/|B^ζ| arc-length factor.
pub type Integrand<'f> = &'f dyn Fn(&LocalPoint) -> f64;

/// Splines of one field line.
#[derive(Debug, Clone)]
pub struct FieldLine {
    b: CubicHermite,
    b_sup_zeta: CubicHermite,
    fields: Vec<CubicHermite>,
}

fn owned(name: &str, values: ArrayView1<f64>, len: usize) -> FusionResult<Vec<f64>> {
    if values.len() != len {
        return Err(FusionError::ShapeMismatch {
            name: name.to_string(),
            expected: len,
            got: values.len(),
        });
    }
    Ok(values.to_vec())
}

impl FieldLine {
    /// Build the splines of one line from its samples.
    ///
    /// `b` and `b_sup_zeta` use their ζ-derivatives as Hermite slopes. Extra
    /// fields use finite-difference slopes.
    pub fn new(
        zeta: &[f64],
        b: ArrayView1<f64>,
        b_z: ArrayView1<f64>,
        b_sup_zeta: ArrayView1<f64>,
        b_sup_zeta_z: ArrayView1<f64>,
        fields: &[(&str, ArrayView1<f64>)],
    ) -> FusionResult<Self> {
        let n = zeta.len();
        let b = CubicHermite::new(zeta.to_vec(), owned("|B|", b, n)?, owned("|B|_z|r,a", b_z, n)?)?;
        let b_sup_zeta = CubicHermite::new(
            zeta.to_vec(),
            owned("B^zeta", b_sup_zeta, n)?,
            owned("B^zeta_z|r,a", b_sup_zeta_z, n)?,
        )?;
        let fields = fields
            .iter()
            .map(|(name, values)| {
                CubicHermite::with_finite_difference_slopes(zeta.to_vec(), owned(name, *values, n)?)
            })
            .collect::<FusionResult<Vec<_>>>()?;
        Ok(FieldLine {
            b,
            b_sup_zeta,
            fields,
        })
    }

    /// The |B| profile along the line.
    pub fn field_strength(&self) -> &CubicHermite {
        &self.b
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Bounce wells for every inverse pitch.
    pub fn points(&self, pitch_inv: &[f64], num_well: Option<usize>) -> BounceWells {
        bounce_points(&self.b, pitch_inv, num_well)
    }

    /// Bounce integrals of each integrand over every (pitch, well).
    ///
    /// Returns one `(num_pitch, num_well)` array per integrand. Zero-width
    /// wells give exactly zero without evaluating the integrand.
    pub fn integrate(
        &self,
        integrands: &[Integrand<'_>],
        quad: &Quadrature,
        pitch_inv: &[f64],
        wells: &BounceWells,
        batch: bool,
    ) -> FusionResult<Vec<Array2<f64>>> {
        if wells.num_pitch() != pitch_inv.len() {
            return Err(FusionError::ShapeMismatch {
                name: "bounce wells".to_string(),
                expected: pitch_inv.len(),
                got: wells.num_pitch(),
            });
        }
        let shape = (pitch_inv.len(), wells.num_well());
        let mut out: Vec<Array2<f64>> = integrands.iter().map(|_| Array2::zeros(shape)).collect();
        if batch {
            self.integrate_block(integrands, quad, pitch_inv, wells, 0..pitch_inv.len(), &mut out);
        } else {
            for k in 0..pitch_inv.len() {
                self.integrate_block(integrands, quad, pitch_inv, wells, k..k + 1, &mut out);
            }
        }
        Ok(out)
    }

    fn integrate_block(
        &self,
        integrands: &[Integrand<'_>],
        quad: &Quadrature,
        pitch_inv: &[f64],
        wells: &BounceWells,
        pitches: Range<usize>,
        out: &mut [Array2<f64>],
    ) {
        let nq = quad.len();
        let nf = self.fields.len();

        let mut zeta = Vec::with_capacity(pitches.len() * wells.num_well() * nq);
        for k in pitches.clone() {
            for well in wells.row(k) {
                zeta.extend(
                    quad.nodes
                        .iter()
                        .map(|&x| bijection_from_disc(x, well.left, well.right)),
                );
            }
        }
        let b: Vec<f64> = zeta.iter().map(|&z| self.b.eval(z)).collect();
        let b_sup: Vec<f64> = zeta.iter().map(|&z| self.b_sup_zeta.eval(z).abs()).collect();
        let mut fields = Vec::with_capacity(zeta.len() * nf);
        for &z in &zeta {
            fields.extend(self.fields.iter().map(|f| f.eval(z)));
        }

        let mut p = 0;
        for k in pitches {
            let pitch = 1.0 / pitch_inv[k];
            for (j, well) in wells.row(k).iter().enumerate() {
                if well.is_degenerate() {
                    p += nq;
                    continue;
                }
                let jac = grad_bijection_from_disc(well.left, well.right);
                for (f, result) in integrands.iter().zip(out.iter_mut()) {
                    let mut acc = 0.0;
                    for (q, &w) in quad.weights.iter().enumerate() {
                        let i = p + q;
                        let point = LocalPoint {
                            b: b[i],
                            pitch,
                            fields: &fields[i * nf..(i + 1) * nf],
                        };
                        acc += w * f(&point) / b_sup[i];
                    }
                    result[[k, j]] = acc * jac;
                }
                p += nq;
            }
        }
    }

    /// Extra field `field` at the location of minimum |B| inside each well.
    pub fn interp_to_argmin(&self, field: usize, wells: &BounceWells) -> FusionResult<Array2<f64>> {
        let spline = self.fields.get(field).ok_or_else(|| {
            FusionError::ConfigError(format!(
                "field index {field} out of range for a line with {} fields",
                self.fields.len()
            ))
        })?;
        Ok(Array2::from_shape_fn(
            (wells.num_pitch(), wells.num_well()),
            |(k, j)| {
                let well = wells.get(k, j);
                if well.is_degenerate() {
                    0.0
                } else {
                    spline.eval(self.b.argmin(well.left, well.right))
                }
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_math::quadrature::{chebgauss2, leggauss};
    use ndarray::Array1;
    use std::f64::consts::PI;

    /// |B| = 1 − 0.3 cos ζ, B^ζ = 2, one extra field g = 1 + 0.5 sin ζ.
    fn cosine_line(periods: usize) -> (Vec<f64>, FieldLine) {
        let n = periods * 64 + 1;
        let zeta: Vec<f64> = Array1::linspace(0.0, 2.0 * PI * periods as f64, n).to_vec();
        let b: Array1<f64> = zeta.iter().map(|z| 1.0 - 0.3 * z.cos()).collect();
        let b_z: Array1<f64> = zeta.iter().map(|z| 0.3 * z.sin()).collect();
        let b_sup = Array1::from_elem(n, 2.0);
        let b_sup_z = Array1::zeros(n);
        let g: Array1<f64> = zeta.iter().map(|z| 1.0 + 0.5 * z.sin()).collect();
        let line = FieldLine::new(
            &zeta,
            b.view(),
            b_z.view(),
            b_sup.view(),
            b_sup_z.view(),
            &[("g", g.view())],
        )
        .unwrap();
        (zeta, line)
    }

    #[test]
    fn test_constant_integrand_gives_well_width() {
        let (_, line) = cosine_line(3);
        let pitch_inv = [0.9, 1.0, 1.2];
        let wells = line.points(&pitch_inv, None);
        let quad = leggauss(16).unwrap();
        let one = |_: &LocalPoint| 1.0;
        let out = line.integrate(&[&one], &quad, &pitch_inv, &wells, true).unwrap();
        for k in 0..pitch_inv.len() {
            for j in 0..wells.num_well() {
                let expected = wells.get(k, j).width() / 2.0;
                assert!((out[0][[k, j]] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_sign_of_integrals() {
        let (_, line) = cosine_line(4);
        let pitch_inv = [0.8, 1.1, 1.25];
        let wells = line.points(&pitch_inv, None);
        let quad = chebgauss2(24).unwrap();
        let positive = |p: &LocalPoint| (1.0 - p.pitch * p.b).abs().sqrt() * p.fields[0];
        let zero = |_: &LocalPoint| 0.0;
        let out = line
            .integrate(&[&positive, &zero], &quad, &pitch_inv, &wells, true)
            .unwrap();
        for k in 0..pitch_inv.len() {
            for j in 0..wells.num_well() {
                if wells.get(k, j).is_degenerate() {
                    assert_eq!(out[0][[k, j]], 0.0);
                } else {
                    assert!(out[0][[k, j]] > 0.0, "pitch {k} well {j}");
                }
                assert_eq!(out[1][[k, j]], 0.0);
            }
        }
    }

    #[test]
    fn test_batch_modes_bit_identical() {
        let (_, line) = cosine_line(5);
        let pitch_inv: Vec<f64> = (1..20).map(|i| 0.7 + 0.03 * i as f64).collect();
        let wells = line.points(&pitch_inv, Some(6));
        let quad = leggauss(32).unwrap().with_automorphism();
        let f = |p: &LocalPoint| p.fields[0] / (1.0 - p.pitch * p.b).abs().sqrt();
        let batched = line.integrate(&[&f], &quad, &pitch_inv, &wells, true).unwrap();
        let swept = line.integrate(&[&f], &quad, &pitch_inv, &wells, false).unwrap();
        assert_eq!(batched, swept);
    }

    #[test]
    fn test_known_bounce_integral() {
        // Deeply trapped limit: ∫ dζ/√(1 − λB) over a well of a harmonic
        // |B| tends to π√(2/(λ B'')) with B'' = 0.3.
        let (_, line) = cosine_line(3);
        let pitch_inv = [0.7 + 1e-4];
        let wells = line.points(&pitch_inv, None);
        assert_eq!(wells.count(0), 2);
        let quad = leggauss(48).unwrap().with_automorphism();
        let f = |p: &LocalPoint| 1.0 / (1.0 - p.pitch * p.b).abs().sqrt();
        let out = line.integrate(&[&f], &quad, &pitch_inv, &wells, true).unwrap();
        // B^ζ = 2 divides the integral.
        let expected = PI * (2.0 * pitch_inv[0] / 0.3).sqrt() / 2.0;
        let got = out[0][[0, 0]];
        assert!((got - expected).abs() / expected < 1e-2, "{got} vs {expected}");
    }

    #[test]
    fn test_interp_to_argmin() {
        let (_, line) = cosine_line(3);
        let pitch_inv = [1.0];
        let wells = line.points(&pitch_inv, None);
        let at_min = line.interp_to_argmin(0, &wells).unwrap();
        // Minima of |B| at ζ = 2πk where g = 1.
        for j in 0..wells.num_well() {
            assert!((at_min[[0, j]] - 1.0).abs() < 1e-6, "{}", at_min[[0, j]]);
        }
        assert!(line.interp_to_argmin(3, &wells).is_err());
    }

    #[test]
    fn test_rejects_ragged_samples() {
        let zeta = [0.0, 1.0, 2.0];
        let short = Array1::from_vec(vec![1.0, 2.0]);
        let ok = Array1::from_vec(vec![1.0, 2.0, 1.0]);
        let err = FieldLine::new(&zeta, short.view(), ok.view(), ok.view(), ok.view(), &[])
            .unwrap_err();
        assert!(matches!(err, FusionError::ShapeMismatch { .. }));
    }
}
