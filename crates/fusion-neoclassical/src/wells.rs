// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Bounce Wells
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bounce points of trapped orbits along one field line.
//!
//! For an inverse pitch 1/λ the particle is reflected where |B|(ζ) = 1/λ.
//! A well is a pair of consecutive bounce points (ζ₁, ζ₂) with |B| falling
//! through 1/λ at ζ₁ and rising through it at ζ₂, so |B| < 1/λ in between.

use fusion_math::interp::CubicHermite;
use fusion_math::roots::cubic_roots_in;

/// Crossings closer than this fraction of the knot spacing are merged. Two
/// merged crossings of opposite sense are a tangential touch.
const ROOT_MERGE_RTOL: f64 = 1e-7;
/// A crossing with |∂|B|/∂ζ|·h below this fraction of 1/λ is a touch.
const TANGENT_RTOL: f64 = 1e-7;

/// One bounce well [left, right] in ζ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Well {
    pub left: f64,
    pub right: f64,
}

impl Well {
    /// Zero-width placeholder used to pad a fixed number of wells per pitch.
    pub const EMPTY: Well = Well {
        left: 0.0,
        right: 0.0,
    };

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Zero-width wells contribute nothing to any bounce integral.
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left
    }
}

/// Wells of one field line, `num_well` per pitch, padded with
/// [`Well::EMPTY`].
#[derive(Debug, Clone, PartialEq)]
pub struct BounceWells {
    num_pitch: usize,
    num_well: usize,
    wells: Vec<Well>,
}

impl BounceWells {
    pub fn num_pitch(&self) -> usize {
        self.num_pitch
    }

    pub fn num_well(&self) -> usize {
        self.num_well
    }

    /// Wells of pitch `k` in profile order.
    pub fn row(&self, k: usize) -> &[Well] {
        &self.wells[k * self.num_well..(k + 1) * self.num_well]
    }

    pub fn get(&self, k: usize, j: usize) -> Well {
        self.wells[k * self.num_well + j]
    }

    /// Wells of pitch `k` with nonzero width.
    pub fn count(&self, k: usize) -> usize {
        self.row(k).iter().filter(|w| !w.is_degenerate()).count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    zeta: f64,
    slope: f64,
}

fn sense(slope: f64) -> i8 {
    if slope > 0.0 {
        1
    } else if slope < 0.0 {
        -1
    } else {
        0
    }
}

/// Every point where the profile crosses or touches `pitch_inv`, ascending.
///
/// A root at the right end of a segment other than the last is left to the
/// next segment. Roots within the merge tolerance collapse into one crossing
/// that keeps its sense, or into a touch when the senses disagree. Touches
/// carry a zero slope.
fn crossings(profile: &CubicHermite, pitch_inv: f64) -> Vec<Crossing> {
    let knots = profile.knots();
    let last = profile.num_segments() - 1;
    let mut out: Vec<Crossing> = Vec::new();
    for i in 0..=last {
        let h = knots[i + 1] - knots[i];
        let [c0, c1, c2, c3] = profile.coefficients(i);
        for dx in cubic_roots_in([c0 - pitch_inv, c1, c2, c3], h) {
            if dx >= h && i < last {
                continue;
            }
            let mut slope = c1 + dx * (2.0 * c2 + dx * 3.0 * c3);
            if slope.abs() * h <= TANGENT_RTOL * pitch_inv.abs() {
                slope = 0.0;
            }
            let zeta = knots[i] + dx;
            if let Some(prev) = out.last_mut() {
                if zeta - prev.zeta <= ROOT_MERGE_RTOL * h {
                    // A crossing on a knot is found by both segments with
                    // slopes that differ in the last bits.
                    if sense(prev.slope) != sense(slope) {
                        prev.slope = 0.0;
                    }
                    continue;
                }
            }
            out.push(Crossing { zeta, slope });
        }
    }
    out
}

/// Wells of one pitch in profile order, before truncation.
///
/// A falling crossing opens a well and a rising one closes it. A rising
/// crossing with nothing open, or a well still open at the end of the line,
/// belongs to a well cut by the ends of the traced line and is dropped. A
/// tangential touch is a zero-width well outside a well and splits the well
/// it lies in.
pub fn locate_wells(profile: &CubicHermite, pitch_inv: f64) -> Vec<Well> {
    let mut wells = Vec::new();
    let mut open: Option<f64> = None;
    for c in crossings(profile, pitch_inv) {
        if c.slope < 0.0 {
            open = Some(c.zeta);
        } else if c.slope > 0.0 {
            if let Some(left) = open.take() {
                wells.push(Well {
                    left,
                    right: c.zeta,
                });
            }
        } else if let Some(left) = open {
            wells.push(Well {
                left,
                right: c.zeta,
            });
            open = Some(c.zeta);
        } else {
            wells.push(Well {
                left: c.zeta,
                right: c.zeta,
            });
        }
    }
    wells
}

/// Wells of every pitch on one field line.
///
/// With `num_well = Some(n)` only the first `n` wells of each pitch are kept.
/// Otherwise the width is the largest well count over the pitches. Short rows
/// are padded with zero-width wells.
pub fn bounce_points(
    profile: &CubicHermite,
    pitch_inv: &[f64],
    num_well: Option<usize>,
) -> BounceWells {
    let found: Vec<Vec<Well>> = pitch_inv
        .iter()
        .map(|&p| locate_wells(profile, p))
        .collect();
    let width = num_well.unwrap_or_else(|| found.iter().map(Vec::len).max().unwrap_or(0));
    let mut wells = Vec::with_capacity(pitch_inv.len() * width);
    for row in &found {
        let kept = row.len().min(width);
        wells.extend_from_slice(&row[..kept]);
        wells.extend(std::iter::repeat(Well::EMPTY).take(width - kept));
    }
    BounceWells {
        num_pitch: pitch_inv.len(),
        num_well: width,
        wells,
    }
}

/// A-priori bound on the number of wells per pitch along a field line.
///
/// `poloidal_res` and `toroidal_res` are the Fourier resolutions A and B of
/// |B| in straight-field-line coordinates; the bound is ⌈(A|ι| + B)·transits⌉.
pub fn estimate_num_well(
    poloidal_res: usize,
    toroidal_res: usize,
    iota: f64,
    num_transit: usize,
) -> usize {
    let per_transit = poloidal_res as f64 * iota.abs() + toroidal_res as f64;
    (per_transit * num_transit as f64).ceil() as usize
}
