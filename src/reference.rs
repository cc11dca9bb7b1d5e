//! Brute-force reference finder and analysis helpers.
//!
//! The reference engine evaluates the longitudinal test on every
//! `(inner, outer)` pair, gated only by the blunt angular cutoff
//! `|phi_outer - phi_inner| <= W` taken with wrapping 16-bit arithmetic. It
//! makes no use of sorting, windowing cursors, or the incremental trig
//! stepper, which is what makes it trustworthy ground truth for the windowed
//! engine: the two must produce the same candidate set (ignoring duplicates
//! and order).
//!
//! Also hosted here are the division-based extrapolation helpers used for
//! diagnostics; the engines themselves use the division-free formulation in
//! the compatibility test.

use std::f32::consts::PI;

use rustc_hash::FxHashSet;

use crate::compact::{compact_to_radians, length_to_compact, radians_to_compact};
use crate::finder::compat::check_dz;
use crate::geometry::PIXEL_BARREL_RADIUS_COMPACT;
use crate::types::{CompactBeamSpot, CompactHit, Doublet};
use crate::FinderConfig;

/// Find doublets by evaluating every pair.
///
/// Quadratic in the layer sizes; intended for validation on small inputs.
/// The layers do not need to be sorted.
pub fn find_doublets_brute(
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
    config: &FinderConfig,
) -> Vec<Doublet> {
    let window = radians_to_compact(config.half_window_rad);
    let z0_bound = length_to_compact(config.z0_tolerance_cm);

    let mut doublets = Vec::new();
    for (i, inner) in layer1.iter().enumerate() {
        let cos = compact_to_radians(bs.phi.wrapping_sub(inner.phi)).cos();
        let rb_proj = (bs.r as f32 * cos) as i32;
        let b_dz = (inner.z - bs.z) >> 8;

        for (j, outer) in layer2.iter().enumerate() {
            let dphi = outer.phi.wrapping_sub(inner.phi);
            if dphi < -window || dphi > window {
                continue;
            }
            if check_dz(*inner, *outer, rb_proj, b_dz, z0_bound) {
                doublets.push(Doublet {
                    inner: i as u16,
                    outer: j as u16,
                });
            }
        }
    }
    doublets
}

/// Collapse an emitted sequence into its candidate set.
pub fn candidate_set(doublets: &[Doublet]) -> FxHashSet<Doublet> {
    doublets.iter().copied().collect()
}

/// Compare two emitted sequences as candidate sets, ignoring duplicates and
/// order.
pub fn same_candidates(a: &[Doublet], b: &[Doublet]) -> bool {
    candidate_set(a) == candidate_set(b)
}

/// Signed angular difference `phi1 - phi2` in physical units, normalized to
/// `(-pi, pi]`.
pub fn delta_phi(phi1: f32, phi2: f32) -> f32 {
    let mut delta = phi1 - phi2;
    if delta > PI {
        delta -= 2.0 * PI;
    } else if delta <= -PI {
        delta += 2.0 * PI;
    }
    delta
}

/// Extrapolation fraction from the inner hit towards the beam line, scaled
/// by 2^12. `None` when the pair is radially degenerate (`dr == 0`), which
/// the division-free engine formulation handles without a guard.
pub fn extrapolated_xi(
    bs: &CompactBeamSpot,
    inner: &CompactHit,
    outer: &CompactHit,
) -> Option<i32> {
    let inner_r = PIXEL_BARREL_RADIUS_COMPACT[0] + i32::from(inner.dr);
    let outer_r = PIXEL_BARREL_RADIUS_COMPACT[1] + i32::from(outer.dr);
    let dr = outer_r - inner_r;
    if dr == 0 {
        return None;
    }

    let cos = compact_to_radians(bs.phi.wrapping_sub(inner.phi)).cos();
    let rb_proj = (bs.r as f32 * cos) as i32;

    let num = inner_r - rb_proj;
    Some(-(num << 12) / dr)
}

/// Longitudinal impact parameter of the pair relative to the beam spot, in
/// compact length units: the straight-line z at the beam-spot radius.
///
/// This is the division-based formulation of the quantity bounded by the
/// engines' compatibility test; the two agree to about 1.4 mm.
pub fn extrapolated_z0(
    bs: &CompactBeamSpot,
    inner: &CompactHit,
    outer: &CompactHit,
) -> Option<i32> {
    let xi = extrapolated_xi(bs, inner, outer)?;
    Some(inner.z + (((outer.z - inner.z) * xi) >> 12) - bs.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::compact_to_length;

    #[test]
    fn delta_phi_wraps_across_the_seam() {
        assert!((delta_phi(3.0, -3.0) - (6.0 - 2.0 * PI)).abs() < 1e-6);
        assert!((delta_phi(-3.0, 3.0) - (2.0 * PI - 6.0)).abs() < 1e-6);
        assert!((delta_phi(0.5, 0.2) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn z0_of_a_track_through_a_displaced_vertex() {
        // Hits on a straight line from (r=0, z=5cm): z = 5 + r.
        let bs = CompactBeamSpot::new(0, 0, 0);
        let inner = CompactHit { dr: 0, phi: 0, z: length_to_compact(8.0) };
        let outer = CompactHit { dr: 0, phi: 0, z: length_to_compact(11.8) };
        let z0 = extrapolated_z0(&bs, &inner, &outer).unwrap();
        assert!(
            (compact_to_length(z0) - 5.0).abs() < 0.2,
            "z0 = {} cm",
            compact_to_length(z0)
        );
    }

    #[test]
    fn radially_degenerate_pair_has_no_xi() {
        // Equal radii on both layers needs extreme dr offsets, but the
        // division form must still refuse the resulting dr = 0.
        let bs = CompactBeamSpot::new(0, 0, 0);
        let inner = CompactHit { dr: 29_491, phi: 0, z: 0 };
        let outer = CompactHit { dr: -32_768, phi: 0, z: 0 };
        assert_eq!(
            PIXEL_BARREL_RADIUS_COMPACT[0] + i32::from(inner.dr),
            PIXEL_BARREL_RADIUS_COMPACT[1] + i32::from(outer.dr)
        );
        assert_eq!(extrapolated_xi(&bs, &inner, &outer), None);
    }
}
