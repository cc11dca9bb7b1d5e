//! Longitudinal compatibility test for candidate hit pairs.

use crate::geometry::PIXEL_BARREL_RADIUS_COMPACT;
use crate::types::CompactHit;

/// Checks that the z component of the impact parameter implied by the pair is
/// within the beam-spot tolerance.
///
/// `rb_proj` is the beam spot's radial coordinate projected onto the inner
/// hit's azimuthal direction (`bs.r * cos(bs.phi - inner.phi)`, compact length
/// units, unshifted); `b_dz` is `(inner.z - bs.z) >> 8`; `z0_bound` is the
/// tolerance in compact length units (unshifted).
///
/// The test is a linear extrapolation rearranged to avoid the division by
/// `dr`: with `xi = (inner_r - rb_proj) / dr` the accepted condition
/// `|inner_z + dz*xi - bs_z| < tol` becomes `|dr*b_dz - dz*num_xi| <
/// tol*|dr|` after multiplying through by `dr`. All four factors are
/// right-shifted by 8 first so the products stay within `i32`. The fixed-point
/// error on the extrapolated z0 is about 1.4 mm.
#[inline]
pub(crate) fn check_dz(
    inner: CompactHit,
    outer: CompactHit,
    rb_proj: i32,
    b_dz: i32,
    z0_bound: i32,
) -> bool {
    let inner_r = PIXEL_BARREL_RADIUS_COMPACT[0] + i32::from(inner.dr);
    let outer_r = PIXEL_BARREL_RADIUS_COMPACT[1] + i32::from(outer.dr);

    let num_xi = (inner_r - rb_proj) >> 8;
    let dz = (outer.z - inner.z) >> 8;
    let dr = (outer_r - inner_r) >> 8;

    let dz_times_dr = dr * b_dz - dz * num_xi;
    let bound = (z0_bound * dr.abs()) >> 8;

    dz_times_dr.abs() < bound
}
