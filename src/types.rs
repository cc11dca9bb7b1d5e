//! Core hit, beam-spot, and doublet types.
//!
//! The `Compact*` types and [`Doublet`] are wire types: they have a stable
//! `#[repr(C)]` layout, are `bytemuck::Pod`, and their sizes are load-bearing
//! for the offload protocol (see [`crate::offload::protocol`]).

use bytemuck::{Pod, Zeroable};

use crate::compact::{length_to_compact, radians_to_compact};
use crate::geometry::PIXEL_BARREL_RADIUS_CM;

/// A pixel-barrel hit in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Radial distance from the beam line, in cm.
    pub r: f32,
    /// Azimuthal angle in rad, in `(-pi, pi]`.
    pub phi: f32,
    /// Longitudinal position, in cm.
    pub z: f32,
}

/// The estimated origin region of trajectories for one event, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSpot {
    /// Radial distance from the detector axis, in cm.
    pub r: f32,
    /// Azimuthal angle in rad.
    pub phi: f32,
    /// Longitudinal position, in cm.
    pub z: f32,
}

/// A hit encoded for a known pixel-barrel layer.
///
/// The layer index itself is not stored; `dr` is the radial offset from that
/// layer's average radius, valid within +/-2 cm.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CompactHit {
    /// Radial offset from the layer's average radius, in length units
    /// (2 cm / 2^15 = 6.1 um per unit).
    pub dr: i16,
    /// Azimuthal angle in compact angle units (pi / 2^15 rad per unit),
    /// circular via two's-complement wraparound.
    pub phi: i16,
    /// Longitudinal position in length units.
    pub z: i32,
}

const _: () = assert!(std::mem::size_of::<CompactHit>() == 8);

impl CompactHit {
    /// Encode a physical hit for the given barrel layer.
    #[inline]
    pub fn from_hit(h: &Hit, layer: usize) -> Self {
        Self {
            dr: length_to_compact(h.r - PIXEL_BARREL_RADIUS_CM[layer]) as i16,
            phi: radians_to_compact(h.phi),
            z: length_to_compact(h.z),
        }
    }
}

/// The beam spot in compact units.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CompactBeamSpot {
    /// Radial distance in length units.
    pub r: i32,
    /// Longitudinal position in length units.
    pub z: i32,
    /// Azimuthal angle in compact angle units.
    pub phi: i16,
    /// Explicit padding to keep the 12-byte wire size free of implicit holes.
    pub _pad: [u8; 2],
}

const _: () = assert!(std::mem::size_of::<CompactBeamSpot>() == 12);

impl CompactBeamSpot {
    /// Build a compact beam spot from already-encoded components.
    #[inline]
    pub const fn new(r: i32, z: i32, phi: i16) -> Self {
        Self { r, z, phi, _pad: [0; 2] }
    }

    /// Encode a physical beam spot.
    #[inline]
    pub fn from_beam_spot(bs: &BeamSpot) -> Self {
        Self::new(
            length_to_compact(bs.r),
            length_to_compact(bs.z),
            radians_to_compact(bs.phi),
        )
    }
}

/// A candidate hit pair: indices into the two phi-sorted layer arrays.
///
/// Doublets are candidates, not a deduplicated set; callers that need
/// uniqueness sort and dedup (see [`crate::reference::candidate_set`]).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct Doublet {
    /// Index into the inner (first) layer.
    pub inner: u16,
    /// Index into the outer (second) layer.
    pub outer: u16,
}

const _: () = assert!(std::mem::size_of::<Doublet>() == 4);

/// Encode a slice of physical hits for the given barrel layer.
pub fn convert_hits(hits: &[Hit], layer: usize) -> Vec<CompactHit> {
    hits.iter().map(|h| CompactHit::from_hit(h, layer)).collect()
}

/// Sort a layer ascending by encoded phi.
///
/// The finders require both layers in this order; encoded order is the
/// wrapping two's-complement order, i.e. the scan starts near `-pi`.
pub fn sort_hits_by_phi(layer: &mut [CompactHit]) {
    layer.sort_unstable_by_key(|h| h.phi);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_encoding_uses_layer_reference_radius() {
        let h = Hit { r: 6.9, phi: 0.5, z: -3.0 };
        let c = CompactHit::from_hit(&h, 1);
        assert_eq!(c.dr, length_to_compact(0.1) as i16);
        assert_eq!(c.phi, radians_to_compact(0.5));
        assert_eq!(c.z, length_to_compact(-3.0));
    }

    #[test]
    fn sort_puts_phi_ascending_in_encoded_order() {
        let mut layer = vec![
            CompactHit { dr: 0, phi: 100, z: 0 },
            CompactHit { dr: 0, phi: -30_000, z: 0 },
            CompactHit { dr: 0, phi: 30_000, z: 0 },
        ];
        sort_hits_by_phi(&mut layer);
        let phis: Vec<i16> = layer.iter().map(|h| h.phi).collect();
        assert_eq!(phis, vec![-30_000, 100, 30_000]);
    }
}
