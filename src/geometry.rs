//! Pixel-barrel geometry: layer reference radii and hit classification.

use crate::types::Hit;

/// Average radii of the four pixel-barrel layers, in cm.
pub const PIXEL_BARREL_RADIUS_CM: [f32; 4] = [3.0, 6.8, 11.0, 16.0];

/// Average radii of the four pixel-barrel layers, in compact length units
/// (cm * 2^14). Checked against [`PIXEL_BARREL_RADIUS_CM`] in tests.
pub const PIXEL_BARREL_RADIUS_COMPACT: [i32; 4] = [49_152, 111_411, 180_224, 262_144];

/// Returns `true` if the hit lies in the pixel barrel.
#[inline]
pub fn hit_is_pixel_barrel(h: &Hit) -> bool {
    h.r < 20.0 && h.z.abs() < 28.0
}

/// Returns the pixel-barrel layer index (0-3) of a hit.
///
/// Only meaningful when [`hit_is_pixel_barrel`] holds.
#[inline]
pub fn hit_pixel_barrel_layer(h: &Hit) -> usize {
    (h.r * 0.2) as usize
}
