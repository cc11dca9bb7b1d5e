//! Fixed-point ("compact") encodings for angles and lengths.
//!
//! Angles are stored in 1/2^15 turns of pi: one unit is `pi / 2^15` rad
//! (about 1.9e-4 rad). The encoding deliberately wraps at +/-pi, so that an
//! ordinary wrapping 16-bit subtraction of two encoded angles yields the
//! signed shortest-path difference modulo 2*pi with no branching. Every angle
//! difference on encoded values must therefore go through [`i16::wrapping_sub`]
//! *before* any widening; widening first loses the shortest-path property.
//!
//! Lengths (radii, longitudinal positions, radial offsets) use a separate
//! scale of 2^14 units per cm: one unit is about 61 nm. The two scales must
//! not be conflated.

use std::f32::consts::PI;

/// Converts radians to the compact angle representation.
///
/// `+pi` maps to `-2^15`, which is the same angle modulo 2*pi; the truncation
/// through `i32` is what makes the encoding circular.
#[inline]
pub fn radians_to_compact(radians: f32) -> i16 {
    (radians * (1 << 15) as f32 / PI).round() as i32 as i16
}

/// Converts the compact angle representation to radians.
#[inline]
pub fn compact_to_radians(compact: i16) -> f32 {
    compact as f32 / (1 << 15) as f32 * PI
}

/// Converts a length in cm to the compact representation.
#[inline]
pub fn length_to_compact(cm: f32) -> i32 {
    (cm * (1 << 14) as f32).round() as i32
}

/// Converts the compact length representation to cm.
#[inline]
pub fn compact_to_length(compact: i32) -> f32 {
    compact as f32 / (1 << 14) as f32
}
