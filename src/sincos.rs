//! Incremental sin/cos evaluation for sorted angular scans.
//!
//! Both steppers keep a running `(sin, cos)` pair and advance it by small
//! angular increments with a first-order rotation update:
//!
//! ```text
//! sin += cos * da
//! cos -= sin * da
//! ```
//!
//! which is only valid for small `da`. The caller is expected to drive the
//! stepper along a phi-sorted, densely-spaced sequence and to call
//! [`FastSinCos::sync`] periodically (the finders resync every
//! `FinderConfig::resync_period` steps) to bound the accumulated drift.

use crate::compact::compact_to_radians;

/// First-order rotation coefficient for the fixed-point stepper.
///
/// `da` arrives pre-shifted by 8, so one unit of `da` is `256 * pi / 2^15`
/// rad; `402 / 2^14` reproduces that scale in the `>> 14` update below.
const STEP_COEFF: i32 = 402;

/// Fixed-point incremental stepper over compact angles.
///
/// `sin` and `cos` are scaled by 2^8.
#[derive(Debug, Clone, Copy)]
pub struct FastSinCos {
    sin: i32,
    cos: i32,
    last: i16,
}

impl FastSinCos {
    /// Seed the stepper from a true trig evaluation of `start`.
    pub fn new(start: i16) -> Self {
        let rad = compact_to_radians(start);
        Self {
            sin: (rad.sin() * (1 << 8) as f32) as i32,
            cos: (rad.cos() * (1 << 8) as f32) as i32,
            last: start,
        }
    }

    /// Recompute `sin`/`cos` from a true trig evaluation of the current angle.
    pub fn sync(&mut self) {
        let rad = compact_to_radians(self.last);
        self.sin = (rad.sin() * (1 << 8) as f32) as i32;
        self.cos = (rad.cos() * (1 << 8) as f32) as i32;
    }

    /// Jump to `angle` and resync from true trig.
    pub fn sync_to(&mut self, angle: i16) {
        self.last = angle;
        self.sync();
    }

    /// Advance to `angle` with a first-order rotation update.
    ///
    /// The difference to the previous angle is taken with wrapping 16-bit
    /// arithmetic, so stepping across the +/-pi seam takes the short way.
    pub fn step(&mut self, angle: i16) {
        let da = i32::from(angle.wrapping_sub(self.last) >> 8);
        let tmp = STEP_COEFF * da;
        let (old_sin, old_cos) = (self.sin, self.cos);
        self.sin += (old_cos * tmp) >> 14;
        self.cos -= (old_sin * tmp) >> 14;
        self.last = angle;
    }

    /// The angle the stepper currently sits at, in compact units.
    #[inline]
    pub fn angle(&self) -> i16 {
        self.last
    }

    /// Current sine, scaled by 2^8.
    #[inline]
    pub fn sin(&self) -> i32 {
        self.sin
    }

    /// Current cosine, scaled by 2^8.
    #[inline]
    pub fn cos(&self) -> i32 {
        self.cos
    }

    /// Multiply `value` by the current sine, staying in the caller's scale.
    #[inline]
    pub fn sin_times(&self, value: i32) -> i32 {
        (self.sin * value) >> 8
    }

    /// Multiply `value` by the current cosine, staying in the caller's scale.
    #[inline]
    pub fn cos_times(&self, value: i32) -> i32 {
        (self.cos * value) >> 8
    }
}

/// Floating-point variant of [`FastSinCos`] for call sites that work in
/// physical units. Same stepping protocol, no fixed-point scaling.
#[derive(Debug, Clone, Copy)]
pub struct FastSinCosF32 {
    sin: f32,
    cos: f32,
    last: f32,
}

impl FastSinCosF32 {
    /// Seed the stepper from a true trig evaluation of `start` (rad).
    pub fn new(start: f32) -> Self {
        Self {
            sin: start.sin(),
            cos: start.cos(),
            last: start,
        }
    }

    /// Recompute `sin`/`cos` from a true trig evaluation of the current angle.
    pub fn sync(&mut self) {
        self.sin = self.last.sin();
        self.cos = self.last.cos();
    }

    /// Jump to `angle` (rad) and resync from true trig.
    pub fn sync_to(&mut self, angle: f32) {
        self.last = angle;
        self.sync();
    }

    /// Advance to `angle` (rad) with a first-order rotation update.
    pub fn step(&mut self, angle: f32) {
        let da = angle - self.last;
        let (old_sin, old_cos) = (self.sin, self.cos);
        self.sin += old_cos * da;
        self.cos -= old_sin * da;
        self.last = angle;
    }

    /// The angle the stepper currently sits at, in rad.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.last
    }

    /// Current sine.
    #[inline]
    pub fn sin(&self) -> f32 {
        self.sin
    }

    /// Current cosine.
    #[inline]
    pub fn cos(&self) -> f32 {
        self.cos
    }

    /// Multiply `value` by the current sine.
    #[inline]
    pub fn sin_times(&self, value: f32) -> f32 {
        self.sin * value
    }

    /// Multiply `value` by the current cosine.
    #[inline]
    pub fn cos_times(&self, value: f32) -> f32 {
        self.cos * value
    }
}
