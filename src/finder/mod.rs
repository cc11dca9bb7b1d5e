//! Windowed doublet search over two phi-sorted layers.
//!
//! The scan itself is written once, against a [`DoubletSink`], and shared by
//! every finder variant: the in-process [`CpuFinder`] runs it with an
//! unbounded sink, [`crate::BoundedFinder`] with a capacity-limited sink that
//! suspends the scan, and the offload device program is the same scan on the
//! remote side of the protocol.
//!
//! The scan is three passes:
//!
//! 1. A main pass walking the inner layer in sorted order with two
//!    monotonically advancing cursors bounding the outer-layer window
//!    `[inner.phi - W, inner.phi + W]`. Window bounds here are deliberately
//!    computed in `i32` without wrapping; pairs whose window straddles the
//!    +/-pi seam are picked up by the correction passes instead.
//! 2. A low-end correction: inner hits whose lower bound wraps past -pi are
//!    checked against the tail of the outer layer, scanned in reverse.
//! 3. A high-end correction, symmetric to 2: inner hits walked in reverse,
//!    outer layer scanned from the start.
//!
//! The correction passes use a direct trig evaluation for the beam-spot
//! projection; the incremental stepper is only valid along the forward
//! sorted walk of the main pass.

pub(crate) mod compat;

use crate::compact::{compact_to_radians, length_to_compact, radians_to_compact};
use crate::error::FinderError;
use crate::sincos::FastSinCos;
use crate::types::{CompactBeamSpot, CompactHit, Doublet};
use crate::FinderConfig;

/// Lifecycle state shared by all finder variants.
///
/// Only [`crate::BoundedFinder`] ever reports `OutOfMemory`; the other
/// variants cycle between `Ready` and `Finished`. `Processing` is internal to
/// a running scan and is never observed across a call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderState {
    /// Idle; hits and beam spot may be uploaded, `find`/`start` accepted.
    Ready,
    /// The search engine is running.
    Processing,
    /// Output capacity was exhausted before the scan completed; drain to resume.
    OutOfMemory,
    /// The scan completed; results are available for draining.
    Finished,
}

impl std::fmt::Display for FinderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FinderState::Ready => "Ready",
            FinderState::Processing => "Processing",
            FinderState::OutOfMemory => "OutOfMemory",
            FinderState::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// Common surface of the finder variants.
///
/// The protocol is: `find` starts a search, then `get_doublets` is called
/// until the finder reports [`FinderState::Ready`] again. For the bounded
/// variant a drain from `OutOfMemory` synchronously resumes the scan, so the
/// drain loop doubles as the host handshake.
pub trait DoubletFinder {
    /// Current lifecycle state.
    fn state(&self) -> FinderState;

    /// Run (or start) a search over two phi-sorted layers.
    fn find(
        &mut self,
        bs: &CompactBeamSpot,
        layer1: &[CompactHit],
        layer2: &[CompactHit],
    ) -> Result<(), FinderError>;

    /// Drain produced doublets into `output`.
    ///
    /// Moves the internal buffer if `output` is empty, appends otherwise.
    /// Returns the number of doublets added.
    fn get_doublets(&mut self, output: &mut Vec<Doublet>) -> Result<usize, FinderError>;
}

/// Drive a finder through a complete find/drain cycle back to `Ready`.
///
/// Returns the total number of doublets appended to `output`.
pub fn run_to_completion<F: DoubletFinder>(
    finder: &mut F,
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
    output: &mut Vec<Doublet>,
) -> Result<usize, FinderError> {
    finder.find(bs, layer1, layer2)?;
    let mut total = 0;
    while finder.state() != FinderState::Ready {
        total += finder.get_doublets(output)?;
    }
    Ok(total)
}

/// Search parameters in compact units, derived from a [`FinderConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanParams {
    /// Angular half-window in compact angle units.
    pub window: i16,
    /// Longitudinal tolerance in compact length units.
    pub z0_bound: i32,
    /// Steps between full trig resyncs of the incremental stepper.
    pub resync_period: u32,
}

impl ScanParams {
    pub fn from_config(cfg: &FinderConfig) -> Self {
        Self {
            window: radians_to_compact(cfg.half_window_rad),
            z0_bound: length_to_compact(cfg.z0_tolerance_cm),
            resync_period: cfg.resync_period.max(1),
        }
    }
}

/// Receiver for emitted doublets. An emit may be refused, which suspends the
/// scan at a resumable position.
pub(crate) trait DoubletSink {
    fn emit(&mut self, doublet: Doublet) -> Result<(), SinkFull>;
}

/// Marker returned by a sink that is out of capacity.
pub(crate) struct SinkFull;

/// Unbounded sink over a `Vec`.
pub(crate) struct VecSink<'a>(pub &'a mut Vec<Doublet>);

impl DoubletSink for VecSink<'_> {
    #[inline]
    fn emit(&mut self, doublet: Doublet) -> Result<(), SinkFull> {
        self.0.push(doublet);
        Ok(())
    }
}

/// Sink with a hard element capacity, for fixed output storage.
pub(crate) struct BoundedSink<'a> {
    pub buffer: &'a mut Vec<Doublet>,
    pub capacity: usize,
}

impl DoubletSink for BoundedSink<'_> {
    #[inline]
    fn emit(&mut self, doublet: Doublet) -> Result<(), SinkFull> {
        if self.buffer.len() >= self.capacity {
            return Err(SinkFull);
        }
        self.buffer.push(doublet);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanPhase {
    Main,
    WrapLow,
    WrapHigh,
    Done,
}

/// Resumable scan position.
///
/// `inner` is the current inner-layer index of the active phase (descending
/// in `WrapHigh`). `outer` is `Some` while a window is being emitted and
/// names the next outer index to evaluate; `None` means the window for
/// `inner` has not been entered yet. `range_begin`/`range_end` are the main
/// pass's monotone cursors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanCursor {
    phase: ScanPhase,
    inner: usize,
    outer: Option<usize>,
    range_begin: usize,
    range_end: usize,
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self {
            phase: ScanPhase::Main,
            inner: 0,
            outer: None,
            range_begin: 0,
            range_end: 0,
        }
    }
}

impl ScanCursor {
    pub fn is_done(&self) -> bool {
        self.phase == ScanPhase::Done
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanStatus {
    /// All three passes completed.
    Finished,
    /// The sink refused an emit; `cursor` points at the refused pair.
    Suspended,
}

/// Beam-spot radial projection onto the inner hit's azimuthal direction,
/// via direct trig. Used where the incremental stepper is not valid.
#[inline]
fn rb_proj_direct(bs: &CompactBeamSpot, inner: &CompactHit) -> i32 {
    let cos = compact_to_radians(bs.phi.wrapping_sub(inner.phi)).cos();
    (bs.r as f32 * cos) as i32
}

/// Run the windowed scan from `cursor`, emitting into `sink`.
///
/// On [`ScanStatus::Suspended`] the cursor identifies the exact pair that was
/// refused; calling `scan` again with the same cursor continues there. The
/// main pass reseeds its trig stepper with an exact evaluation at the resume
/// point, so a pair straddling the acceptance boundary may be re-decided with
/// slightly better precision than the stepped value it would have seen.
pub(crate) fn scan(
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
    params: &ScanParams,
    cursor: &mut ScanCursor,
    sink: &mut impl DoubletSink,
) -> ScanStatus {
    if layer1.is_empty() || layer2.is_empty() {
        cursor.phase = ScanPhase::Done;
        return ScanStatus::Finished;
    }

    loop {
        let status = match cursor.phase {
            ScanPhase::Main => scan_main(bs, layer1, layer2, params, cursor, sink),
            ScanPhase::WrapLow => scan_wrap_low(bs, layer1, layer2, params, cursor, sink),
            ScanPhase::WrapHigh => scan_wrap_high(bs, layer1, layer2, params, cursor, sink),
            ScanPhase::Done => return ScanStatus::Finished,
        };
        if status == ScanStatus::Suspended {
            return status;
        }
    }
}

fn scan_main(
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
    params: &ScanParams,
    cursor: &mut ScanCursor,
    sink: &mut impl DoubletSink,
) -> ScanStatus {
    let window = i32::from(params.window);
    let mut sincos = FastSinCos::new(bs.phi.wrapping_sub(layer1[cursor.inner].phi));
    let mut iterations: u32 = 0;

    while cursor.inner < layer1.len() {
        let inner = layer1[cursor.inner];

        if cursor.outer.is_none() {
            sincos.step(bs.phi.wrapping_sub(inner.phi));
            if iterations % params.resync_period == 0 {
                sincos.sync_to(bs.phi.wrapping_sub(inner.phi));
            }
            iterations += 1;

            // Widened bounds on purpose: wrapping here would collapse the
            // window in the first iterations near -pi. The seam is handled
            // by the correction passes.
            let phi_low = i32::from(inner.phi) - window;
            let phi_high = i32::from(inner.phi) + window;

            while cursor.range_begin < layer2.len()
                && i32::from(layer2[cursor.range_begin].phi) < phi_low
            {
                cursor.range_begin += 1;
            }
            if cursor.range_end < cursor.range_begin {
                cursor.range_end = cursor.range_begin;
            }
            while cursor.range_end < layer2.len()
                && i32::from(layer2[cursor.range_end].phi) <= phi_high
            {
                cursor.range_end += 1;
            }

            cursor.outer = Some(cursor.range_begin);
        }

        let rb_proj = sincos.cos_times(bs.r);
        let b_dz = (inner.z - bs.z) >> 8;

        let mut outer_idx = cursor.outer.unwrap_or(cursor.range_begin);
        while outer_idx < cursor.range_end {
            if compat::check_dz(inner, layer2[outer_idx], rb_proj, b_dz, params.z0_bound) {
                let doublet = Doublet {
                    inner: cursor.inner as u16,
                    outer: outer_idx as u16,
                };
                if sink.emit(doublet).is_err() {
                    cursor.outer = Some(outer_idx);
                    return ScanStatus::Suspended;
                }
            }
            outer_idx += 1;
        }

        cursor.inner += 1;
        cursor.outer = None;
    }

    cursor.phase = ScanPhase::WrapLow;
    cursor.inner = 0;
    cursor.outer = None;
    ScanStatus::Finished
}

/// Recover pairs whose window straddles the seam at -pi.
///
/// Inner hits are walked in sorted order; the walk stops at the first hit
/// whose lower bound does not wrap, since no later hit can wrap either.
fn scan_wrap_low(
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
    params: &ScanParams,
    cursor: &mut ScanCursor,
    sink: &mut impl DoubletSink,
) -> ScanStatus {
    while cursor.inner < layer1.len() {
        let inner = layer1[cursor.inner];

        // Wrap detection must stay in i16: the bound wrapped iff subtracting
        // a positive width made the value larger.
        let phi_low = inner.phi.wrapping_sub(params.window);
        if phi_low <= inner.phi {
            break;
        }

        let rb_proj = rb_proj_direct(bs, &inner);
        let b_dz = (inner.z - bs.z) >> 8;

        let mut outer_idx = match cursor.outer {
            Some(idx) => idx,
            None => layer2.len() - 1,
        };
        loop {
            let outer = layer2[outer_idx];
            if outer.phi < phi_low {
                break;
            }
            if compat::check_dz(inner, outer, rb_proj, b_dz, params.z0_bound) {
                let doublet = Doublet {
                    inner: cursor.inner as u16,
                    outer: outer_idx as u16,
                };
                if sink.emit(doublet).is_err() {
                    cursor.outer = Some(outer_idx);
                    return ScanStatus::Suspended;
                }
            }
            if outer_idx == 0 {
                break;
            }
            outer_idx -= 1;
        }

        cursor.inner += 1;
        cursor.outer = None;
    }

    cursor.phase = ScanPhase::WrapHigh;
    cursor.inner = layer1.len() - 1;
    cursor.outer = None;
    ScanStatus::Finished
}

/// Recover pairs whose window straddles the seam at +pi.
///
/// Symmetric to [`scan_wrap_low`]: inner hits walked in reverse, outer layer
/// scanned from the start.
fn scan_wrap_high(
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
    params: &ScanParams,
    cursor: &mut ScanCursor,
    sink: &mut impl DoubletSink,
) -> ScanStatus {
    loop {
        let inner = layer1[cursor.inner];

        let phi_high = inner.phi.wrapping_add(params.window);
        if phi_high >= inner.phi {
            break;
        }

        let rb_proj = rb_proj_direct(bs, &inner);
        let b_dz = (inner.z - bs.z) >> 8;

        let mut outer_idx = cursor.outer.unwrap_or(0);
        while outer_idx < layer2.len() {
            let outer = layer2[outer_idx];
            if outer.phi > phi_high {
                break;
            }
            if compat::check_dz(inner, outer, rb_proj, b_dz, params.z0_bound) {
                let doublet = Doublet {
                    inner: cursor.inner as u16,
                    outer: outer_idx as u16,
                };
                if sink.emit(doublet).is_err() {
                    cursor.outer = Some(outer_idx);
                    return ScanStatus::Suspended;
                }
            }
            outer_idx += 1;
        }

        cursor.outer = None;
        match cursor.inner.checked_sub(1) {
            Some(prev) => cursor.inner = prev,
            None => break,
        }
    }

    cursor.phase = ScanPhase::Done;
    ScanStatus::Finished
}

/// Move-or-append drain shared by the finder variants.
pub(crate) fn drain_into(source: &mut Vec<Doublet>, output: &mut Vec<Doublet>) -> usize {
    if output.is_empty() {
        std::mem::swap(source, output);
        output.len()
    } else {
        let count = source.len();
        output.append(source);
        count
    }
}

/// In-process finder: runs the full scan in one call.
///
/// `find` is accepted in any state and discards undrained results; the
/// state reported afterwards is always `Finished`.
#[derive(Debug)]
pub struct CpuFinder {
    state: FinderState,
    doublets: Vec<Doublet>,
    config: FinderConfig,
}

impl CpuFinder {
    /// Create a finder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FinderConfig::default())
    }

    /// Create a finder with an explicit configuration.
    pub fn with_config(config: FinderConfig) -> Self {
        Self {
            state: FinderState::Ready,
            doublets: Vec::new(),
            config,
        }
    }
}

impl Default for CpuFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubletFinder for CpuFinder {
    fn state(&self) -> FinderState {
        self.state
    }

    fn find(
        &mut self,
        bs: &CompactBeamSpot,
        layer1: &[CompactHit],
        layer2: &[CompactHit],
    ) -> Result<(), FinderError> {
        let params = ScanParams::from_config(&self.config);

        self.doublets.clear();
        // Typical occupancy yields about one doublet per 64 pairs; purely a
        // reallocation hint.
        self.doublets.reserve(layer1.len() * layer2.len() / 64);

        let mut cursor = ScanCursor::default();
        let mut sink = VecSink(&mut self.doublets);
        let status = scan(bs, layer1, layer2, &params, &mut cursor, &mut sink);
        debug_assert_eq!(status, ScanStatus::Finished);

        self.state = FinderState::Finished;
        Ok(())
    }

    fn get_doublets(&mut self, output: &mut Vec<Doublet>) -> Result<usize, FinderError> {
        match self.state() {
            FinderState::Finished => {
                let count = drain_into(&mut self.doublets, output);
                self.state = FinderState::Ready;
                Ok(count)
            }
            state => Err(FinderError::InvalidState {
                operation: "get_doublets",
                state,
            }),
        }
    }
}
