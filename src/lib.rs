//! Doublet finding between the two innermost pixel-barrel layers.
//!
//! Given a beam spot and two phi-sorted hit arrays, this crate finds, for
//! every inner-layer hit, the outer-layer hits geometrically compatible with
//! a near-straight trajectory through the beam spot: within a fixed angular
//! window and a longitudinal-impact-parameter tolerance. The windowed scan
//! runs in time proportional to its output rather than to the number of
//! pairs.
//!
//! All geometry is carried in a fixed-point ("compact") encoding whose
//! deliberate 16-bit wraparound makes angle differences across the +/-pi
//! seam branch-free; see [`compact`].
//!
//! Three finder variants share one scan: [`CpuFinder`] runs in-process,
//! [`BoundedFinder`] streams results through a fixed output budget behind an
//! explicit state machine, and [`OffloadFinder`] drives the same search on a
//! remote execution unit across the byte-exact [`offload::protocol`].
//!
//! # Example
//!
//! ```
//! use pixel_doublets::{find_doublets, BeamSpot, Hit};
//!
//! let bs = BeamSpot { r: 0.0, phi: 0.0, z: 0.0 };
//! let layer1 = vec![Hit { r: 3.0, phi: 0.0, z: 0.0 }];
//! let layer2 = vec![Hit { r: 6.8, phi: 0.01, z: 0.0 }];
//!
//! let output = find_doublets(&bs, &layer1, &layer2).expect("finding should succeed");
//! assert_eq!(output.doublets.len(), 1);
//! assert_eq!((output.doublets[0].inner, output.doublets[0].outer), (0, 0));
//! ```

pub mod compact;
pub mod geometry;
pub mod offload;
pub mod reference;

mod bounded;
mod error;
mod finder;
mod sincos;
mod types;

pub use bounded::{BoundedFinder, MAX_HITS_PER_LAYER, OUTPUT_CAPACITY};
pub use error::FinderError;
pub use finder::{run_to_completion, CpuFinder, DoubletFinder, FinderState};
pub use offload::{OffloadFinder, OffloadLink};
pub use sincos::{FastSinCos, FastSinCosF32};
pub use types::{
    convert_hits, sort_hits_by_phi, BeamSpot, CompactBeamSpot, CompactHit, Doublet, Hit,
};

use std::time::{Duration, Instant};

/// Tunable parameters of the search.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Angular half-window: an outer hit is a candidate for an inner hit when
    /// their phi difference is within this many radians.
    pub half_window_rad: f32,
    /// Accept a pair when its extrapolated beam-line crossing lies within
    /// this many cm of the beam spot in z. The fixed-point evaluation carries
    /// about 1.4 mm of error against an exact extrapolation.
    pub z0_tolerance_cm: f32,
    /// Steps between full trig resyncs of the incremental stepper during the
    /// main scan pass. Lower is more accurate, higher is cheaper.
    pub resync_period: u32,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            half_window_rad: 0.04,
            z0_tolerance_cm: 11.0,
            resync_period: 64,
        }
    }
}

/// Stopwatch breakdown of one [`find_doublets`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindTiming {
    /// Encoding hits and beam spot into the compact representation.
    pub formatting: Duration,
    /// Sorting both layers by phi.
    pub sorting: Duration,
    /// Running the windowed scan.
    pub finding: Duration,
    /// End-to-end wall time.
    pub total: Duration,
}

/// Output of [`find_doublets`]: the candidate pairs plus the encoded, sorted
/// layers their indices refer to.
#[derive(Debug, Clone)]
pub struct FindOutput {
    /// Candidate pairs, indices into `layer1`/`layer2`.
    pub doublets: Vec<Doublet>,
    /// The inner layer after encoding and phi-sorting.
    pub layer1: Vec<CompactHit>,
    /// The outer layer after encoding and phi-sorting.
    pub layer2: Vec<CompactHit>,
    /// Per-phase timings.
    pub timing: FindTiming,
}

/// Encode, sort, and scan one event with default settings.
pub fn find_doublets(
    bs: &BeamSpot,
    layer1_hits: &[Hit],
    layer2_hits: &[Hit],
) -> Result<FindOutput, FinderError> {
    find_doublets_with_config(bs, layer1_hits, layer2_hits, &FinderConfig::default())
}

/// Encode, sort, and scan one event with explicit configuration.
pub fn find_doublets_with_config(
    bs: &BeamSpot,
    layer1_hits: &[Hit],
    layer2_hits: &[Hit],
    config: &FinderConfig,
) -> Result<FindOutput, FinderError> {
    let start = Instant::now();

    let compact_bs = CompactBeamSpot::from_beam_spot(bs);
    let mut layer1 = convert_hits(layer1_hits, 0);
    let mut layer2 = convert_hits(layer2_hits, 1);
    let formatting = start.elapsed();

    let sorting_start = Instant::now();
    sort_hits_by_phi(&mut layer1);
    sort_hits_by_phi(&mut layer2);
    let sorting = sorting_start.elapsed();

    let finding_start = Instant::now();
    let mut finder = CpuFinder::with_config(config.clone());
    let mut doublets = Vec::new();
    run_to_completion(&mut finder, &compact_bs, &layer1, &layer2, &mut doublets)?;
    let finding = finding_start.elapsed();

    Ok(FindOutput {
        doublets,
        layer1,
        layer2,
        timing: FindTiming {
            formatting,
            sorting,
            finding,
            total: start.elapsed(),
        },
    })
}
