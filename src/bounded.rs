//! Bounded producer/consumer finder with a fixed output budget.
//!
//! [`BoundedFinder`] is shaped like a resource-constrained execution unit:
//! hits are uploaded into finder-owned storage (they must outlive several
//! calls, so borrowing is not an option), the scan runs against a fixed-size
//! output buffer, and the host drains results through an explicit state
//! machine:
//!
//! ```text
//! Ready --start--> Processing --+--> Finished    --get_doublets--> Ready
//!                               +--> OutOfMemory --get_doublets--> Processing --> ...
//! ```
//!
//! A drain from `OutOfMemory` synchronously resumes the scan from the exact
//! pair that overflowed (the scan cursor is persisted across the cycle), so
//! no hit pair is ever reprocessed or lost across a drain.

use crate::error::FinderError;
use crate::finder::{
    drain_into, scan, BoundedSink, DoubletFinder, FinderState, ScanCursor, ScanParams, ScanStatus,
};
use crate::types::{CompactBeamSpot, CompactHit, Doublet};
use crate::FinderConfig;

/// Maximum number of hits accepted per layer upload.
pub const MAX_HITS_PER_LAYER: usize = 2048;

/// Fixed capacity of the output buffer, in doublets.
pub const OUTPUT_CAPACITY: usize = 1536;

/// Doublet finder with finder-owned hit storage and a hard output budget.
#[derive(Debug)]
pub struct BoundedFinder {
    state: FinderState,
    bs: CompactBeamSpot,
    layer1: Vec<CompactHit>,
    layer2: Vec<CompactHit>,
    cursor: ScanCursor,
    buffer: Vec<Doublet>,
    params: ScanParams,
}

impl BoundedFinder {
    /// Create a finder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FinderConfig::default())
    }

    /// Create a finder with an explicit configuration.
    pub fn with_config(config: FinderConfig) -> Self {
        Self {
            state: FinderState::Ready,
            bs: CompactBeamSpot::new(0, 0, 0),
            layer1: Vec::new(),
            layer2: Vec::new(),
            cursor: ScanCursor::default(),
            buffer: Vec::with_capacity(OUTPUT_CAPACITY),
            params: ScanParams::from_config(&config),
        }
    }

    /// Current state of the machine.
    #[inline]
    pub fn state(&self) -> FinderState {
        self.state
    }

    /// Upload both layers into finder-owned storage.
    ///
    /// Only valid in `Ready`. Layers must already be sorted ascending by
    /// encoded phi; each may hold at most [`MAX_HITS_PER_LAYER`] hits.
    pub fn set_hits(
        &mut self,
        layer1: Vec<CompactHit>,
        layer2: Vec<CompactHit>,
    ) -> Result<(), FinderError> {
        self.expect_ready("set_hits")?;
        for layer in [&layer1, &layer2] {
            if layer.len() > MAX_HITS_PER_LAYER {
                return Err(FinderError::LayerTooLarge {
                    len: layer.len(),
                    max: MAX_HITS_PER_LAYER,
                });
            }
        }
        self.layer1 = layer1;
        self.layer2 = layer2;
        Ok(())
    }

    /// Upload the beam spot. Only valid in `Ready`.
    pub fn set_beam_spot(&mut self, bs: CompactBeamSpot) -> Result<(), FinderError> {
        self.expect_ready("set_beam_spot")?;
        self.bs = bs;
        Ok(())
    }

    /// Start scanning the uploaded layers. Only valid in `Ready`.
    ///
    /// Runs until the scan completes (`Finished`) or the output buffer fills
    /// (`OutOfMemory`); returns the resulting state.
    pub fn start(&mut self) -> Result<FinderState, FinderError> {
        self.expect_ready("start")?;
        self.cursor = ScanCursor::default();
        self.buffer.clear();
        Ok(self.process())
    }

    /// Drain produced doublets into `output`.
    ///
    /// Only valid in `OutOfMemory` or `Finished`. Moves the buffer if
    /// `output` is empty, appends otherwise, and returns the number of
    /// doublets added. From `OutOfMemory` the scan resumes synchronously
    /// after the drain; from `Finished` the machine re-arms to `Ready`.
    pub fn get_doublets(&mut self, output: &mut Vec<Doublet>) -> Result<usize, FinderError> {
        match self.state {
            FinderState::OutOfMemory => {
                let count = drain_into(&mut self.buffer, output);
                self.reclaim_buffer();
                self.process();
                Ok(count)
            }
            FinderState::Finished => {
                let count = drain_into(&mut self.buffer, output);
                self.reclaim_buffer();
                self.state = FinderState::Ready;
                Ok(count)
            }
            state => Err(FinderError::InvalidState {
                operation: "get_doublets",
                state,
            }),
        }
    }

    fn expect_ready(&self, operation: &'static str) -> Result<(), FinderError> {
        if self.state == FinderState::Ready {
            Ok(())
        } else {
            Err(FinderError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// A drain may have moved the buffer out; keep the fixed budget allocated.
    fn reclaim_buffer(&mut self) {
        if self.buffer.capacity() < OUTPUT_CAPACITY {
            self.buffer = Vec::with_capacity(OUTPUT_CAPACITY);
        }
        self.buffer.clear();
    }

    /// Run the scan from the persisted cursor until done or out of capacity.
    fn process(&mut self) -> FinderState {
        self.state = FinderState::Processing;
        let mut sink = BoundedSink {
            buffer: &mut self.buffer,
            capacity: OUTPUT_CAPACITY,
        };
        let status = scan(
            &self.bs,
            &self.layer1,
            &self.layer2,
            &self.params,
            &mut self.cursor,
            &mut sink,
        );
        self.state = match status {
            ScanStatus::Finished => FinderState::Finished,
            ScanStatus::Suspended => FinderState::OutOfMemory,
        };
        self.state
    }
}

impl Default for BoundedFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubletFinder for BoundedFinder {
    fn state(&self) -> FinderState {
        self.state
    }

    /// Upload and start in one call; the host then drains with
    /// [`BoundedFinder::get_doublets`] until the machine reports `Ready`.
    fn find(
        &mut self,
        bs: &CompactBeamSpot,
        layer1: &[CompactHit],
        layer2: &[CompactHit],
    ) -> Result<(), FinderError> {
        self.set_beam_spot(*bs)?;
        self.set_hits(layer1.to_vec(), layer2.to_vec())?;
        self.start()?;
        Ok(())
    }

    fn get_doublets(&mut self, output: &mut Vec<Doublet>) -> Result<usize, FinderError> {
        BoundedFinder::get_doublets(self, output)
    }
}
