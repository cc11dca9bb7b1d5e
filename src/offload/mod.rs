//! Host driver for a remote doublet-finding execution unit.
//!
//! The remote side runs the same windowed scan; this module only moves bytes
//! across the protocol boundary defined in [`protocol`] and polls for
//! completion. The actual transport primitives (device bring-up, program
//! loading, memory-mapped access) are external and injected through
//! [`OffloadLink`].

pub mod protocol;

use bytemuck::Zeroable;

use crate::error::FinderError;
use crate::finder::{drain_into, DoubletFinder, FinderState};
use crate::types::{CompactBeamSpot, CompactHit, Doublet};

use protocol::{core_addr, shm_addr, DoubletStatus, Metadata, STATUS_INVALID, STATUS_READY};

/// Transport to the remote unit: core-local memory is write-only from the
/// host, shared memory is read/write.
///
/// Implementations wrap the platform's memory-mapped I/O; writes and reads
/// are plain byte moves with no failure channel, matching the underlying
/// primitives.
pub trait OffloadLink {
    /// Write bytes into the remote unit's core-local memory.
    fn write_core(&mut self, offset: usize, bytes: &[u8]);

    /// Write bytes into shared memory.
    fn write_shared(&mut self, offset: usize, bytes: &[u8]);

    /// Read bytes from shared memory.
    fn read_shared(&mut self, offset: usize, out: &mut [u8]);
}

/// Finder that offloads the scan to a remote unit over an [`OffloadLink`].
///
/// `find` uploads, signals start, then busy-polls the shared status record
/// until the remote side reports ready; there is no timeout or cancellation
/// path, so a caller needing bounded wait time must wrap the call externally.
#[derive(Debug)]
pub struct OffloadFinder<L: OffloadLink> {
    link: L,
    state: FinderState,
    doublets: Vec<Doublet>,
}

impl<L: OffloadLink> OffloadFinder<L> {
    /// Wrap a transport.
    pub fn new(link: L) -> Self {
        Self {
            link,
            state: FinderState::Ready,
            doublets: Vec::new(),
        }
    }

    /// Access the underlying transport.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Tear down, returning the transport.
    pub fn into_link(self) -> L {
        self.link
    }

    fn upload(&mut self, bs: &CompactBeamSpot, layer1: &[CompactHit], layer2: &[CompactHit]) {
        let meta = Metadata {
            layer1_count: layer1.len() as i32,
            layer2_count: layer2.len() as i32,
            bs: *bs,
        };
        self.link.write_core(core_addr::META, bytemuck::bytes_of(&meta));
        self.link
            .write_core(core_addr::DATA, bytemuck::cast_slice(layer1));
        let layer2_offset = core_addr::DATA + std::mem::size_of_val(layer1);
        self.link
            .write_core(layer2_offset, bytemuck::cast_slice(layer2));

        // The status word doubles as the start flag.
        let start: i32 = 1;
        self.link
            .write_core(core_addr::STATUS, bytemuck::bytes_of(&start));
    }
}

impl<L: OffloadLink> DoubletFinder for OffloadFinder<L> {
    fn state(&self) -> FinderState {
        self.state
    }

    fn find(
        &mut self,
        bs: &CompactBeamSpot,
        layer1: &[CompactHit],
        layer2: &[CompactHit],
    ) -> Result<(), FinderError> {
        self.doublets.clear();
        if layer1.is_empty() || layer2.is_empty() {
            self.state = FinderState::Finished;
            return Ok(());
        }

        // Invalidate stale results before the remote side can overwrite them.
        let invalid = DoubletStatus {
            code: STATUS_INVALID,
            count: 0,
        };
        self.link
            .write_shared(shm_addr::STATUS, bytemuck::bytes_of(&invalid));

        self.upload(bs, layer1, layer2);

        let mut status = DoubletStatus::zeroed();
        loop {
            self.link
                .read_shared(shm_addr::STATUS, bytemuck::bytes_of_mut(&mut status));
            if status.code == STATUS_READY {
                break;
            }
        }

        self.doublets
            .resize(status.count as usize, Doublet::zeroed());
        self.link.read_shared(
            shm_addr::DOUBLETS,
            bytemuck::cast_slice_mut(&mut self.doublets),
        );

        self.state = FinderState::Finished;
        Ok(())
    }

    fn get_doublets(&mut self, output: &mut Vec<Doublet>) -> Result<usize, FinderError> {
        match self.state {
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
