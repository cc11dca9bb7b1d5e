//! Byte-exact layouts and offsets shared with the remote execution unit.
//!
//! Everything here is a wire contract: record sizes and offsets must be
//! preserved bit-for-bit to interoperate with an unmodified remote program.
//! The transport that moves these bytes (memory-mapped reads and writes) is
//! external; see [`crate::offload::OffloadLink`].

use bytemuck::{Pod, Zeroable};

use crate::types::CompactBeamSpot;

/// Upload record written to core-local memory before starting a search.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Metadata {
    /// Number of hits in the inner layer.
    pub layer1_count: i32,
    /// Number of hits in the outer layer.
    pub layer2_count: i32,
    /// Encoded beam spot.
    pub bs: CompactBeamSpot,
}

const _: () = assert!(std::mem::size_of::<Metadata>() == 20);

/// `DoubletStatus::code`: results are not valid.
pub const STATUS_INVALID: i32 = 0;
/// `DoubletStatus::code`: the remote unit is processing.
pub const STATUS_WORKING: i32 = 1;
/// `DoubletStatus::code`: results are ready to be read back.
pub const STATUS_READY: i32 = 2;

/// Completion record written by the remote unit to shared memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DoubletStatus {
    /// One of [`STATUS_INVALID`], [`STATUS_WORKING`], [`STATUS_READY`].
    pub code: i32,
    /// Number of doublet records available at [`shm_addr::DOUBLETS`].
    pub count: i32,
}

const _: () = assert!(std::mem::size_of::<DoubletStatus>() == 8);

/// Fixed offsets in the remote unit's core-local memory.
pub mod core_addr {
    /// Status word polled by the remote unit; the host writes a non-zero
    /// value here to signal that an upload is complete, so it doubles as the
    /// start flag.
    pub const STATUS: usize = 0x2000;
    /// [`super::Metadata`] record.
    pub const META: usize = 0x2004;
    /// Start flag slot following the metadata (unused by the host, which
    /// signals through [`STATUS`] instead).
    pub const START_FLAG: usize = 0x2018;
    /// Both hit arrays, laid out contiguously: `layer1_count` CompactHit
    /// records immediately followed by `layer2_count` more.
    pub const DATA: usize = 0x201C;
}

/// Fixed offsets in shared memory, written by the remote unit.
pub mod shm_addr {
    /// [`super::DoubletStatus`] completion record.
    pub const STATUS: usize = 0x00;
    /// `count` packed doublet records.
    pub const DOUBLETS: usize = 0x10;
}
