#![allow(dead_code)]

use pixel_doublets::offload::protocol::{
    core_addr, shm_addr, DoubletStatus, Metadata, STATUS_READY,
};
use pixel_doublets::offload::OffloadLink;
use pixel_doublets::{run_to_completion, CompactHit, CpuFinder, Doublet};

/// In-memory transport that emulates the remote unit synchronously.
///
/// Writing a non-zero start flag to the core status word runs the search
/// immediately, so the host's poll loop observes a ready status on its first
/// read. Backing stores are plain byte vectors, so record reads go through
/// `pod_read_unaligned` rather than casts.
pub struct LoopbackLink {
    core: Vec<u8>,
    shared: Vec<u8>,
}

impl LoopbackLink {
    pub fn new() -> Self {
        Self {
            core: vec![0; 32 * 1024],
            shared: vec![0; 64 * 1024],
        }
    }

    fn read_core<T: bytemuck::Pod>(&self, offset: usize) -> T {
        bytemuck::pod_read_unaligned(&self.core[offset..offset + std::mem::size_of::<T>()])
    }

    fn read_core_slice<T: bytemuck::Pod>(&self, offset: usize, count: usize) -> Vec<T> {
        (0..count)
            .map(|i| self.read_core(offset + i * std::mem::size_of::<T>()))
            .collect()
    }

    /// Emulate the remote program: parse the upload, run the scan, publish
    /// results and the ready status.
    fn run_device(&mut self) {
        let meta: Metadata = self.read_core(core_addr::META);
        let layer1: Vec<CompactHit> =
            self.read_core_slice(core_addr::DATA, meta.layer1_count as usize);
        let layer2_offset =
            core_addr::DATA + meta.layer1_count as usize * std::mem::size_of::<CompactHit>();
        let layer2: Vec<CompactHit> = self.read_core_slice(layer2_offset, meta.layer2_count as usize);

        let mut finder = CpuFinder::new();
        let mut doublets: Vec<Doublet> = Vec::new();
        run_to_completion(&mut finder, &meta.bs, &layer1, &layer2, &mut doublets)
            .expect("device scan failed");

        let bytes: &[u8] = bytemuck::cast_slice(&doublets);
        self.shared[shm_addr::DOUBLETS..shm_addr::DOUBLETS + bytes.len()].copy_from_slice(bytes);
        let status = DoubletStatus {
            code: STATUS_READY,
            count: doublets.len() as i32,
        };
        self.shared[shm_addr::STATUS..shm_addr::STATUS + 8]
            .copy_from_slice(bytemuck::bytes_of(&status));
    }
}

impl OffloadLink for LoopbackLink {
    fn write_core(&mut self, offset: usize, bytes: &[u8]) {
        self.core[offset..offset + bytes.len()].copy_from_slice(bytes);
        if offset == core_addr::STATUS {
            let flag: i32 = bytemuck::pod_read_unaligned(&self.core[offset..offset + 4]);
            if flag != 0 {
                self.run_device();
            }
        }
    }

    fn write_shared(&mut self, offset: usize, bytes: &[u8]) {
        self.shared[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn read_shared(&mut self, offset: usize, out: &mut [u8]) {
        let len = out.len();
        out.copy_from_slice(&self.shared[offset..offset + len]);
    }
}
