//! Accelerator queue abstraction.
//!
//! Context memory is shared with the device: software fills it, the
//! accelerator caches and updates it. All device-side context operations
//! (bulk write through the microcode, cache flush, forced reload) go through
//! [`ContextQueue`]. Staging buffers come from the queue too, since they
//! must be DMA-reachable; they are released when dropped.

use itls_proto::{ReadSa, SaWord0, WriteSa, constants::CTX_UNIT_128B};
use zeroize::{Zeroize, Zeroizing};

use crate::error::HwError;

/// How a cached context is flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Write the cached copy back to memory and keep it cached
    Writeback,
    /// Write back and drop the cached copy, forcing a re-fetch
    Invalidate,
}

/// DMA-reachable scratch memory
pub trait DmaBuffer {
    /// Buffer contents
    fn as_bytes(&self) -> &[u8];

    /// Mutable buffer contents
    fn as_bytes_mut(&mut self) -> &mut [u8];
}

/// Host-memory staging buffer, zeroed on allocation and wiped on drop
pub struct HeapBuffer(Zeroizing<Vec<u8>>);

impl HeapBuffer {
    /// Allocate `len` zeroed bytes, `None` if the allocator refuses
    #[must_use]
    pub fn try_zeroed(len: usize) -> Option<Self> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).ok()?;
        bytes.resize(len, 0);
        Some(Self(Zeroizing::new(bytes)))
    }
}

impl DmaBuffer for HeapBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// Live context memory owned by one session
///
/// Large enough for either image and aligned to the device's 128-byte
/// context unit. Wiped on drop.
#[repr(C, align(128))]
pub struct ContextRegion {
    bytes: [u8; ContextRegion::SIZE],
}

const _: () = assert!(ContextRegion::SIZE >= WriteSa::SIZE);
const _: () = assert!(align_of::<ContextRegion>() == CTX_UNIT_128B);

impl ContextRegion {
    /// Capacity in bytes (the larger of the two images)
    pub const SIZE: usize = ReadSa::SIZE;

    /// Zeroed region
    #[must_use]
    pub fn new() -> Box<Self> {
        Box::new(Self { bytes: [0; Self::SIZE] })
    }

    /// Address the accelerator uses to reach this context
    #[must_use]
    pub fn address(&self) -> u64 {
        self.bytes.as_ptr() as usize as u64
    }

    /// Region contents
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable region contents
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Current header word
    #[must_use]
    pub fn header(&self) -> SaWord0 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.bytes[..8]);
        SaWord0::from_u64(u64::from_le_bytes(word))
    }

    /// Write only the header word, leaving the rest of the region as is
    ///
    /// The device reads `ctx_size` and `ctx_push_size` from here before the
    /// bulk write lands.
    pub fn prime_header(&mut self, word: SaWord0) {
        self.bytes[..8].copy_from_slice(&word.to_u64().to_le_bytes());
    }

    /// Wipe the whole region
    pub fn clear(&mut self) {
        self.bytes.zeroize();
    }

    /// True if every byte is zero
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}

impl Drop for ContextRegion {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// One accelerator queue able to manage contexts.
///
/// Implementations use interior mutability; all operations are synchronous
/// round trips to the device.
pub trait ContextQueue {
    /// Staging memory handed out by [`ContextQueue::alloc_dma`]
    type Buffer: DmaBuffer;

    /// Identifier of this queue
    fn queue_id(&self) -> u16;

    /// Allocate `len` zeroed bytes of DMA-reachable memory.
    ///
    /// Returns `None` if memory is exhausted. The buffer is released when
    /// dropped.
    fn alloc_dma(&self, len: usize) -> Option<Self::Buffer>;

    /// Have the device copy the first `len` bytes of `staging` into
    /// `target`.
    ///
    /// # Errors
    ///
    /// `HwError` with the device status if the write was rejected.
    fn context_write(
        &self,
        staging: &Self::Buffer,
        target: &mut ContextRegion,
        len: usize,
    ) -> Result<(), HwError>;

    /// Flush the device's cached copy of `target`.
    ///
    /// # Errors
    ///
    /// `HwError` with the device status if the flush failed.
    fn context_flush(&self, target: &ContextRegion, mode: FlushMode) -> Result<(), HwError>;

    /// Force the device to re-read `target` from memory.
    ///
    /// # Errors
    ///
    /// `HwError` with the device status if the reload failed.
    fn context_reload(&self, target: &ContextRegion) -> Result<(), HwError>;
}
