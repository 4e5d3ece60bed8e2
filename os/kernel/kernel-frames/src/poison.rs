//! Sentinel fills for frame memory.
//!
//! A freshly acquired frame is filled with [`ACQUIRE_FILL`] and a released
//! frame with [`RELEASE_FILL`], so reads of uninitialized or dangling memory
//! show up as recognizable byte patterns instead of stale data.

use kernel_info::memory::{FRAME_SIZE, HHDM_BASE};
use kernel_memory_addresses::{PhysicalPage, Size4K};

/// Byte written over a frame handed out by `acquire`.
pub const ACQUIRE_FILL: u8 = 0x05;

/// Byte written over a frame returned to the free list.
pub const RELEASE_FILL: u8 = 0x01;

/// Write access to the contents of a physical frame.
pub trait FramePoison {
    /// Overwrite every byte of `frame` with `byte`.
    fn fill(&self, frame: PhysicalPage<Size4K>, byte: u8);
}

impl<T: FramePoison + ?Sized> FramePoison for &T {
    #[inline]
    fn fill(&self, frame: PhysicalPage<Size4K>, byte: u8) {
        (**self).fill(frame, byte);
    }
}

/// Leaves frame memory untouched.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoPoison;

impl FramePoison for NoPoison {
    #[inline]
    fn fill(&self, _frame: PhysicalPage<Size4K>, _byte: u8) {}
}

/// Fills frames through the higher-half direct map.
#[derive(Debug, Copy, Clone)]
pub struct HhdmPoison {
    base: u64,
}

impl HhdmPoison {
    /// Poison through the kernel's direct map at [`HHDM_BASE`].
    ///
    /// # Safety
    /// Every managed frame must be mapped writable at `HHDM_BASE + pa`, and
    /// nothing but the allocator may use a frame while it is free.
    #[must_use]
    pub const unsafe fn new() -> Self {
        unsafe { Self::with_base(HHDM_BASE) }
    }

    /// Poison through a direct map starting at `base`.
    ///
    /// # Safety
    /// See [`HhdmPoison::new`].
    #[must_use]
    pub const unsafe fn with_base(base: u64) -> Self {
        Self { base }
    }
}

impl FramePoison for HhdmPoison {
    #[allow(clippy::cast_possible_truncation)]
    fn fill(&self, frame: PhysicalPage<Size4K>, byte: u8) {
        let va = (self.base + frame.base().as_u64()) as *mut u8;
        // SAFETY: the constructor's contract guarantees the mapping.
        unsafe { core::ptr::write_bytes(va, byte, FRAME_SIZE as usize) }
    }
}
