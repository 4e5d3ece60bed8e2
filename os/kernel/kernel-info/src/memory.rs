//! # Physical Memory Layout

use kernel_memory_addresses::{PageSize, PhysicalAddress, PhysicalRange, Size4K};

/// Size of one allocator frame in bytes.
pub const FRAME_SIZE: u64 = Size4K::SIZE;

/// First byte of RAM as seen by the CPU.
pub const RAM_BASE: u64 = 0x8000_0000;

/// Amount of RAM the kernel is built to manage.
pub const RAM_SIZE: u64 = 128 * 1024 * 1024;

/// First address past the end of managed RAM.
pub const PHYS_TOP: u64 = RAM_BASE + RAM_SIZE;

/// Upper bound on the number of frames the frame table can track.
///
/// The kernel image itself occupies the start of RAM, so the range handed to
/// the allocator at boot is always smaller than this.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_FRAMES: usize = (RAM_SIZE / FRAME_SIZE) as usize;

/// A simple Higher Half Direct Map (HHDM) base.
/// Physical address `pa` is accessible at [`HHDM_BASE`] + `pa`.
pub const HHDM_BASE: u64 = 0xffff_8880_0000_0000;

/// Free-frame count at or below which the allocator logs a one-time "memory low" notice.
pub const MEM_LOW_WATERMARK_FRAMES: usize = 64;

/// Free-frame count at or below which the allocator logs a one-time "memory critical" warning.
pub const MEM_CRIT_WATERMARK_FRAMES: usize = 32;

/// Whether freshly acquired and released frames are filled with sentinel bytes.
pub const POISON_FRAMES_DEFAULT: bool = cfg!(debug_assertions);

/// The managed range when the kernel image ends at `kernel_end`.
#[must_use]
pub const fn managed_range(kernel_end: PhysicalAddress) -> PhysicalRange {
    PhysicalRange::new(kernel_end, PhysicalAddress::new(PHYS_TOP))
}

const _: () = {
    assert!(RAM_BASE.is_multiple_of(FRAME_SIZE));
    assert!(RAM_SIZE.is_multiple_of(FRAME_SIZE));
    assert!(MEM_CRIT_WATERMARK_FRAMES < MEM_LOW_WATERMARK_FRAMES);
    assert!(MEM_LOW_WATERMARK_FRAMES < MAX_FRAMES);
    assert!(MAX_FRAMES <= u32::MAX as usize);
};
