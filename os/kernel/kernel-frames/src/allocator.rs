use crate::frame_table::FrameTable;
use crate::free_list::FreeList;
use crate::poison::{ACQUIRE_FILL, FramePoison, RELEASE_FILL};
use crate::watermark::{AlertCounters, AllocatorFlags, PressureEvent, Watermarks};
use core::sync::atomic::{AtomicBool, Ordering};
use kernel_info::memory::{MAX_FRAMES, POISON_FRAMES_DEFAULT};
use kernel_memory_addresses::{PageSize, PhysicalAddress, PhysicalPage, PhysicalRange, Size4K};
use kernel_sync::SpinLock;

/// Tunables for a [`FrameAllocator`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameAllocatorConfig {
    pub watermarks: Watermarks,
    /// Fill frames with sentinel bytes on acquire and release.
    pub poison_frames: bool,
}

impl FrameAllocatorConfig {
    pub const DEFAULT: Self = Self {
        watermarks: Watermarks::DEFAULT,
        poison_frames: POISON_FRAMES_DEFAULT,
    };
}

impl Default for FrameAllocatorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Frame totals at one point in time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames handed to the allocator at initialization.
    pub total: usize,
    /// Frames currently on the free list.
    pub free: usize,
}

impl FrameStats {
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.total - self.free
    }

    /// Share of frames in use, rounded down. `0` for an empty allocator.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn pressure_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        // At most 100.
        (self.in_use() * 100 / self.total) as u8
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("frame allocator is already initialized")]
    AlreadyInitialized,
    #[error("range holds {frames} frames but the frame table tracks at most {capacity}")]
    CapacityExceeded { frames: u64, capacity: usize },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("no free frames")]
    Exhausted,
    #[error("{0} is outside the managed range")]
    OutOfRange(PhysicalAddress),
    #[error("frame {0} is not allocated")]
    NotAllocated(PhysicalPage<Size4K>),
    #[error("reference count of frame {0} would overflow")]
    RefCountOverflow(PhysicalPage<Size4K>),
}

struct State<const N: usize> {
    /// First managed frame.
    base: u64,
    /// First address past the last managed frame.
    end: u64,
    table: FrameTable<N>,
    free: FreeList<N>,
    total: usize,
    flags: AllocatorFlags,
    alerts: AlertCounters,
}

impl<const N: usize> State<N> {
    const fn new() -> Self {
        Self {
            base: 0,
            end: 0,
            table: FrameTable::new(),
            free: FreeList::new(),
            total: 0,
            flags: AllocatorFlags::new(),
            alerts: AlertCounters {
                low: 0,
                critical: 0,
                exhausted: 0,
            },
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn index_of(&self, addr: PhysicalAddress) -> Option<u32> {
        let addr = addr.as_u64();
        if addr < self.base || addr >= self.end {
            return None;
        }
        // Bounded by N, which fits in u32.
        Some(((addr - self.base) >> Size4K::SHIFT) as u32)
    }

    fn frame_at(&self, index: u32) -> PhysicalPage<Size4K> {
        PhysicalPage::containing(PhysicalAddress::new(
            self.base + (u64::from(index) << Size4K::SHIFT),
        ))
    }

    const fn stats(&self) -> FrameStats {
        FrameStats {
            total: self.total,
            free: self.free.len(),
        }
    }
}

/// Reference-counted allocator for 4 KiB physical frames.
///
/// `N` is the capacity of the frame table. All state sits behind a single
/// [`SpinLock`]; every operation is one short critical section and log
/// records are emitted only after the lock has been released.
///
/// A frame's count is `1` after [`acquire`](Self::acquire), grows with
/// [`add_ref`](Self::add_ref) when a copy-on-write mapping shares it, and the
/// frame goes back to the free list on the [`release`](Self::release) that
/// drops the last reference.
pub struct FrameAllocator<P, const N: usize = MAX_FRAMES> {
    state: SpinLock<State<N>>,
    watermarks: Watermarks,
    poisoning: AtomicBool,
    poison: P,
}

impl<P: FramePoison, const N: usize> FrameAllocator<P, N> {
    const CAPACITY_FITS_INDEX: () = assert!(N < u32::MAX as usize);

    #[must_use]
    pub const fn new(config: FrameAllocatorConfig, poison: P) -> Self {
        let () = Self::CAPACITY_FITS_INDEX;
        Self {
            state: SpinLock::new(State::new()),
            watermarks: config.watermarks,
            poisoning: AtomicBool::new(config.poison_frames),
            poison,
        }
    }

    /// Hand every whole frame in `range` to the allocator.
    ///
    /// The start is rounded up to the frame size and only frames that end at
    /// or before `range.end()` are used. Double-free detection switches on
    /// once all frames are on the free list.
    ///
    /// # Errors
    /// * [`InitError::AlreadyInitialized`] on every call after the first.
    /// * [`InitError::CapacityExceeded`] when the range holds more than `N` frames.
    #[allow(clippy::cast_possible_truncation)]
    pub fn initialize(&self, range: PhysicalRange) -> Result<FrameStats, InitError> {
        let frames = range.frame_count::<Size4K>();
        let poisoning = self.poisoning();

        let mut state = self.state.lock();
        if state.flags.initialized() {
            return Err(InitError::AlreadyInitialized);
        }
        if frames > N as u64 {
            return Err(InitError::CapacityExceeded {
                frames,
                capacity: N,
            });
        }

        state.base = range.start().align_up::<Size4K>().as_u64();
        state.end = state.base + (frames << Size4K::SHIFT);
        state.flags.set_initialized(true);

        for (index, frame) in range.frames::<Size4K>().enumerate() {
            state.total += 1;
            self.free_frame(&mut state, index as u32, frame, poisoning);
        }
        state.flags.set_ready(true);
        let stats = state.stats();
        drop(state);

        log::info!("kmem ready: total={} free={} pages", stats.total, stats.free);
        Ok(stats)
    }

    /// Take one frame off the free list. Never blocks.
    ///
    /// # Errors
    /// [`FrameError::Exhausted`] when no frame is free. The first exhaustion
    /// is logged; later ones are silent.
    pub fn acquire(&self) -> Result<PhysicalPage<Size4K>, FrameError> {
        let mut state = self.state.lock();
        let Some(index) = state.free.pop() else {
            let event = if state.flags.oom_warned() {
                None
            } else {
                state.flags.set_oom_warned(true);
                let event = PressureEvent::Exhausted {
                    free: state.free.len(),
                };
                state.alerts.record(event);
                Some(event)
            };
            drop(state);
            if let Some(event) = event {
                event.emit();
            }
            return Err(FrameError::Exhausted);
        };

        state.table.set(index, 1);
        let frame = state.frame_at(index);
        let event = self.watermarks.on_acquire(state.free.len(), &mut state.flags);
        if let Some(event) = event {
            state.alerts.record(event);
        }
        drop(state);

        if self.poisoning() {
            self.poison.fill(frame, ACQUIRE_FILL);
        }
        if let Some(event) = event {
            event.emit();
        }
        Ok(frame)
    }

    /// Drop one reference to `frame`; the last one puts it back on the free list.
    ///
    /// # Panics
    /// If `frame` is not frame aligned, lies outside the managed range, or is
    /// already free. Each of these means the caller's bookkeeping is corrupt.
    pub fn release(&self, frame: impl Into<PhysicalAddress>) {
        let addr = frame.into();
        let Some(page) = PhysicalPage::<Size4K>::from_aligned(addr) else {
            panic!("kfree: misaligned frame {addr}");
        };
        let poisoning = self.poisoning();

        let mut state = self.state.lock();
        let Some(index) = state.index_of(addr) else {
            drop(state);
            panic!("kfree: frame {page} outside the managed range");
        };
        match state.table.get(index) {
            0 if state.flags.ready() => {
                drop(state);
                panic!("kfree: double free of frame {page}");
            }
            count @ 2.. => state.table.set(index, count - 1),
            _ => self.free_frame(&mut state, index, page, poisoning),
        }
    }

    /// Last-reference path shared by seeding and [`release`](Self::release).
    fn free_frame(
        &self,
        state: &mut State<N>,
        index: u32,
        frame: PhysicalPage<Size4K>,
        poisoning: bool,
    ) {
        if poisoning {
            self.poison.fill(frame, RELEASE_FILL);
        }
        state.table.set(index, 0);
        state.free.push(index);
        self.watermarks.on_release(state.free.len(), &mut state.flags);
    }

    /// Add a reference to the allocated frame containing `addr`.
    ///
    /// Returns the new count.
    ///
    /// # Errors
    /// * [`FrameError::OutOfRange`] if `addr` is not managed.
    /// * [`FrameError::NotAllocated`] if the frame is free.
    /// * [`FrameError::RefCountOverflow`] if the count is saturated.
    pub fn add_ref(&self, addr: PhysicalAddress) -> Result<u16, FrameError> {
        let mut state = self.state.lock();
        let index = state.index_of(addr).ok_or(FrameError::OutOfRange(addr))?;
        let frame = state.frame_at(index);
        let count = match state.table.get(index) {
            0 => return Err(FrameError::NotAllocated(frame)),
            n => n.checked_add(1).ok_or(FrameError::RefCountOverflow(frame))?,
        };
        state.table.set(index, count);
        Ok(count)
    }

    /// References held on the frame containing `addr`; `0` if free or unmanaged.
    #[must_use]
    pub fn ref_count(&self, addr: PhysicalAddress) -> u16 {
        let state = self.state.lock();
        state.index_of(addr).map_or(0, |index| state.table.get(index))
    }

    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.state.lock().stats()
    }

    /// Share of managed frames in use, `0..=100`.
    #[must_use]
    pub fn pressure_percent(&self) -> u8 {
        self.stats().pressure_percent()
    }

    /// Alerts fired since boot.
    #[must_use]
    pub fn alerts(&self) -> AlertCounters {
        self.state.lock().alerts
    }

    /// Number of frames with at least one reference.
    ///
    /// Walks the whole table; meant for diagnostics, not hot paths.
    #[must_use]
    pub fn referenced_frames(&self) -> usize {
        let state = self.state.lock();
        state.table.referenced(state.total)
    }

    /// The frames under management, once initialized.
    #[must_use]
    pub fn managed_range(&self) -> Option<PhysicalRange> {
        let state = self.state.lock();
        state.flags.initialized().then(|| {
            PhysicalRange::new(PhysicalAddress::new(state.base), PhysicalAddress::new(state.end))
        })
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.lock().flags.ready()
    }

    #[inline]
    #[must_use]
    pub fn poisoning(&self) -> bool {
        self.poisoning.load(Ordering::Relaxed)
    }

    /// Switch sentinel fills on or off; returns the previous setting.
    pub fn set_poisoning(&self, enabled: bool) -> bool {
        self.poisoning.swap(enabled, Ordering::Relaxed)
    }

    #[must_use]
    pub const fn poison(&self) -> &P {
        &self.poison
    }
}
