//! Memory-pressure watermarks and one-shot alerting.
//!
//! Alerts are edge triggered with hysteresis: an alert fires on the
//! [`acquire`](crate::FrameAllocator::acquire) that takes the free count down
//! to its threshold and is re-armed only by a
//! [`release`](crate::FrameAllocator::release) that brings the free count back
//! above it. Rising free counts never fire an alert and falling ones never
//! re-arm one. The exhaustion alert is never re-armed.

use bitfield_struct::bitfield;
use kernel_info::memory::{MEM_CRIT_WATERMARK_FRAMES, MEM_LOW_WATERMARK_FRAMES};

/// Sticky allocator flags, packed in a single byte.
#[bitfield(u8)]
pub(crate) struct AllocatorFlags {
    /// The "memory low" alert has fired and is not yet re-armed.
    pub low_warned: bool,
    /// The "memory critical" alert has fired and is not yet re-armed.
    pub crit_warned: bool,
    /// The exhaustion alert has fired. Never cleared.
    pub oom_warned: bool,
    /// Seeding finished; double frees are now fatal.
    pub ready: bool,
    /// A managed range has been installed.
    pub initialized: bool,
    #[bits(3)]
    __: u8,
}

/// Free-frame thresholds for pressure alerts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Watermarks {
    /// At or below this many free frames the allocator reports low memory.
    pub low: usize,
    /// At or below this many free frames the allocator reports critical memory.
    pub critical: usize,
}

impl Watermarks {
    pub const DEFAULT: Self = Self {
        low: MEM_LOW_WATERMARK_FRAMES,
        critical: MEM_CRIT_WATERMARK_FRAMES,
    };

    /// Custom thresholds.
    ///
    /// # Panics
    /// If `critical` is not strictly below `low`.
    #[must_use]
    pub const fn new(low: usize, critical: usize) -> Self {
        assert!(critical < low, "critical watermark must be below the low watermark");
        Self { low, critical }
    }

    /// Evaluate the alerts after an acquire left `free` frames.
    ///
    /// The critical alert takes precedence; a single acquire fires at most one alert.
    pub(crate) fn on_acquire(
        self,
        free: usize,
        flags: &mut AllocatorFlags,
    ) -> Option<PressureEvent> {
        if free <= self.critical && !flags.crit_warned() {
            flags.set_crit_warned(true);
            Some(PressureEvent::Critical { free })
        } else if free <= self.low && !flags.low_warned() {
            flags.set_low_warned(true);
            Some(PressureEvent::Low { free })
        } else {
            None
        }
    }

    /// Re-arm every alert whose threshold `free` now strictly exceeds.
    pub(crate) fn on_release(self, free: usize, flags: &mut AllocatorFlags) {
        if free > self.low {
            flags.set_low_warned(false);
        }
        if free > self.critical {
            flags.set_crit_warned(false);
        }
    }
}

impl Default for Watermarks {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An alert raised by the allocator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PressureEvent {
    /// Free frames dropped to the low watermark.
    Low { free: usize },
    /// Free frames dropped to the critical watermark.
    Critical { free: usize },
    /// An acquire found no free frame.
    Exhausted { free: usize },
}

impl PressureEvent {
    /// The facade level the event is reported at.
    #[must_use]
    pub const fn level(self) -> log::Level {
        match self {
            Self::Low { .. } => log::Level::Info,
            Self::Critical { .. } => log::Level::Warn,
            Self::Exhausted { .. } => log::Level::Error,
        }
    }

    pub(crate) fn emit(self) {
        match self {
            Self::Low { free } => log::info!("kmem low: free={free} pages"),
            Self::Critical { free } => log::warn!("kmem critically low: free={free} pages"),
            Self::Exhausted { free } => log::error!("kmem exhausted: free={free} pages"),
        }
    }
}

/// Number of alerts fired since boot, by kind.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AlertCounters {
    pub low: u64,
    pub critical: u64,
    pub exhausted: u64,
}

impl AlertCounters {
    pub(crate) const fn record(&mut self, event: PressureEvent) {
        match event {
            PressureEvent::Low { .. } => self.low += 1,
            PressureEvent::Critical { .. } => self.critical += 1,
            PressureEvent::Exhausted { .. } => self.exhausted += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_wins_over_low() {
        let marks = Watermarks::new(64, 32);
        let mut flags = AllocatorFlags::new();
        assert_eq!(
            marks.on_acquire(20, &mut flags),
            Some(PressureEvent::Critical { free: 20 })
        );
        assert!(flags.crit_warned());
        assert!(!flags.low_warned());

        // The low alert is still armed and fires on the next acquire.
        assert_eq!(
            marks.on_acquire(19, &mut flags),
            Some(PressureEvent::Low { free: 19 })
        );
        assert_eq!(marks.on_acquire(18, &mut flags), None);
    }

    #[test]
    fn release_rearms_only_above_threshold() {
        let marks = Watermarks::new(64, 32);
        let mut flags = AllocatorFlags::new()
            .with_low_warned(true)
            .with_crit_warned(true);

        marks.on_release(32, &mut flags);
        assert!(flags.crit_warned());
        marks.on_release(33, &mut flags);
        assert!(!flags.crit_warned());
        assert!(flags.low_warned());
        marks.on_release(65, &mut flags);
        assert!(!flags.low_warned());
    }

    #[test]
    fn flags_fit_in_a_byte() {
        let flags = AllocatorFlags::new().with_ready(true).with_initialized(true);
        assert_eq!(flags.into_bits(), 0b1_1000);
    }

    #[test]
    #[should_panic(expected = "critical watermark must be below")]
    fn inverted_watermarks_are_rejected() {
        let _ = Watermarks::new(16, 16);
    }
}
