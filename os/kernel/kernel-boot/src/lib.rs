//! # Boot Sequencing
//!
//! The boot unit brings up memory and the driver table, then publishes a
//! "started" flag. Every other unit spins on that flag before doing its own
//! per-unit driver setup, so no secondary ever observes a half-built kernel.
//!
//! ```text
//!  unit 0                              unit 1..n
//!  ──────                              ─────────
//!  banner                              spin until started
//!  memory: initialize(range)                 │
//!  drivers: register builtins                │
//!  drivers: global init                      │
//!  drivers: per-unit init (0)                │
//!  started = true  ───── Release/Acquire ───►│
//!                                      drivers: per-unit init (n)
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

use core::sync::atomic::{AtomicBool, Ordering};
use kernel_drivers::{DriverEntry, DriverRegistry};
use kernel_frames::{FrameAllocator, FramePoison, FrameStats};
use kernel_info::limits::MAX_UNITS;
use kernel_info::memory::{MAX_FRAMES, managed_range};
use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};

/// Version string announced in the boot banner.
pub const KERNEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the boot unit brought up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub frames: FrameStats,
    pub builtins_registered: bool,
    /// Drivers whose global init hook ran.
    pub drivers_initialized: usize,
}

/// Boot-time wiring of the kernel's shared subsystems.
pub struct Kernel<'a, P, const N: usize = MAX_FRAMES> {
    frames: &'a FrameAllocator<P, N>,
    drivers: &'a DriverRegistry,
    builtins: &'a [DriverEntry],
    started: AtomicBool,
}

impl<'a, P: FramePoison, const N: usize> Kernel<'a, P, N> {
    #[must_use]
    pub const fn new(
        frames: &'a FrameAllocator<P, N>,
        drivers: &'a DriverRegistry,
        builtins: &'a [DriverEntry],
    ) -> Self {
        Self {
            frames,
            drivers,
            builtins,
            started: AtomicBool::new(false),
        }
    }

    /// Bring the kernel up on the boot unit and release the secondaries.
    ///
    /// `boot_cycle` is the cycle counter at entry; it only shows up in the banner.
    ///
    /// # Panics
    /// If the frame allocator cannot take `ram`. Nothing else can run
    /// without physical memory.
    pub fn primary_init(&self, ram: PhysicalRange, boot_cycle: u64) -> BootReport {
        log::info!(
            "bootstrap sequence engaged version={KERNEL_VERSION} boot_cycle={boot_cycle:#x}"
        );

        log::info!("memory: kinit");
        let frames = match self.frames.initialize(ram) {
            Ok(stats) => stats,
            Err(e) => panic!("kinit: {e}"),
        };
        log::info!("memory: pressure={}%", self.frames.pressure_percent());

        log::info!("drivers: registering builtins");
        let builtins_registered = self.drivers.register_builtins(self.builtins);
        let drivers_initialized = self.drivers.global_init();
        self.drivers.per_unit_init(0);

        self.started.store(true, Ordering::Release);
        log::info!("primary unit is live");

        BootReport {
            frames,
            builtins_registered,
            drivers_initialized,
        }
    }

    /// [`primary_init`](Self::primary_init) over all RAM above the kernel image.
    ///
    /// # Panics
    /// See [`primary_init`](Self::primary_init).
    pub fn primary_init_after_image(
        &self,
        kernel_end: PhysicalAddress,
        boot_cycle: u64,
    ) -> BootReport {
        self.primary_init(managed_range(kernel_end), boot_cycle)
    }

    /// Wait for the boot unit, then do the setup private to `unit`.
    ///
    /// # Panics
    /// If `unit` is not below [`MAX_UNITS`].
    pub fn secondary_init(&self, unit: u32) {
        assert!((unit as usize) < MAX_UNITS, "unit {unit} exceeds MAX_UNITS");
        while !self.started.load(Ordering::Acquire) {
            core::hint::spin_loop();
        }

        log::info!("unit {unit} starting");
        self.drivers.per_unit_init(unit);
        log::info!("unit {unit} entered scheduler");
    }

    /// Whether the boot unit has finished [`primary_init`](Self::primary_init).
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    #[must_use]
    pub const fn frames(&self) -> &'a FrameAllocator<P, N> {
        self.frames
    }

    #[must_use]
    pub const fn drivers(&self) -> &'a DriverRegistry {
        self.drivers
    }
}
