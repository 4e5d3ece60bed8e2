//! Drivers compiled into the kernel and their telemetry counters.

use crate::{DriverClass, DriverEntry, DriverMetrics, DriverOps, Status};
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Interrupt controller with a global and a per-unit bring-up step.
pub struct InterruptControllerDriver {
    init: fn(),
    init_unit: fn(u32),
}

impl InterruptControllerDriver {
    #[must_use]
    pub const fn new(init: fn(), init_unit: fn(u32)) -> Self {
        Self { init, init_unit }
    }
}

impl DriverOps for InterruptControllerDriver {
    fn init(&self) -> Option<Status> {
        (self.init)();
        Some(Status::OK)
    }

    fn per_unit_init(&self, unit: u32) -> Option<Status> {
        (self.init_unit)(unit);
        Some(Status::OK)
    }
}

impl fmt::Debug for InterruptControllerDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptControllerDriver").finish_non_exhaustive()
    }
}

/// Request counters kept by a block device driver.
///
/// Exported as `[submitted, completed, max_in_flight]`.
#[derive(Debug, Default)]
pub struct BlockMetrics {
    submitted: AtomicU64,
    completed: AtomicU64,
    max_in_flight: AtomicU64,
}

impl BlockMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            max_in_flight: AtomicU64::new(0),
        }
    }

    /// A request was handed to the device.
    pub fn record_submit(&self) {
        let submitted = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        let completed = self.completed.load(Ordering::Relaxed);
        self.max_in_flight
            .fetch_max(submitted.saturating_sub(completed), Ordering::Relaxed);
    }

    /// The device finished a request.
    pub fn record_complete(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> DriverMetrics {
        DriverMetrics([
            self.submitted.load(Ordering::Relaxed),
            self.completed.load(Ordering::Relaxed),
            self.max_in_flight.load(Ordering::Relaxed),
        ])
    }
}

/// Block device driver.
#[derive(Debug)]
pub struct BlockDriver {
    init: fn() -> Status,
    metrics: BlockMetrics,
}

impl BlockDriver {
    #[must_use]
    pub const fn new(init: fn() -> Status) -> Self {
        Self {
            init,
            metrics: BlockMetrics::new(),
        }
    }

    /// Counters for the I/O path to update.
    #[must_use]
    pub const fn counters(&self) -> &BlockMetrics {
        &self.metrics
    }
}

impl DriverOps for BlockDriver {
    fn init(&self) -> Option<Status> {
        Some((self.init)())
    }

    fn metrics(&self) -> DriverMetrics {
        self.metrics.snapshot()
    }
}

/// Byte counters and flow-control state of a serial port.
///
/// Exported as `[tx_bytes, rx_bytes, flow_paused]`.
#[derive(Debug, Default)]
pub struct SerialMetrics {
    tx_bytes: AtomicU64,
    rx_bytes: AtomicU64,
    flow_paused: AtomicBool,
}

impl SerialMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tx_bytes: AtomicU64::new(0),
            rx_bytes: AtomicU64::new(0),
            flow_paused: AtomicBool::new(false),
        }
    }

    pub fn record_tx(&self, bytes: u64) {
        self.tx_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_rx(&self, bytes: u64) {
        self.rx_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Transmission is held back because the peer is not ready.
    pub fn set_flow_paused(&self, paused: bool) {
        self.flow_paused.store(paused, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> DriverMetrics {
        DriverMetrics([
            self.tx_bytes.load(Ordering::Relaxed),
            self.rx_bytes.load(Ordering::Relaxed),
            u64::from(self.flow_paused.load(Ordering::Relaxed)),
        ])
    }
}

/// Serial port (UART) driver.
#[derive(Debug)]
pub struct SerialDriver {
    init: fn() -> Status,
    metrics: SerialMetrics,
}

impl SerialDriver {
    #[must_use]
    pub const fn new(init: fn() -> Status) -> Self {
        Self {
            init,
            metrics: SerialMetrics::new(),
        }
    }

    #[must_use]
    pub const fn counters(&self) -> &SerialMetrics {
        &self.metrics
    }
}

impl DriverOps for SerialDriver {
    fn init(&self) -> Option<Status> {
        Some((self.init)())
    }

    fn metrics(&self) -> DriverMetrics {
        self.metrics.snapshot()
    }
}

/// The platform's built-in set: the PLIC interrupt controller and the virtio block device.
#[must_use]
pub const fn builtin_set(
    plic: &'static InterruptControllerDriver,
    disk: &'static BlockDriver,
) -> [DriverEntry; 2] {
    [
        DriverEntry {
            name: "plic",
            class: DriverClass::InterruptController,
            ops: plic,
        },
        DriverEntry {
            name: "virtio-blk",
            class: DriverClass::Block,
            ops: disk,
        },
    ]
}
