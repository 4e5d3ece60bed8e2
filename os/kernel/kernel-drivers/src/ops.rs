use crate::Status;
use kernel_info::limits::DRIVER_METRICS;

/// Opaque per-driver counters. Their meaning depends on the driver class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DriverMetrics(pub [u64; DRIVER_METRICS]);

impl DriverMetrics {
    pub const ZERO: Self = Self([0; DRIVER_METRICS]);
}

/// Hooks a driver exposes to the registry.
///
/// Every hook is optional. A hook returning `None` is treated as absent:
/// nothing is run and nothing is logged for it.
pub trait DriverOps: Sync {
    /// One-time device bring-up, run once on the boot unit.
    fn init(&self) -> Option<Status> {
        None
    }

    /// Per-execution-unit setup, run on every unit after global init.
    fn per_unit_init(&self, _unit: u32) -> Option<Status> {
        None
    }

    /// Counters for the device snapshot.
    fn metrics(&self) -> DriverMetrics {
        DriverMetrics::ZERO
    }
}
