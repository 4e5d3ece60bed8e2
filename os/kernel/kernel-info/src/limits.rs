//! # Fixed Table Capacities
//!
//! These sizes are part of the kernel/user ABI: the telemetry records embed
//! arrays of exactly these lengths.

/// Maximum number of execution units (harts/cores).
pub const MAX_UNITS: usize = 8;

/// Maximum number of processes.
pub const MAX_PROCESSES: usize = 64;

/// Capacity of the driver registry.
pub const MAX_DRIVERS: usize = 8;

/// Bytes reserved for a driver name in the device snapshot, including the NUL terminator.
pub const DRIVER_NAME_LEN: usize = 16;

/// Opaque per-driver counters exported in the device snapshot.
pub const DRIVER_METRICS: usize = 3;

/// Maximum number of process records in one scheduler snapshot.
pub const MAX_PROC_SNAPSHOT: usize = 32;

/// Bytes reserved for a process name in the scheduler snapshot, including the NUL terminator.
pub const PROC_NAME_LEN: usize = 16;

const _: () = {
    assert!(MAX_PROC_SNAPSHOT <= MAX_PROCESSES);
    assert!(DRIVER_NAME_LEN.is_multiple_of(8));
    assert!(PROC_NAME_LEN.is_multiple_of(8));
};
