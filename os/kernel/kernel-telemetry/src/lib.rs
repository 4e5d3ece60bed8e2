//! # Telemetry Export
//!
//! Fixed-size snapshots of kernel state for user space: memory totals and
//! pressure, the driver table, and per-process scheduler counters. The
//! records in [`abi`] are plain old data and are copied out whole with
//! [`export`]; there are no partial or streamed reads.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod abi;
mod exporter;
mod sources;

pub use abi::{DevInfo, DriverRecord, ProcRecord, ProcState, SchedInfo, SysInfo, VmStat};
pub use exporter::{Telemetry, TelemetryError, dev_info, export, sys_info, vm_stat};
pub use sources::{CopyFault, ProcessView, TelemetrySources, UserCopy};
