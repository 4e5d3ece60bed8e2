//! # Driver Registry
//!
//! A fixed table of platform drivers with a two-phase startup:
//!
//! 1. [`DriverRegistry::global_init`] runs once on the boot unit and brings
//!    each device up.
//! 2. [`DriverRegistry::per_unit_init`] runs on every execution unit, the boot
//!    unit included, for state that is private to a unit (interrupt routing,
//!    for example).
//!
//! [`DriverRegistry::snapshot`] copies the table out together with each
//! driver's counters for the telemetry path.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod builtin;
mod class;
mod ops;
mod registry;

pub use builtin::{
    BlockDriver, BlockMetrics, InterruptControllerDriver, SerialDriver, SerialMetrics, builtin_set,
};
pub use class::{DriverClass, Status};
pub use ops::{DriverMetrics, DriverOps};
pub use registry::{DriverEntry, DriverRegistry, DriverSnapshot, RegistrySnapshot};
