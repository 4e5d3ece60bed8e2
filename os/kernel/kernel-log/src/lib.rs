//! # Kernel Logging Sink
//!
//! A [`log::Log`] implementation shared by every kernel subsystem. Each record
//! becomes exactly one console line carrying the execution unit that produced
//! it, the tick at which it was produced and its level:
//!
//! ```text
//! [h0 t1042 INFO] kmem ready: total=32256 free=32256 pages
//! [h2 t1187 WARN] kmem critically low: free=32 pages
//! ```
//!
//! ## Guarantees
//!
//! * **Serialized**: concurrent producers never interleave within a line; the
//!   sink sits behind its own [`SpinLock`](kernel_sync::SpinLock), independent
//!   of any lock the producer may hold. A producer therefore waits for at most
//!   one lock acquisition.
//! * **Filtered before formatting**: records below the configured
//!   [`LogLevel`] are rejected in [`Log::enabled`](log::Log::enabled) and by
//!   the facade's global max level, so their arguments are never formatted.
//! * **Runtime level control**: [`KernelLogger::set_level`] swaps the level and
//!   returns the previous one, backing the `klogctl` system call.
//!
//! ## Components
//!
//! * [`KernelLogger`]: the logger, generic over a [`LogSink`] (where bytes go)
//!   and a [`LogContext`] (who is logging and when).
//! * [`LogLevel`]: the kernel's level set with its stable ABI codes.
//! * [`qemu::QemuDebugSink`]: writes to QEMU's `-debugcon` port (feature
//!   `qemu`, x86-64 only).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kernel_log::{KernelLogger, LogLevel, install};
//!
//! static LOGGER: KernelLogger<QemuDebugSink, Harts> =
//!     KernelLogger::new(QemuDebugSink, Harts, LogLevel::Info);
//!
//! install(&LOGGER).expect("logger already installed");
//! log::info!("memory: pressure={}%", frames.pressure_percent());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod level;
mod logger;
#[cfg(all(feature = "qemu", target_arch = "x86_64"))]
pub mod qemu;

pub use level::{LogLevel, LogLevelError};
pub use logger::{KernelLogger, LogContext, LogSink, install};
