//! # Kernel Configuration
//!
//! This crate is the single source of truth for the compile-time configuration
//! shared by the kernel subsystems: how much physical memory exists, where the
//! allocator's pressure thresholds sit, and how large the fixed tables exported
//! to user space are.
//!
//! ## Modules
//!
//! ### Memory Layout ([`memory`])
//! * **Managed RAM**: [`RAM_BASE`](memory::RAM_BASE) up to
//!   [`PHYS_TOP`](memory::PHYS_TOP), tracked in
//!   [`FRAME_SIZE`](memory::FRAME_SIZE) frames.
//! * **Watermarks**: the low and critical free-frame thresholds used by the
//!   frame allocator's one-shot pressure alerts.
//! * **HHDM**: the direct-map base used to touch physical frames.
//!
//! ```text
//! Physical Memory Layout:
//! RAM_BASE    ┌─────────────────────────────────┐ 0x8000_0000
//!             │       Kernel Image              │
//!             │   (Text, Data, BSS)             │
//! kernel_end  ├─────────────────────────────────┤
//!             │    Managed Frames               │
//!             │  (frame allocator free list)    │
//! PHYS_TOP    └─────────────────────────────────┘ 0x8800_0000
//! ```
//!
//! ### Table Limits ([`limits`])
//! Capacities of the driver registry and the telemetry snapshots. These are
//! ABI-relevant: changing them changes the size of records copied to user
//! space.
//!
//! ## Configuration Management
//!
//! All values are `const` and checked with compile-time assertions, so an
//! inconsistent configuration (e.g. a critical watermark above the low one)
//! fails the build instead of misbehaving at runtime. Runtime configuration
//! structs elsewhere (such as the allocator config) default to these values.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod limits;
pub mod memory;
