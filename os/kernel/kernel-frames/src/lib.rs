//! # Physical Frame Allocator
//!
//! Hands out 4 KiB physical frames from a single managed range and tracks a
//! 16-bit reference count per frame so copy-on-write mappings can share them.
//!
//! ```text
//!  managed range: [base ................................. end)
//!                  │ frame 0 │ frame 1 │ frame 2 │ ... │ frame n-1 │
//!
//!  FrameTable   counts: [ 1 ][ 0 ][ 3 ] ... [ 0 ]      0 = free
//!  FreeList     head ─► 1 ─► n-1 ─► ... ─► NIL        LIFO, O(1)
//! ```
//!
//! ## Behavior
//!
//! * [`FrameAllocator::initialize`] runs once at boot and seeds the free list
//!   with every whole frame of the range.
//! * [`FrameAllocator::acquire`] pops a frame with count `1`; it fails with
//!   [`FrameError::Exhausted`] rather than blocking.
//! * [`FrameAllocator::add_ref`] and [`FrameAllocator::release`] move the count
//!   up and down. The release that drops the last reference frees the frame.
//! * Misaligned, out-of-range and double releases are fatal: the allocator's
//!   bookkeeping can no longer be trusted.
//!
//! ## Memory pressure
//!
//! Crossing the [`Watermarks`] logs a one-shot notice (low) or warning
//! (critical); running out logs a single error for the lifetime of the
//! allocator. See [`watermark`] for the re-arm rules.
//!
//! ## Poisoning
//!
//! With poisoning on, frames are filled with [`ACQUIRE_FILL`] when handed out
//! and with [`RELEASE_FILL`] when returned. Access to frame memory goes
//! through [`FramePoison`] so the allocator itself never dereferences a
//! physical address.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod allocator;
mod frame_table;
mod free_list;
mod poison;
pub mod watermark;

pub use allocator::{FrameAllocator, FrameAllocatorConfig, FrameError, FrameStats, InitError};
pub use poison::{ACQUIRE_FILL, FramePoison, HhdmPoison, NoPoison, RELEASE_FILL};
pub use watermark::{AlertCounters, PressureEvent, Watermarks};
