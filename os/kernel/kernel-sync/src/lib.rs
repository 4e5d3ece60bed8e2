//! # Kernel synchronization primitives
//!
//! [`SpinLock`] is a test-and-test-and-set spin lock with an RAII guard.
//! Every critical section in the allocator, the driver table and the logging
//! sink is short and never suspends, so the kernel only ever spins.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
