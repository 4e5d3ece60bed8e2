//! # Telemetry System Calls
//!
//! Decodes the telemetry system call numbers and marshals the records built
//! by `kernel-telemetry` into user memory. Every call either succeeds
//! completely or returns [`SYSCALL_FAILED`].

#![cfg_attr(not(any(test, doctest)), no_std)]

mod syscall;

pub use syscall::{LevelControl, SYSCALL_FAILED, SyscallError, SyscallFrame, Syscalls, Sysno};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for call in [
            Sysno::KlogCtl,
            Sysno::SysInfo,
            Sysno::DevInfo,
            Sysno::SchedInfo,
            Sysno::VmStat,
        ] {
            assert_eq!(Sysno::from_raw(call as u64), Some(call));
        }
        assert_eq!(Sysno::from_raw(0), None);
        assert_eq!(Sysno::from_raw(u64::MAX), None);
    }
}
