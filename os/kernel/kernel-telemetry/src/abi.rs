//! Records shared with user space.
//!
//! Every record is `#[repr(C)]` with explicit padding and is copied to user
//! memory whole. Field order and sizes are part of the ABI; the layout checks
//! at the bottom of this file guard against accidental changes.

use bytemuck::{Pod, Zeroable};
use core::mem::offset_of;
use kernel_info::limits::{
    DRIVER_METRICS, DRIVER_NAME_LEN, MAX_DRIVERS, MAX_PROC_SNAPSHOT, PROC_NAME_LEN,
};

/// System-wide summary returned by `sysinfo`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct SysInfo {
    pub total_pages: u64,
    pub free_pages: u64,
    /// Frames in use, `0..=100`.
    pub pressure_pct: i32,
    _pad: u32,
    /// Timer ticks since boot.
    pub ticks: u64,
    /// Process slots not in the unused state.
    pub procs: i32,
    /// Current kernel log level code.
    pub log_level: i32,
}

/// One driver in the device snapshot.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct DriverRecord {
    /// NUL-terminated, truncated to 15 bytes.
    pub name: [u8; DRIVER_NAME_LEN],
    pub class: u32,
    pub inited: u32,
    pub metrics: [u64; DRIVER_METRICS],
}

/// Device snapshot returned by `devinfo`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct DevInfo {
    /// Valid entries at the front of `devs`.
    pub count: u32,
    _pad: u32,
    pub devs: [DriverRecord; MAX_DRIVERS],
}

/// Scheduler state of a process as exported to user space.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProcState {
    Unused = 0,
    Used = 1,
    Sleeping = 2,
    Runnable = 3,
    Running = 4,
    Zombie = 5,
}

/// One process in the scheduler snapshot.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct ProcRecord {
    pub pid: i32,
    pub priority: i32,
    /// A [`ProcState`] code.
    pub state: u32,
    _pad: u32,
    /// Ticks spent running.
    pub rtime: u64,
    /// Times the scheduler picked the process.
    pub sched_count: u64,
    pub page_faults: u64,
    /// NUL-terminated, truncated to 15 bytes.
    pub name: [u8; PROC_NAME_LEN],
}

/// Scheduler snapshot returned by `schedinfo`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct SchedInfo {
    pub ticks: u64,
    pub runnable: u32,
    pub running: u32,
    pub sleeping: u32,
    pub zombies: u32,
    /// Valid entries at the front of `procs`.
    pub returned: u32,
    _pad: u32,
    pub procs: [ProcRecord; MAX_PROC_SNAPSHOT],
}

/// Memory snapshot returned by `vmstat`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct VmStat {
    pub total_pages: u64,
    pub free_pages: u64,
    /// Page faults handled since boot.
    pub page_faults: u64,
    pub pressure_pct: i32,
    _pad: u32,
}

impl SysInfo {
    pub const SIZE: usize = size_of::<Self>();
}

impl DevInfo {
    pub const SIZE: usize = size_of::<Self>();

    #[must_use]
    pub fn drivers(&self) -> &[DriverRecord] {
        &self.devs[..(self.count as usize).min(MAX_DRIVERS)]
    }
}

impl SchedInfo {
    pub const SIZE: usize = size_of::<Self>();

    #[must_use]
    pub fn processes(&self) -> &[ProcRecord] {
        &self.procs[..(self.returned as usize).min(MAX_PROC_SNAPSHOT)]
    }
}

impl VmStat {
    pub const SIZE: usize = size_of::<Self>();
}

/// Copy `src` into `dst` as a C string: at most `L - 1` bytes, NUL padded.
pub(crate) fn copy_name<const L: usize>(dst: &mut [u8; L], src: &str) {
    let len = src.len().min(L - 1);
    dst[..len].copy_from_slice(&src.as_bytes()[..len]);
    dst[len..].fill(0);
}

/// The name stored by [`copy_name`], up to its terminator.
#[must_use]
pub fn name_bytes(name: &[u8]) -> &[u8] {
    let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
    &name[..end]
}

const _: () = {
    assert!(size_of::<SysInfo>() == 40);
    assert!(size_of::<DriverRecord>() == 48);
    assert!(size_of::<DevInfo>() == 8 + 48 * MAX_DRIVERS);
    assert!(size_of::<ProcRecord>() == 56);
    assert!(size_of::<SchedInfo>() == 32 + 56 * MAX_PROC_SNAPSHOT);
    assert!(size_of::<VmStat>() == 32);

    assert!(offset_of!(SysInfo, total_pages) == 0);
    assert!(offset_of!(SysInfo, free_pages) == 8);
    assert!(offset_of!(SysInfo, pressure_pct) == 16);
    assert!(offset_of!(SysInfo, ticks) == 24);
    assert!(offset_of!(SysInfo, procs) == 32);
    assert!(offset_of!(SysInfo, log_level) == 36);

    assert!(offset_of!(DriverRecord, name) == 0);
    assert!(offset_of!(DriverRecord, class) == 16);
    assert!(offset_of!(DriverRecord, inited) == 20);
    assert!(offset_of!(DriverRecord, metrics) == 24);

    assert!(offset_of!(DevInfo, count) == 0);
    assert!(offset_of!(DevInfo, devs) == 8);

    assert!(offset_of!(ProcRecord, pid) == 0);
    assert!(offset_of!(ProcRecord, priority) == 4);
    assert!(offset_of!(ProcRecord, state) == 8);
    assert!(offset_of!(ProcRecord, rtime) == 16);
    assert!(offset_of!(ProcRecord, sched_count) == 24);
    assert!(offset_of!(ProcRecord, page_faults) == 32);
    assert!(offset_of!(ProcRecord, name) == 40);

    assert!(offset_of!(SchedInfo, ticks) == 0);
    assert!(offset_of!(SchedInfo, runnable) == 8);
    assert!(offset_of!(SchedInfo, running) == 12);
    assert!(offset_of!(SchedInfo, sleeping) == 16);
    assert!(offset_of!(SchedInfo, zombies) == 20);
    assert!(offset_of!(SchedInfo, returned) == 24);
    assert!(offset_of!(SchedInfo, procs) == 32);

    assert!(offset_of!(VmStat, total_pages) == 0);
    assert!(offset_of!(VmStat, free_pages) == 8);
    assert!(offset_of!(VmStat, page_faults) == 16);
    assert!(offset_of!(VmStat, pressure_pct) == 24);
};
