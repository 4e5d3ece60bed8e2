use crate::abi::ProcState;
use kernel_log::LogLevel;

/// A process as the scheduler sees it while the snapshot is taken.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProcessView<'a> {
    pub pid: i32,
    pub priority: i32,
    pub state: ProcState,
    pub rtime: u64,
    pub sched_count: u64,
    pub page_faults: u64,
    pub name: &'a str,
}

/// Kernel facts the exporter does not own.
pub trait TelemetrySources {
    /// Timer ticks since boot.
    fn ticks(&self) -> u64;

    /// Level the kernel logger currently filters at.
    fn log_level(&self) -> LogLevel;

    /// Page faults handled since boot, across all processes.
    fn page_faults(&self) -> u64;

    /// Visit every process slot, unused ones included.
    fn for_each_process(&self, visit: &mut dyn FnMut(&ProcessView<'_>));
}

/// Destination in user memory could not be written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CopyFault;

/// Copy-out into the calling process's address space.
pub trait UserCopy {
    /// Write `bytes` to user address `dst`.
    ///
    /// # Errors
    /// [`CopyFault`] if any byte of the destination is not mapped writable.
    fn copy_out(&mut self, dst: u64, bytes: &[u8]) -> Result<(), CopyFault>;
}
