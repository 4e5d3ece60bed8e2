use crate::abi::{DevInfo, ProcState, SchedInfo, SysInfo, VmStat, copy_name};
use crate::sources::{TelemetrySources, UserCopy};
use bytemuck::{Pod, Zeroable};
use kernel_drivers::{DriverRegistry, RegistrySnapshot};
use kernel_frames::{FrameAllocator, FramePoison, FrameStats};
use kernel_info::limits::MAX_PROC_SNAPSHOT;
use kernel_info::memory::MAX_FRAMES;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    #[error("cannot copy {len} bytes to user address {addr:#x}")]
    CopyOut { addr: u64, len: usize },
}

/// Assembles telemetry records from the live kernel subsystems.
///
/// Every record is built by value from a fresh snapshot; nothing is cached
/// between calls.
pub struct Telemetry<'a, P, S, const N: usize = MAX_FRAMES> {
    frames: &'a FrameAllocator<P, N>,
    drivers: &'a DriverRegistry,
    sources: &'a S,
}

impl<'a, P, S, const N: usize> Telemetry<'a, P, S, N>
where
    P: FramePoison,
    S: TelemetrySources,
{
    #[must_use]
    pub const fn new(
        frames: &'a FrameAllocator<P, N>,
        drivers: &'a DriverRegistry,
        sources: &'a S,
    ) -> Self {
        Self {
            frames,
            drivers,
            sources,
        }
    }

    #[must_use]
    pub fn sys_info(&self) -> SysInfo {
        let mut procs = 0_i32;
        self.sources.for_each_process(&mut |p| {
            if p.state != ProcState::Unused {
                procs += 1;
            }
        });
        sys_info(
            self.frames.stats(),
            self.sources.ticks(),
            procs,
            self.sources.log_level().code(),
        )
    }

    #[must_use]
    pub fn dev_info(&self) -> DevInfo {
        dev_info(&self.drivers.snapshot())
    }

    #[must_use]
    pub fn sched_info(&self) -> SchedInfo {
        let mut info = SchedInfo::zeroed();
        info.ticks = self.sources.ticks();
        self.sources.for_each_process(&mut |p| {
            match p.state {
                ProcState::Unused => return,
                ProcState::Used => {}
                ProcState::Sleeping => info.sleeping += 1,
                ProcState::Runnable => info.runnable += 1,
                ProcState::Running => info.running += 1,
                ProcState::Zombie => info.zombies += 1,
            }
            let slot = info.returned as usize;
            if slot < MAX_PROC_SNAPSHOT {
                let record = &mut info.procs[slot];
                record.pid = p.pid;
                record.priority = p.priority;
                record.state = p.state as u32;
                record.rtime = p.rtime;
                record.sched_count = p.sched_count;
                record.page_faults = p.page_faults;
                copy_name(&mut record.name, p.name);
                info.returned += 1;
            }
        });
        info
    }

    #[must_use]
    pub fn vm_stat(&self) -> VmStat {
        vm_stat(self.frames.stats(), self.sources.page_faults())
    }
}

/// Build a [`SysInfo`] from already collected facts.
#[must_use]
pub fn sys_info(frames: FrameStats, ticks: u64, procs: i32, log_level: i32) -> SysInfo {
    let mut info = SysInfo::zeroed();
    info.total_pages = frames.total as u64;
    info.free_pages = frames.free as u64;
    info.pressure_pct = i32::from(frames.pressure_percent());
    info.ticks = ticks;
    info.procs = procs;
    info.log_level = log_level;
    info
}

/// Convert a registry snapshot into its ABI form.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn dev_info(snapshot: &RegistrySnapshot) -> DevInfo {
    let mut info = DevInfo::zeroed();
    for (record, driver) in info.devs.iter_mut().zip(snapshot.records()) {
        copy_name(&mut record.name, driver.name);
        record.class = driver.class.code();
        record.inited = u32::from(driver.inited);
        record.metrics = driver.metrics.0;
    }
    // Bounded by MAX_DRIVERS.
    info.count = snapshot.len() as u32;
    info
}

#[must_use]
pub fn vm_stat(frames: FrameStats, page_faults: u64) -> VmStat {
    let mut stat = VmStat::zeroed();
    stat.total_pages = frames.total as u64;
    stat.free_pages = frames.free as u64;
    stat.page_faults = page_faults;
    stat.pressure_pct = i32::from(frames.pressure_percent());
    stat
}

/// Copy `record` whole to user address `dst`.
///
/// # Errors
/// [`TelemetryError::CopyOut`] if the destination is not writable. Nothing
/// is retried; the caller reports the failure to user space.
pub fn export<R: Pod>(
    user: &mut impl UserCopy,
    dst: u64,
    record: &R,
) -> Result<(), TelemetryError> {
    let bytes = bytemuck::bytes_of(record);
    user.copy_out(dst, bytes).map_err(|_| {
        log::debug!("telemetry: copy-out of {} bytes to {dst:#x} failed", bytes.len());
        TelemetryError::CopyOut {
            addr: dst,
            len: bytes.len(),
        }
    })
}
