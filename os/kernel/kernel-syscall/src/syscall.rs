use kernel_frames::FramePoison;
use kernel_info::memory::MAX_FRAMES;
use kernel_log::{KernelLogger, LogContext, LogLevel, LogLevelError, LogSink};
use kernel_telemetry::{Telemetry, TelemetryError, TelemetrySources, UserCopy, export};

/// Value returned to user space for any failed call (`-1` as a signed word).
pub const SYSCALL_FAILED: u64 = u64::MAX;

/// Telemetry system call numbers.
#[repr(u64)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sysno {
    /// Set the kernel log level; returns the previous level code.
    KlogCtl = 24,
    /// Copy a [`SysInfo`](kernel_telemetry::SysInfo) to the address in `arg0`.
    SysInfo = 25,
    /// Copy a [`DevInfo`](kernel_telemetry::DevInfo) to the address in `arg0`.
    DevInfo = 26,
    /// Copy a [`SchedInfo`](kernel_telemetry::SchedInfo) to the address in `arg0`.
    SchedInfo = 27,
    /// Copy a [`VmStat`](kernel_telemetry::VmStat) to the address in `arg0`.
    VmStat = 28,
}

impl Sysno {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            x if x == Self::KlogCtl as u64 => Some(Self::KlogCtl),
            x if x == Self::SysInfo as u64 => Some(Self::SysInfo),
            x if x == Self::DevInfo as u64 => Some(Self::DevInfo),
            x if x == Self::SchedInfo as u64 => Some(Self::SchedInfo),
            x if x == Self::VmStat as u64 => Some(Self::VmStat),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyscallError {
    #[error("unknown system call {0}")]
    Unknown(u64),
    #[error(transparent)]
    LogLevel(#[from] LogLevelError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Runtime control of the kernel log level.
pub trait LevelControl {
    /// Install `level` and return the one it replaces.
    fn set_level(&self, level: LogLevel) -> LogLevel;
}

impl<S: LogSink, C: LogContext> LevelControl for KernelLogger<S, C> {
    fn set_level(&self, level: LogLevel) -> LogLevel {
        Self::set_level(self, level)
    }
}

/// Register state at syscall entry. The handler writes the result to `ret`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SyscallFrame {
    pub sysno: u64,
    pub args: [u64; 3],
    pub ret: u64,
}

impl SyscallFrame {
    #[must_use]
    pub const fn new(sysno: u64, arg0: u64) -> Self {
        Self {
            sysno,
            args: [arg0, 0, 0],
            ret: 0,
        }
    }
}

/// Handlers for the telemetry system calls.
pub struct Syscalls<'a, P, S, L, const N: usize = MAX_FRAMES> {
    telemetry: Telemetry<'a, P, S, N>,
    log: &'a L,
}

impl<'a, P, S, L, const N: usize> Syscalls<'a, P, S, L, N>
where
    P: FramePoison,
    S: TelemetrySources,
    L: LevelControl,
{
    #[must_use]
    pub const fn new(telemetry: Telemetry<'a, P, S, N>, log: &'a L) -> Self {
        Self { telemetry, log }
    }

    /// Serve the call described by `frame` and store the result in `frame.ret`.
    pub fn handle(&self, frame: &mut SyscallFrame, user: &mut impl UserCopy) {
        frame.ret = self.dispatch(frame.sysno, frame.args[0], user);
    }

    /// Serve one call. Returns `0` or the previous log level on success and
    /// [`SYSCALL_FAILED`] on any failure.
    pub fn dispatch(&self, sysno: u64, arg0: u64, user: &mut impl UserCopy) -> u64 {
        match self.try_dispatch(sysno, arg0, user) {
            Ok(ret) => ret,
            Err(e) => {
                log::debug!("syscall {sysno}: {e}");
                SYSCALL_FAILED
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch) but keeps the failure reason.
    ///
    /// # Errors
    /// See [`SyscallError`].
    pub fn try_dispatch(
        &self,
        sysno: u64,
        arg0: u64,
        user: &mut impl UserCopy,
    ) -> Result<u64, SyscallError> {
        let Some(call) = Sysno::from_raw(sysno) else {
            return Err(SyscallError::Unknown(sysno));
        };

        match call {
            Sysno::KlogCtl => {
                // Integer arguments occupy the low 32 bits of the register.
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let code = arg0 as u32 as i32;
                let level = LogLevel::from_code(code)?;
                let previous = self.log.set_level(level);
                Ok(u64::from(previous.code().unsigned_abs()))
            }
            Sysno::SysInfo => {
                export(user, arg0, &self.telemetry.sys_info())?;
                Ok(0)
            }
            Sysno::DevInfo => {
                export(user, arg0, &self.telemetry.dev_info())?;
                Ok(0)
            }
            Sysno::SchedInfo => {
                export(user, arg0, &self.telemetry.sched_info())?;
                Ok(0)
            }
            Sysno::VmStat => {
                export(user, arg0, &self.telemetry.vm_stat())?;
                Ok(0)
            }
        }
    }
}
