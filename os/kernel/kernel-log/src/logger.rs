use crate::level::{LogLevel, tag};
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicI32, Ordering};
use kernel_sync::SpinLock;
use log::{Log, Metadata, Record, SetLoggerError};

/// Destination for formatted log lines (UART, debug port, ring buffer, ...).
pub trait LogSink: Write + Send {}

impl<T: Write + Send> LogSink for T {}

/// Who is logging and when.
pub trait LogContext: Send + Sync {
    /// Id of the execution unit producing the record.
    fn unit_id(&self) -> u32;
    /// Current tick count.
    fn ticks(&self) -> u64;
}

pub struct KernelLogger<S, C> {
    sink: SpinLock<S>,
    context: C,
    level: AtomicI32,
}

impl<S: LogSink, C: LogContext> KernelLogger<S, C> {
    #[must_use]
    pub const fn new(sink: S, context: C, level: LogLevel) -> Self {
        Self {
            sink: SpinLock::new(sink),
            context,
            level: AtomicI32::new(level.code()),
        }
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        // Only valid codes are ever stored.
        LogLevel::from_code(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Change the level and return the previous one.
    ///
    /// Also lowers or raises the facade's global max level so disabled records
    /// are rejected before their arguments are formatted.
    pub fn set_level(&self, level: LogLevel) -> LogLevel {
        let previous = self.level.swap(level.code(), Ordering::Relaxed);
        log::set_max_level(level.filter());
        LogLevel::from_code(previous).unwrap_or_default()
    }

    /// Run `f` with exclusive access to the sink, e.g. to drain a buffer.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.sink.with_lock(f)
    }

    fn write_line(&self, sink: &mut S, record: &Record) -> fmt::Result {
        writeln!(
            sink,
            "[h{} t{} {}] {}",
            self.context.unit_id(),
            self.context.ticks(),
            tag(record.level()),
            record.args()
        )
    }
}

impl<S: LogSink, C: LogContext> Log for KernelLogger<S, C> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level().filter()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut sink = self.sink.lock();
        // Best effort: a sink that fails mid-line has nowhere to report to.
        let _ = self.write_line(&mut sink, record);
    }

    fn flush(&self) {}
}

/// Register `logger` as the global `log` backend. Call this once during early init.
///
/// # Errors
/// Fails if a logger was already installed.
pub fn install<S, C>(logger: &'static KernelLogger<S, C>) -> Result<(), SetLoggerError>
where
    S: LogSink + 'static,
    C: LogContext + 'static,
{
    log::set_logger(logger)?;
    log::set_max_level(logger.level().filter());
    Ok(())
}
