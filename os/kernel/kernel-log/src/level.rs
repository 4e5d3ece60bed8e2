use core::fmt;
use log::{Level, LevelFilter};

/// Kernel log level.
///
/// The discriminants are the ABI codes exchanged with user space through
/// `klogctl` and the `sysinfo` record; they do not follow severity order.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    #[default]
    Info = 0,
    Warn = 1,
    Error = 2,
    Debug = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogLevelError {
    #[error("unknown log level code {0}")]
    UnknownCode(i32),
}

impl LogLevel {
    /// Decode an ABI level code.
    ///
    /// # Errors
    /// [`LogLevelError::UnknownCode`] for anything outside `0..=3`.
    pub const fn from_code(code: i32) -> Result<Self, LogLevelError> {
        match code {
            0 => Ok(Self::Info),
            1 => Ok(Self::Warn),
            2 => Ok(Self::Error),
            3 => Ok(Self::Debug),
            other => Err(LogLevelError::UnknownCode(other)),
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// The most verbose facade level that passes this filter.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        value.filter()
    }
}

/// Line tag for a facade level.
pub(crate) const fn tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for level in [LogLevel::Info, LogLevel::Warn, LogLevel::Error, LogLevel::Debug] {
            assert_eq!(LogLevel::from_code(level.code()), Ok(level));
        }
    }

    #[test]
    fn codes_match_user_space_table() {
        assert_eq!(LogLevel::Info.code(), 0);
        assert_eq!(LogLevel::Warn.code(), 1);
        assert_eq!(LogLevel::Error.code(), 2);
        assert_eq!(LogLevel::Debug.code(), 3);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(LogLevel::from_code(4), Err(LogLevelError::UnknownCode(4)));
        assert_eq!(LogLevel::from_code(-1), Err(LogLevelError::UnknownCode(-1)));
    }

    #[test]
    fn filter_follows_severity_not_code() {
        assert!(Level::Warn <= LogLevel::Warn.filter());
        assert!(Level::Info > LogLevel::Warn.filter());
        assert!(Level::Debug <= LogLevel::Debug.filter());
        assert!(Level::Trace > LogLevel::Debug.filter());
    }
}
