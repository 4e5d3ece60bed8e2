use core::fmt;

/// Broad kind of device a driver manages.
///
/// The discriminants are exported verbatim in the device snapshot.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DriverClass {
    InterruptController = 0,
    Block = 1,
    Serial = 2,
    Other = 3,
}

impl DriverClass {
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InterruptController => "irq",
            Self::Block => "block",
            Self::Serial => "serial",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DriverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result code reported by an init hook. `0` is success.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Status(i32);

impl Status {
    pub const OK: Self = Self(0);

    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
