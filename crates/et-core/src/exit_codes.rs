//! Exit codes for the et-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.

use crate::error::{Error, ErrorKind};

/// Exit codes for et-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command produced its result
    Clean = 0,

    /// Query ran but found nothing (no period meets the fill level)
    NoResult = 1,

    /// Configuration error
    ConfigError = 10,

    /// Document could not be decoded
    DecodeError = 11,

    /// Observation id outside the cube
    RangeError = 12,

    /// Caller-supplied argument rejected
    ValidationError = 13,

    /// Pivot would merge several rows into one cell
    AmbiguousPivot = 14,

    /// I/O error
    IoError = 15,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::NoResult)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(error: &Error) -> Self {
        match error.kind() {
            ErrorKind::Decode => ExitCode::DecodeError,
            ErrorKind::Range => ExitCode::RangeError,
            ErrorKind::Validation => ExitCode::ValidationError,
            ErrorKind::AmbiguousPivot => ExitCode::AmbiguousPivot,
            ErrorKind::Config => ExitCode::ConfigError,
            ErrorKind::Io => ExitCode::IoError,
        }
    }
}
