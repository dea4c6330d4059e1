//! Error types for decoding and views.

use et_common::ObservationIdError;
use et_config::ConfigError;
use et_math::CodecError;
use thiserror::Error;

/// Result type alias for et-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Range,
    Validation,
    AmbiguousPivot,
    Config,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::Range => "range",
            ErrorKind::Validation => "validation",
            ErrorKind::AmbiguousPivot => "ambiguous_pivot",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        }
    }
}

/// Unified error type for et-core.
#[derive(Error, Debug)]
pub enum Error {
    // Decode errors (10-19)
    #[error("document is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("malformed document: {0}")]
    Decode(String),

    #[error("malformed document: {0}")]
    ObservationKey(#[from] ObservationIdError),

    #[error("invalid `updated` timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("conflicting observations at {coordinate}: {first} vs {second}")]
    ConflictingObservation {
        coordinate: String,
        first: String,
        second: String,
    },

    // Codec errors (20-29)
    #[error("coordinate codec: {0}")]
    Range(#[from] CodecError),

    // View errors (30-39)
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("ambiguous pivot: {count} rows for geo={geo}, time={time}")]
    AmbiguousPivot {
        geo: String,
        time: String,
        count: usize,
    },

    // Environment errors (40-49)
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingField { .. } => 10,
            Error::Decode(_) => 11,
            Error::ObservationKey(_) => 12,
            Error::Timestamp { .. } => 13,
            Error::ConflictingObservation { .. } => 14,
            Error::Range(_) => 20,
            Error::Validation(_) => 30,
            Error::AmbiguousPivot { .. } => 31,
            Error::Config(_) => 40,
            Error::Io(_) => 41,
            Error::Json(_) => 42,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField { .. }
            | Error::Decode(_)
            | Error::ObservationKey(_)
            | Error::Timestamp { .. }
            | Error::ConflictingObservation { .. }
            | Error::Json(_) => ErrorKind::Decode,
            Error::Range(_) => ErrorKind::Range,
            Error::Validation(_) => ErrorKind::Validation,
            Error::AmbiguousPivot { .. } => ErrorKind::AmbiguousPivot,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
