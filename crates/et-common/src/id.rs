//! Observation and dimension identity types.
//!
//! A JSON-stat document keys its `value` and `status` maps by the string form
//! of a flat observation id. These types keep the parsed id and the
//! dimension identifier distinct from arbitrary integers and strings.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flat index into the Cartesian product of all dimension coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(pub u64);

/// Rejected observation key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observation key {key:?} is not a non-negative integer")]
pub struct ObservationIdError {
    pub key: String,
}

impl ObservationId {
    /// Parse a map key such as `"42"`.
    ///
    /// Only plain ASCII digits are accepted; `u64::from_str` would also take
    /// a leading `+`, which never appears in a well-formed key.
    pub fn parse(key: &str) -> Result<Self, ObservationIdError> {
        let invalid = || ObservationIdError {
            key: key.to_string(),
        };
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        key.parse::<u64>().map(ObservationId).map_err(|_| invalid())
    }
}

impl FromStr for ObservationId {
    type Err = ObservationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObservationId::parse(s)
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObservationId {
    fn from(id: u64) -> Self {
        ObservationId(id)
    }
}

/// Dimension identifier such as `geo`, `time` or `unit`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct DimensionId(pub String);

impl DimensionId {
    pub fn new(id: impl Into<String>) -> Self {
        DimensionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DimensionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DimensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DimensionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DimensionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DimensionId {
    fn from(id: &str) -> Self {
        DimensionId(id.to_string())
    }
}

impl From<String> for DimensionId {
    fn from(id: String) -> Self {
        DimensionId(id)
    }
}
