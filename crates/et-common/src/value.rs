//! Observation cell values.
//!
//! JSON-stat cells are numbers for most datasets but may be strings (for
//! example confidential markers). The same type doubles as the configured
//! "none value" placeholder, which is `"-"` unless configured otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single observation value, numeric or textual.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(f64),
    Text(String),
}

impl ObservationValue {
    pub fn text(s: impl Into<String>) -> Self {
        ObservationValue::Text(s.into())
    }
}

impl Default for ObservationValue {
    fn default() -> Self {
        ObservationValue::Text("-".to_string())
    }
}

// Numbers compare by bit pattern so values can key a HashMap.
impl PartialEq for ObservationValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ObservationValue::Number(a), ObservationValue::Number(b)) => a.to_bits() == b.to_bits(),
            (ObservationValue::Text(a), ObservationValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ObservationValue {}

impl Hash for ObservationValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ObservationValue::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            ObservationValue::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationValue::Number(n) => write!(f, "{}", n),
            ObservationValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ObservationValue {
    fn from(n: f64) -> Self {
        ObservationValue::Number(n)
    }
}

impl From<&str> for ObservationValue {
    fn from(s: &str) -> Self {
        ObservationValue::Text(s.to_string())
    }
}

impl From<String> for ObservationValue {
    fn from(s: String) -> Self {
        ObservationValue::Text(s)
    }
}
