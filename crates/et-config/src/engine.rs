//! Decoding engine configuration.
//!
//! Everything the decoder needs besides the document: the none value, the
//! ids of the two axis dimensions and the default fill level. A config read
//! from a dataset request file also keeps the request for reporting.

use et_common::{DimensionId, ObservationValue};
use serde::{Deserialize, Serialize};

use crate::request::DatasetRequest;
use crate::validate::{ValidationError, ValidationResult};

/// Default required fill level for the latest-period query (80 %).
pub const DEFAULT_FILL_LEVEL: f64 = 0.8;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Placeholder for missing values and missing status flags.
    #[serde(default)]
    pub none_value: ObservationValue,

    /// Pivot column axis.
    #[serde(default = "default_time_dimension")]
    pub time_dimension: DimensionId,

    /// Pivot row axis.
    #[serde(default = "default_geo_dimension")]
    pub geo_dimension: DimensionId,

    #[serde(default = "default_fill_level")]
    pub default_fill_level: f64,

    /// Request file this config was read from, if any.
    #[serde(skip)]
    pub request: Option<DatasetRequest>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_time_dimension() -> DimensionId {
    DimensionId::from("time")
}

fn default_geo_dimension() -> DimensionId {
    DimensionId::from("geo")
}

fn default_fill_level() -> f64 {
    DEFAULT_FILL_LEVEL
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            none_value: ObservationValue::default(),
            time_dimension: default_time_dimension(),
            geo_dimension: default_geo_dimension(),
            default_fill_level: DEFAULT_FILL_LEVEL,
            request: None,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_none_value(mut self, none_value: impl Into<ObservationValue>) -> Self {
        self.none_value = none_value.into();
        self
    }

    pub fn with_axes(mut self, time: impl Into<DimensionId>, geo: impl Into<DimensionId>) -> Self {
        self.time_dimension = time.into();
        self.geo_dimension = geo.into();
        self
    }

    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !et_common::schema::is_compatible(&self.schema_version) {
            result.push(ValidationError::new(
                "schema_version",
                format!(
                    "{} is not compatible with {}",
                    self.schema_version,
                    crate::CONFIG_SCHEMA_VERSION
                ),
            ));
        }
        if self.time_dimension.as_str().is_empty() {
            result.push(ValidationError::new("time_dimension", "must not be empty"));
        }
        if self.geo_dimension.as_str().is_empty() {
            result.push(ValidationError::new("geo_dimension", "must not be empty"));
        }
        if self.time_dimension == self.geo_dimension {
            result.push(ValidationError::new(
                "geo_dimension",
                format!("must differ from time_dimension ({})", self.time_dimension),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_fill_level) {
            result.push(ValidationError::new(
                "default_fill_level",
                format!("must be in [0.0, 1.0], got {}", self.default_fill_level),
            ));
        }
        if matches!(&self.none_value, ObservationValue::Number(n) if !n.is_finite()) {
            result.push(ValidationError::new("none_value", "must be a finite number or a string"));
        }

        result
    }
}
