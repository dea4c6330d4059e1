//! Dataset request files.
//!
//! A request file names a dataset and how it should be fetched:
//!
//! ```json
//! {
//!   "dataset": "lfsi_emp_a",
//!   "language": "de",
//!   "none_value": "-",
//!   "dimension_filter": {"sex": ["M", "F"]},
//!   "time_period_filter": [[">=", "2022"]]
//! }
//! ```
//!
//! Fetching is done elsewhere. Here the file is parsed and validated, and its
//! `none_value` and `language` are folded into an [`EngineConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::engine::EngineConfig;
use crate::validate::{ValidationError, ValidationResult};
use et_common::ObservationValue;

/// Comparison operator of a time period filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriodOperator {
    Equals,
    GreaterOrEquals,
    Greater,
    LowerOrEquals,
    Lower,
}

impl TimePeriodOperator {
    /// Map the symbol used in request files (`>=`) to an operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Equals),
            ">=" => Some(Self::GreaterOrEquals),
            ">" => Some(Self::Greater),
            "<=" => Some(Self::LowerOrEquals),
            "<" => Some(Self::Lower),
            _ => None,
        }
    }

    /// Short query code (`ge`) of the operator.
    pub fn code(self) -> &'static str {
        match self {
            Self::Equals => "eq",
            Self::GreaterOrEquals => "ge",
            Self::Greater => "gt",
            Self::LowerOrEquals => "le",
            Self::Lower => "lt",
        }
    }
}

impl fmt::Display for TimePeriodOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parsed dataset request file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRequest {
    pub dataset: String,
    pub language: String,

    #[serde(default)]
    pub none_value: Option<ObservationValue>,

    #[serde(default)]
    pub dimension_filter: BTreeMap<String, Vec<String>>,

    /// `(symbol, period)` pairs such as `(">=", "2022")`.
    #[serde(default)]
    pub time_period_filter: Vec<(String, String)>,
}

impl DatasetRequest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Time filters with their symbols resolved; unknown symbols are skipped.
    pub fn time_period_operators(&self) -> Vec<(TimePeriodOperator, &str)> {
        self.time_period_filter
            .iter()
            .filter_map(|(symbol, period)| {
                TimePeriodOperator::from_symbol(symbol).map(|op| (op, period.as_str()))
            })
            .collect()
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        if self.dataset.trim().is_empty() {
            result.push(ValidationError::new("dataset", "must not be empty"));
        }
        if self.language.trim().is_empty() {
            result.push(ValidationError::new("language", "must not be empty"));
        }
        for (symbol, _) in &self.time_period_filter {
            if TimePeriodOperator::from_symbol(symbol).is_none() {
                result.push(ValidationError::new(
                    "time_period_filter",
                    format!("operator '{}' not supported", symbol),
                ));
            }
        }
        for (dimension, values) in &self.dimension_filter {
            if values.is_empty() {
                result.push(ValidationError::new(
                    "dimension_filter",
                    format!("no values given for dimension {}", dimension),
                ));
            }
        }
        result
    }

    /// Overlay this request's `none_value` onto `base` and attach the
    /// request itself.
    pub fn apply_to(&self, mut base: EngineConfig) -> EngineConfig {
        if let Some(none_value) = &self.none_value {
            base.none_value = none_value.clone();
        }
        base.request = Some(self.clone());
        base
    }

    /// What the request asks for, with operators resolved to query codes.
    pub fn report(&self) -> RequestReport {
        RequestReport {
            dataset: self.dataset.clone(),
            language: self.language.to_lowercase(),
            dimension_filter: self.dimension_filter.clone(),
            time_period_filter: self
                .time_period_operators()
                .into_iter()
                .map(|(op, period)| TimePeriodClause {
                    operator: op.to_string(),
                    period: period.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a [`DatasetRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestReport {
    pub dataset: String,
    pub language: String,
    pub dimension_filter: BTreeMap<String, Vec<String>>,
    pub time_period_filter: Vec<TimePeriodClause>,
}

/// One resolved time period filter, e.g. `ge 2022`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePeriodClause {
    pub operator: String,
    pub period: String,
}

impl fmt::Display for TimePeriodClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.period)
    }
}
