//! Raw JSON-stat dataset documents.
//!
//! These types mirror the wire format one-to-one. Keys whose absence carries
//! meaning (`status`, `extension.status`, annotation fields) are `Option`s;
//! everything else the decoder needs is checked up front by
//! [`RawDocument::from_value`] so a missing field is reported by name.

use chrono::{DateTime, FixedOffset};
use et_common::{ObservationId, ObservationValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

/// Fields without which a document cannot be decoded, in check order.
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "size", "dimension", "updated"];

/// Timestamp layout of `updated` (`2024-04-19T23:00:00+0200`).
const UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Complete JSON-stat dataset as served by the dissemination API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Dimension ids; defines column and coordinate order.
    pub id: Vec<String>,

    /// Dimension sizes, parallel to `id`.
    pub size: Vec<usize>,

    pub dimension: HashMap<String, RawDimension>,

    #[serde(default)]
    pub value: CellMap<ObservationValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CellMap<String>>,

    #[serde(default)]
    pub extension: Extension,

    pub updated: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDimension {
    #[serde(default)]
    pub label: Option<String>,
    pub category: RawCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCategory {
    /// Absent only for single-category dimensions.
    #[serde(default)]
    pub index: Option<CategoryIndex>,

    #[serde(default)]
    pub label: HashMap<String, String>,
}

/// Category order, either as `code → position` or as an ordered code list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryIndex {
    Positions(HashMap<String, usize>),
    Ordered(Vec<String>),
}

/// Sparse (`{"3": 1.5}`) or dense (`[null, null, null, 1.5]`) cell storage.
///
/// Sparse keys are present even when their value is `null`; dense `null`
/// entries are holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellMap<T> {
    Sparse(BTreeMap<String, Option<T>>),
    Dense(Vec<Option<T>>),
}

impl<T> Default for CellMap<T> {
    fn default() -> Self {
        CellMap::Sparse(BTreeMap::new())
    }
}

impl<T: Clone> CellMap<T> {
    /// Parse every key into an [`ObservationId`].
    pub fn to_id_map(&self) -> Result<HashMap<ObservationId, Option<T>>> {
        match self {
            CellMap::Sparse(map) => map
                .iter()
                .map(|(key, cell)| Ok::<_, Error>((ObservationId::parse(key)?, cell.clone())))
                .collect(),
            CellMap::Dense(cells) => Ok(cells
                .iter()
                .enumerate()
                .filter_map(|(i, cell)| {
                    cell.as_ref()
                        .map(|c| (ObservationId(i as u64), Some(c.clone())))
                })
                .collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CellMap::Sparse(map) => map.len(),
            CellMap::Dense(cells) => cells.iter().filter(|c| c.is_some()).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extension {
    #[serde(default)]
    pub annotation: Vec<Annotation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusExtension>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusExtension {
    #[serde(default)]
    pub label: BTreeMap<String, String>,
}

/// One `extension.annotation` record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl RawDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Check required fields by name, then deserialize.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::Decode("document root is not a JSON object".to_string()))?;
        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(Error::MissingField { field });
            }
        }
        serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
    }

    pub fn parse_updated(&self) -> Result<DateTime<FixedOffset>> {
        parse_updated(&self.updated)
    }
}

/// Parse `updated`, accepting both `+0200` and `+02:00` offsets.
pub fn parse_updated(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, UPDATED_FORMAT))
        .map_err(|source| Error::Timestamp {
            value: value.to_string(),
            source,
        })
}
