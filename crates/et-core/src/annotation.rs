//! Flattening of `extension.annotation` records into a type → value map.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::document::Annotation;

/// Total number of observations in the dataset.
pub const OBS_COUNT: &str = "OBS_COUNT";
/// Most recent period with data across the whole dataset.
pub const OBS_PERIOD_OVERALL_LATEST: &str = "OBS_PERIOD_OVERALL_LATEST";
/// Oldest period with data across the whole dataset.
pub const OBS_PERIOD_OVERALL_OLDEST: &str = "OBS_PERIOD_OVERALL_OLDEST";

/// Annotation values keyed by annotation type.
///
/// A type whose record carried none of `title`, `text`, `date` maps to
/// `None` but is still listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<String, Option<String>>);

impl Annotations {
    /// Resolve each record to its first non-empty `title`, `text` or `date`.
    ///
    /// Later records with a repeated type overwrite earlier ones.
    pub fn parse(records: &[Annotation]) -> Self {
        let mut map = BTreeMap::new();
        for record in records {
            map.insert(record.kind.clone(), resolve(record));
        }
        Annotations(map)
    }

    /// Value of `kind`, or `None` if the type is unknown or had no value.
    pub fn get(&self, kind: &str) -> Option<&str> {
        self.0.get(kind).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn resolve(record: &Annotation) -> Option<String> {
    [&record.title, &record.text, &record.date]
        .into_iter()
        .flatten()
        .find(|v| !v.is_empty())
        .cloned()
}
