//! Dense observation tables built from sparse cell maps.
//!
//! Every present observation id (a key of the value map or the status map)
//! is decoded into one coordinate per dimension. Two tables come out of one
//! pass and stay row-aligned:
//!
//! - [`CodedTable`]: coordinates translated to category codes,
//! - [`IndexTable`]: the raw coordinates.
//!
//! Rows that agree on every column except status are collapsed into one row
//! whose status is the union of the merged rows' status characters.

use et_common::{DimensionId, ObservationId, ObservationValue};
use et_math::RadixCodec;
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, trace};

use crate::dimension::Dimension;
use crate::error::{Error, Result};

/// Set of single-character status flags (`p` provisional, `e` estimated, ...).
///
/// Characters are the merge atoms: merging `"p"` and `"ep"` gives `"ep"`.
/// Rendering is in ascending character order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StatusFlags(BTreeSet<char>);

impl StatusFlags {
    pub fn parse(s: &str) -> Self {
        StatusFlags(s.chars().collect())
    }

    pub fn merge(&mut self, other: &StatusFlags) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl Serialize for StatusFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One table row. `K` is a category code or a raw coordinate.
///
/// `value` is `None` and `status` empty where the source had no entry; the
/// owning table renders both with its none value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row<K> {
    /// Smallest observation id merged into this row.
    pub observation: ObservationId,
    pub keys: Vec<K>,
    pub status: StatusFlags,
    pub value: Option<ObservationValue>,
}

pub type CodedRow = Row<String>;
pub type IndexRow = Row<usize>;

/// Immutable observation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<K> {
    dimension_ids: Vec<DimensionId>,
    rows: Vec<Row<K>>,
    none_value: ObservationValue,
}

pub type CodedTable = Table<String>;
pub type IndexTable = Table<usize>;

impl<K> Table<K> {
    pub fn dimension_ids(&self) -> &[DimensionId] {
        &self.dimension_ids
    }

    /// Dimension ids followed by `status` and `observation`.
    pub fn columns(&self) -> Vec<String> {
        self.dimension_ids
            .iter()
            .map(|d| d.to_string())
            .chain(["status".to_string(), "observation".to_string()])
            .collect()
    }

    pub fn column_index(&self, dimension: &str) -> Option<usize> {
        self.dimension_ids.iter().position(|d| d == dimension)
    }

    pub fn rows(&self) -> &[Row<K>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn none_value(&self) -> &ObservationValue {
        &self.none_value
    }

    /// Row value, or the none value if the row has none.
    pub fn value_of<'a>(&'a self, row: &'a Row<K>) -> &'a ObservationValue {
        row.value.as_ref().unwrap_or(&self.none_value)
    }

    /// Row status as rendered text, or the none value if empty.
    pub fn status_of(&self, row: &Row<K>) -> ObservationValue {
        if row.status.is_empty() {
            self.none_value.clone()
        } else {
            ObservationValue::Text(row.status.to_string())
        }
    }

    /// True when the row carries a real value, not the none value.
    pub fn has_value(&self, row: &Row<K>) -> bool {
        row.value.as_ref().is_some_and(|v| *v != self.none_value)
    }
}

/// One observation row. Before grouping there is one per present id.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub observation: ObservationId,
    pub coords: Vec<usize>,
    pub status: StatusFlags,
    pub value: Option<ObservationValue>,
}

/// Grouped row, shared by both output tables.
pub type MergedRow = SourceRow;

/// Group rows by `(coords, value)` and union their status flags.
///
/// Output order is by smallest observation id, so the result does not
/// depend on input order. Two groups with the same coordinates but
/// different values mean the source assigned two values to one cell; that
/// is reported instead of emitting both.
pub fn merge_rows<I>(rows: I) -> Result<Vec<MergedRow>>
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut slots: HashMap<(Vec<usize>, Option<ObservationValue>), usize> = HashMap::new();
    let mut merged: Vec<MergedRow> = Vec::new();

    for row in rows {
        let key = (row.coords, row.value);
        match slots.get(&key) {
            Some(&slot) => {
                let target = &mut merged[slot];
                target.status.merge(&row.status);
                target.observation = target.observation.min(row.observation);
            }
            None => {
                slots.insert(key.clone(), merged.len());
                merged.push(MergedRow {
                    observation: row.observation,
                    coords: key.0,
                    status: row.status,
                    value: key.1,
                });
            }
        }
    }

    {
        let mut by_coords: HashMap<&[usize], &MergedRow> = HashMap::with_capacity(merged.len());
        for row in &merged {
            if let Some(other) = by_coords.insert(row.coords.as_slice(), row) {
                return Err(Error::ConflictingObservation {
                    coordinate: format!("{:?}", row.coords),
                    first: render(&other.value),
                    second: render(&row.value),
                });
            }
        }
    }

    merged.sort_by_key(|r| r.observation);
    Ok(merged)
}

fn render(value: &Option<ObservationValue>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

/// Builds the coded and indexed tables of one document.
#[derive(Debug, Clone)]
pub struct TableBuilder<'a> {
    dimensions: &'a [Dimension],
    codec: RadixCodec,
    none_value: ObservationValue,
}

impl<'a> TableBuilder<'a> {
    /// `dimensions` and `sizes` are parallel; each dimension must have
    /// exactly as many categories as its size.
    pub fn new(
        dimensions: &'a [Dimension],
        sizes: &[usize],
        none_value: ObservationValue,
    ) -> Result<Self> {
        if dimensions.len() != sizes.len() {
            return Err(Error::Decode(format!(
                "{} dimensions but {} sizes",
                dimensions.len(),
                sizes.len()
            )));
        }
        for (dim, &size) in dimensions.iter().zip(sizes) {
            if dim.len() != size {
                return Err(Error::Decode(format!(
                    "dimension {} has {} categories but size {}",
                    dim.id(),
                    dim.len(),
                    size
                )));
            }
        }
        Ok(Self {
            dimensions,
            codec: RadixCodec::new(sizes)?,
            none_value,
        })
    }

    /// Decode every present id and emit both tables.
    pub fn build(
        &self,
        values: &HashMap<ObservationId, Option<ObservationValue>>,
        statuses: Option<&HashMap<ObservationId, Option<String>>>,
    ) -> Result<(CodedTable, IndexTable)> {
        let present: BTreeSet<ObservationId> = values
            .keys()
            .chain(statuses.into_iter().flat_map(|s| s.keys()))
            .copied()
            .collect();

        let source = present
            .iter()
            .map(|&id| -> Result<SourceRow> {
                let coords = self.codec.decode(id.0)?;
                let value = values.get(&id).cloned().flatten();
                let status = statuses
                    .and_then(|s| s.get(&id))
                    .and_then(|s| s.as_deref())
                    .map(StatusFlags::parse)
                    .unwrap_or_default();
                trace!(%id, ?coords, "decoded observation");
                Ok(SourceRow {
                    observation: id,
                    coords,
                    status,
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let merged = merge_rows(source)?;
        debug!(
            present = present.len(),
            rows = merged.len(),
            cardinality = self.codec.cardinality(),
            "built observation tables"
        );
        Ok(self.emit(merged))
    }

    fn emit(&self, merged: Vec<MergedRow>) -> (CodedTable, IndexTable) {
        let dimension_ids: Vec<DimensionId> =
            self.dimensions.iter().map(|d| d.id().clone()).collect();

        let mut coded = Vec::with_capacity(merged.len());
        let mut indexed = Vec::with_capacity(merged.len());
        for row in merged {
            let codes = row
                .coords
                .iter()
                .zip(self.dimensions)
                .map(|(&c, dim)| {
                    // Coordinates come from the codec, so c < size == dim.len().
                    dim.code(c).unwrap_or_default().to_string()
                })
                .collect();
            coded.push(Row {
                observation: row.observation,
                keys: codes,
                status: row.status.clone(),
                value: row.value.clone(),
            });
            indexed.push(Row {
                observation: row.observation,
                keys: row.coords,
                status: row.status,
                value: row.value,
            });
        }

        (
            Table {
                dimension_ids: dimension_ids.clone(),
                rows: coded,
                none_value: self.none_value.clone(),
            },
            Table {
                dimension_ids,
                rows: indexed,
                none_value: self.none_value.clone(),
            },
        )
    }
}
