//! Read-only views over a coded table.
//!
//! Two dimensions are reserved as axes: `time` (pivot columns) and `geo`
//! (pivot rows). Their ids come from [`Axes`], normally filled from the
//! engine config.

use et_common::{DimensionId, ObservationValue};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::{CodedRow, CodedTable};

/// Dimension id → required category code.
pub type FixedAssignments = BTreeMap<String, String>;

/// Parse `dim=code` pairs into fixed assignments.
///
/// A repeated dimension keeps its last code.
pub fn parse_assignments<S: AsRef<str>>(pairs: &[S]) -> Result<FixedAssignments> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((dim, code)) if !dim.is_empty() && !code.is_empty() => {
                    Ok((dim.to_string(), code.to_string()))
                }
                _ => Err(Error::validation(format!(
                    "expected DIMENSION=CODE, got {pair:?}"
                ))),
            }
        })
        .collect()
}

/// Ids of the two reserved axis dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axes {
    pub time: DimensionId,
    pub geo: DimensionId,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            time: DimensionId::from("time"),
            geo: DimensionId::from("geo"),
        }
    }
}

impl Axes {
    pub fn from_config(config: &et_config::EngineConfig) -> Self {
        Self {
            time: config.time_dimension.clone(),
            geo: config.geo_dimension.clone(),
        }
    }

    fn is_axis(&self, dimension: &str) -> bool {
        self.time == dimension || self.geo == dimension
    }
}

/// Which row field fills the pivot cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotField {
    #[default]
    Value,
    Status,
}

impl fmt::Display for PivotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotField::Value => write!(f, "value"),
            PivotField::Status => write!(f, "status"),
        }
    }
}

impl FromStr for PivotField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "value" | "observation" => Ok(PivotField::Value),
            "status" => Ok(PivotField::Status),
            other => Err(Error::validation(format!("unknown pivot field {other:?}"))),
        }
    }
}

/// Geo × time cross-tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    pub field: PivotField,
    pub row_dimension: DimensionId,
    pub column_dimension: DimensionId,
    /// Geo codes, ascending.
    pub rows: Vec<String>,
    /// Time codes, ascending.
    pub columns: Vec<String>,
    /// `cells[r][c]` for `rows[r]` × `columns[c]`.
    pub cells: Vec<Vec<ObservationValue>>,
}

impl PivotTable {
    pub fn get(&self, geo: &str, time: &str) -> Option<&ObservationValue> {
        let r = self.rows.iter().position(|g| g == geo)?;
        let c = self.columns.iter().position(|t| t == time)?;
        Some(&self.cells[r][c])
    }
}

/// Views over one coded table.
#[derive(Debug, Clone)]
pub struct ViewEngine<'a> {
    table: &'a CodedTable,
    axes: Axes,
}

impl<'a> ViewEngine<'a> {
    pub fn new(table: &'a CodedTable, axes: Axes) -> Self {
        Self { table, axes }
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    fn axis_column(&self, dimension: &DimensionId) -> Result<usize> {
        self.table.column_index(dimension.as_str()).ok_or_else(|| {
            Error::validation(format!("axis dimension {dimension} is not in the dataset"))
        })
    }

    /// Resolve assignments to column indexes, rejecting unknown dimensions
    /// and, when `reserve_axes` is set, the axis dimensions.
    fn resolve<'f>(
        &self,
        fixed: &'f FixedAssignments,
        reserve_axes: bool,
    ) -> Result<Vec<(usize, &'f str)>> {
        let mut resolved = Vec::with_capacity(fixed.len());
        for (dimension, code) in fixed {
            if reserve_axes && self.axes.is_axis(dimension) {
                return Err(Error::validation(format!(
                    "{dimension} must not be in the fixed assignments"
                )));
            }
            let column = self.table.column_index(dimension).ok_or_else(|| {
                Error::validation(format!("unknown dimension {dimension}"))
            })?;
            resolved.push((column, code.as_str()));
        }
        Ok(resolved)
    }

    fn filtered<'s>(
        &'s self,
        assignments: &'s [(usize, &'s str)],
    ) -> impl Iterator<Item = &'a CodedRow> + 's {
        self.table.rows().iter().filter(move |row| {
            assignments
                .iter()
                .all(|&(column, code)| row.keys[column] == code)
        })
    }

    /// Cross-tab of `field` with one row per geo code and one column per
    /// time code. Combinations without a row hold the none value.
    pub fn pivot(&self, fixed: &FixedAssignments, field: PivotField) -> Result<PivotTable> {
        let assignments = self.resolve(fixed, true)?;
        let time_col = self.axis_column(&self.axes.time)?;
        let geo_col = self.axis_column(&self.axes.geo)?;

        let mut cells: HashMap<(&str, &str), (usize, ObservationValue)> = HashMap::new();
        let mut geos = BTreeSet::new();
        let mut times = BTreeSet::new();
        for row in self.filtered(&assignments) {
            let geo = row.keys[geo_col].as_str();
            let time = row.keys[time_col].as_str();
            geos.insert(geo);
            times.insert(time);
            let cell = match field {
                PivotField::Value => self.table.value_of(row).clone(),
                PivotField::Status => self.table.status_of(row),
            };
            cells
                .entry((geo, time))
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, cell));
        }

        if let Some(((geo, time), (count, _))) = cells
            .iter()
            .filter(|(_, (count, _))| *count > 1)
            .min_by_key(|(key, _)| **key)
        {
            return Err(Error::AmbiguousPivot {
                geo: geo.to_string(),
                time: time.to_string(),
                count: *count,
            });
        }

        let none = self.table.none_value();
        let grid: Vec<Vec<ObservationValue>> = geos
            .iter()
            .map(|&geo| {
                times
                    .iter()
                    .map(|&time| {
                        cells
                            .get(&(geo, time))
                            .map(|(_, v)| v.clone())
                            .unwrap_or_else(|| none.clone())
                    })
                    .collect()
            })
            .collect();

        debug!(
            %field,
            rows = geos.len(),
            columns = times.len(),
            "built pivot table"
        );
        Ok(PivotTable {
            field,
            row_dimension: self.axes.geo.clone(),
            column_dimension: self.axes.time.clone(),
            rows: geos.into_iter().map(str::to_string).collect(),
            columns: times.into_iter().map(str::to_string).collect(),
            cells: grid,
        })
    }

    /// Latest time code whose count of real values reaches `fill_level`
    /// times the best-filled period.
    ///
    /// `None` when no rows match or no period has any real value.
    pub fn latest_period_at_fill_level(
        &self,
        fill_level: f64,
        fixed: &FixedAssignments,
    ) -> Result<Option<String>> {
        if !(0.0..=1.0).contains(&fill_level) {
            return Err(Error::validation(format!(
                "fill level must be in [0.0, 1.0], got {fill_level}"
            )));
        }
        let assignments = self.resolve(fixed, false)?;
        let time_col = self.axis_column(&self.axes.time)?;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in self.filtered(&assignments) {
            let count = counts.entry(row.keys[time_col].as_str()).or_insert(0);
            if self.table.has_value(row) {
                *count += 1;
            }
        }

        let max_count = counts.values().copied().max().unwrap_or(0);
        if max_count == 0 {
            debug!(periods = counts.len(), "no period has values");
            return Ok(None);
        }

        let latest = counts
            .iter()
            .rev()
            .find(|(_, count)| **count as f64 / max_count as f64 >= fill_level)
            .map(|(&time, _)| time.to_string());
        debug!(fill_level, max_count, latest = ?latest, "resolved latest period");
        Ok(latest)
    }
}
