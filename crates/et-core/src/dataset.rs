//! Decoded dataset snapshot.
//!
//! A [`Dataset`] is built once from one raw document and never changes
//! afterwards. It owns the coded and indexed tables, the flattened
//! annotations and the dimension metadata, and hands out views on demand.

use chrono::{DateTime, FixedOffset};
use et_common::{DimensionId, ObservationValue, SCHEMA_VERSION};
use et_config::EngineConfig;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::annotation::{Annotations, OBS_COUNT, OBS_PERIOD_OVERALL_LATEST, OBS_PERIOD_OVERALL_OLDEST};
use crate::dimension::{Category, Dimension};
use crate::document::RawDocument;
use crate::error::{Error, Result};
use crate::table::{CodedTable, IndexTable, TableBuilder};
use crate::view::{Axes, FixedAssignments, PivotField, PivotTable, ViewEngine};

#[derive(Debug, Clone)]
pub struct Dataset {
    dimensions: Vec<Dimension>,
    dimension_ids: Vec<DimensionId>,
    shape: Vec<usize>,
    annotations: Annotations,
    language: Option<String>,
    updated: DateTime<FixedOffset>,
    status_labels: BTreeMap<String, String>,
    label: Option<String>,
    coded: CodedTable,
    indexed: IndexTable,
    axes: Axes,
}

impl Dataset {
    pub fn from_json_str(json: &str, config: &EngineConfig) -> Result<Self> {
        Self::from_document(RawDocument::from_json_str(json)?, config)
    }

    pub fn from_reader<R: std::io::Read>(reader: R, config: &EngineConfig) -> Result<Self> {
        Self::from_document(RawDocument::from_reader(reader)?, config)
    }

    pub fn from_path(path: &Path, config: &EngineConfig) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), config)
    }

    /// Decode a raw document. Either every part decodes or nothing is
    /// returned.
    pub fn from_document(doc: RawDocument, config: &EngineConfig) -> Result<Self> {
        if doc.id.len() != doc.size.len() {
            return Err(Error::Decode(format!(
                "`id` lists {} dimensions but `size` has {} entries",
                doc.id.len(),
                doc.size.len()
            )));
        }

        let dimensions = doc
            .id
            .iter()
            .map(|id| {
                let raw = doc.dimension.get(id).ok_or_else(|| {
                    Error::Decode(format!("dimension {id} is listed in `id` but not described"))
                })?;
                Dimension::from_raw(id, raw)
            })
            .collect::<Result<Vec<_>>>()?;

        let updated = doc.parse_updated()?;
        let annotations = Annotations::parse(&doc.extension.annotation);

        let values = doc.value.to_id_map()?;
        let statuses = doc.status.as_ref().map(|s| s.to_id_map()).transpose()?;

        let builder = TableBuilder::new(&dimensions, &doc.size, config.none_value.clone())?;
        let (coded, indexed) = builder.build(&values, statuses.as_ref())?;

        // Status labels only matter when the document carries status data.
        let status_labels = match (&doc.status, &doc.extension.status) {
            (Some(_), Some(ext)) => ext.label.clone(),
            _ => BTreeMap::new(),
        };

        info!(
            dimensions = dimensions.len(),
            rows = coded.len(),
            values = values.len(),
            "decoded dataset"
        );
        debug!(annotations = annotations.len(), updated = %updated, "dataset metadata");

        Ok(Self {
            dimension_ids: dimensions.iter().map(|d| d.id().clone()).collect(),
            dimensions,
            shape: doc.size,
            annotations,
            language: doc.extension.lang.map(|l| l.to_lowercase()),
            updated,
            status_labels,
            label: doc.label,
            coded,
            indexed,
            axes: Axes::from_config(config),
        })
    }

    pub fn dimension_ids(&self) -> &[DimensionId] {
        &self.dimension_ids
    }

    /// Dimension sizes, in dimension order.
    pub fn data_shape(&self) -> &[usize] {
        &self.shape
    }

    /// Table columns: dimension ids, `status`, `observation`.
    pub fn dataframe_columns(&self) -> Vec<String> {
        self.coded.columns()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension_labels(&self) -> BTreeMap<DimensionId, String> {
        self.dimensions
            .iter()
            .map(|d| (d.id().clone(), d.label().to_string()))
            .collect()
    }

    /// Per dimension, code → category label.
    pub fn dimension_value_labels(&self) -> BTreeMap<DimensionId, HashMap<String, String>> {
        self.dimensions
            .iter()
            .map(|d| (d.id().clone(), d.code_labels()))
            .collect()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Lower-cased `extension.lang`.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn updated(&self) -> DateTime<FixedOffset> {
        self.updated
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// `OBS_COUNT` annotation as an integer.
    pub fn observation_count(&self) -> Result<u64> {
        let raw = self
            .annotations
            .get(OBS_COUNT)
            .ok_or_else(|| Error::Decode(format!("annotation {OBS_COUNT} is missing")))?;
        raw.trim().parse().map_err(|_| {
            Error::Decode(format!("annotation {OBS_COUNT} is not an integer: {raw:?}"))
        })
    }

    pub fn latest_period(&self) -> Option<&str> {
        self.annotations.get(OBS_PERIOD_OVERALL_LATEST)
    }

    pub fn oldest_period(&self) -> Option<&str> {
        self.annotations.get(OBS_PERIOD_OVERALL_OLDEST)
    }

    /// Status code → label; empty when the document has no status data.
    pub fn status_labels(&self) -> &BTreeMap<String, String> {
        &self.status_labels
    }

    pub fn none_value(&self) -> &ObservationValue {
        self.coded.none_value()
    }

    pub fn coded_table(&self) -> &CodedTable {
        &self.coded
    }

    pub fn index_table(&self) -> &IndexTable {
        &self.indexed
    }

    pub fn views(&self) -> ViewEngine<'_> {
        ViewEngine::new(&self.coded, self.axes.clone())
    }

    pub fn pivot(&self, fixed: &FixedAssignments, field: PivotField) -> Result<PivotTable> {
        self.views().pivot(fixed, field)
    }

    /// Value cross-tab.
    pub fn pivot_table(&self, fixed: &FixedAssignments) -> Result<PivotTable> {
        self.pivot(fixed, PivotField::Value)
    }

    /// Status cross-tab.
    pub fn status_pivot_table(&self, fixed: &FixedAssignments) -> Result<PivotTable> {
        self.pivot(fixed, PivotField::Status)
    }

    pub fn latest_period_at_fill_level(
        &self,
        fill_level: f64,
        fixed: &FixedAssignments,
    ) -> Result<Option<String>> {
        self.views().latest_period_at_fill_level(fill_level, fixed)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            schema_version: SCHEMA_VERSION.to_string(),
            label: self.label.clone(),
            language: self.language.clone(),
            updated: self.updated,
            dimension_ids: self.dimension_ids.clone(),
            data_shape: self.shape.clone(),
            dimensions: self
                .dimensions
                .iter()
                .map(|d| DimensionSummary {
                    id: d.id().clone(),
                    label: d.label().to_string(),
                    categories: d.categories().to_vec(),
                })
                .collect(),
            row_count: self.coded.len(),
            observation_count: self.observation_count().ok(),
            latest_period: self.latest_period().map(str::to_string),
            oldest_period: self.oldest_period().map(str::to_string),
            status_labels: self.status_labels.clone(),
        }
    }
}

/// Machine-readable dataset metadata, as printed by `et-core info`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DatasetSummary {
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub language: Option<String>,
    /// Last data update.
    pub updated: DateTime<FixedOffset>,
    pub dimension_ids: Vec<DimensionId>,
    pub data_shape: Vec<usize>,
    pub dimensions: Vec<DimensionSummary>,
    /// Rows in the decoded table.
    pub row_count: usize,
    /// `OBS_COUNT` annotation, when present and numeric.
    pub observation_count: Option<u64>,
    pub latest_period: Option<String>,
    pub oldest_period: Option<String>,
    pub status_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DimensionSummary {
    pub id: DimensionId,
    pub label: String,
    pub categories: Vec<Category>,
}
