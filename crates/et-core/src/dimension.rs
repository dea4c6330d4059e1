//! Dimensions with their ordered category codes.

use et_common::DimensionId;
use serde::Serialize;
use std::collections::HashMap;

use crate::document::{CategoryIndex, RawDimension};
use crate::error::{Error, Result};

/// One category of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct Category {
    pub code: String,
    pub label: String,
}

/// A dimension and its categories in coordinate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    id: DimensionId,
    label: String,
    categories: Vec<Category>,
    positions: HashMap<String, usize>,
}

impl Dimension {
    /// Build from the raw `dimension` entry.
    ///
    /// Codes are ordered by ascending `category.index` position, which must
    /// be a permutation of `0..n`. A code without a label is its own label.
    pub fn from_raw(id: &str, raw: &RawDimension) -> Result<Self> {
        let codes: Vec<String> = match &raw.category.index {
            Some(CategoryIndex::Ordered(codes)) => codes.clone(),
            Some(CategoryIndex::Positions(positions)) => order_by_position(id, positions)?,
            None if raw.category.label.len() == 1 => {
                raw.category.label.keys().cloned().collect()
            }
            None => {
                return Err(Error::Decode(format!(
                    "dimension {id} has no category index"
                )))
            }
        };

        let mut positions = HashMap::with_capacity(codes.len());
        let mut categories = Vec::with_capacity(codes.len());
        for (position, code) in codes.into_iter().enumerate() {
            if positions.insert(code.clone(), position).is_some() {
                return Err(Error::Decode(format!(
                    "dimension {id} lists category {code} twice"
                )));
            }
            let label = raw
                .category
                .label
                .get(&code)
                .cloned()
                .unwrap_or_else(|| code.clone());
            categories.push(Category { code, label });
        }

        Ok(Self {
            id: DimensionId::from(id),
            label: raw.label.clone().unwrap_or_else(|| id.to_string()),
            categories,
            positions,
        })
    }

    pub fn new(id: impl Into<DimensionId>, label: impl Into<String>, categories: Vec<Category>) -> Self {
        let positions = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.clone(), i))
            .collect();
        Self {
            id: id.into(),
            label: label.into(),
            categories,
            positions,
        }
    }

    pub fn id(&self) -> &DimensionId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Code at coordinate `index`.
    pub fn code(&self, index: usize) -> Option<&str> {
        self.categories.get(index).map(|c| c.code.as_str())
    }

    /// Coordinate of `code`.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.positions.get(code).copied()
    }

    pub fn label_of(&self, code: &str) -> Option<&str> {
        self.position(code).map(|i| self.categories[i].label.as_str())
    }

    /// Code → label map.
    pub fn code_labels(&self) -> HashMap<String, String> {
        self.categories
            .iter()
            .map(|c| (c.code.clone(), c.label.clone()))
            .collect()
    }
}

fn order_by_position(id: &str, positions: &HashMap<String, usize>) -> Result<Vec<String>> {
    let mut slots: Vec<Option<&String>> = vec![None; positions.len()];
    for (code, &position) in positions {
        let slot = slots.get_mut(position).ok_or_else(|| {
            Error::Decode(format!(
                "dimension {id}: category {code} has position {position}, expected < {}",
                positions.len()
            ))
        })?;
        if let Some(previous) = slot.replace(code) {
            return Err(Error::Decode(format!(
                "dimension {id}: categories {previous} and {code} share position {position}"
            )));
        }
    }
    // Every slot is filled: n codes landed on n distinct positions below n.
    Ok(slots.into_iter().flatten().cloned().collect())
}
