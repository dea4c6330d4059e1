//! Eurostat tables core library.
//!
//! Decodes JSON-stat dataset documents into flat tables and answers
//! pivot and fill-level queries over them.

pub mod annotation;
pub mod cli;
pub mod dataset;
pub mod dimension;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod table;
pub mod view;

pub use annotation::Annotations;
pub use dataset::{Dataset, DatasetSummary, DimensionSummary};
pub use dimension::{Category, Dimension};
pub use document::RawDocument;
pub use error::{Error, ErrorKind, Result};
pub use exit_codes::ExitCode;
pub use table::{CodedTable, IndexTable, Row, StatusFlags, Table, TableBuilder};
pub use view::{parse_assignments, Axes, FixedAssignments, PivotField, PivotTable, ViewEngine};
