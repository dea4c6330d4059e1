//! Eurostat tables common types and IDs.
//!
//! This crate provides foundational types shared across et-core modules:
//! - Observation and dimension identity types
//! - Schema versioning for JSON outputs
//! - Observation cell values
//! - Output formats for command results

pub mod id;
pub mod output;
pub mod schema;
pub mod value;

pub use id::{DimensionId, ObservationId, ObservationIdError};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
pub use value::ObservationValue;
