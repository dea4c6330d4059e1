//! Eurostat tables configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the engine config and dataset request files
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod engine;
pub mod request;
pub mod resolve;
pub mod validate;

pub use engine::EngineConfig;
pub use request::{DatasetRequest, RequestReport, TimePeriodClause, TimePeriodOperator};
pub use resolve::{resolve_config, ConfigError, ConfigPaths, ConfigSource};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = et_common::SCHEMA_VERSION;
