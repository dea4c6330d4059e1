//! Schema versioning for JSON outputs and config files.

/// Version stamped into every JSON document the CLI emits.
///
/// Bumped on MAJOR when a field is removed or changes type; additive fields
/// only bump MINOR.
pub const SCHEMA_VERSION: &str = "1.0.0";

fn major(version: &str) -> Option<u32> {
    version.split('.').next()?.trim().parse().ok()
}

/// True when `version` shares the MAJOR component of [`SCHEMA_VERSION`].
///
/// Unparseable versions are never compatible.
pub fn is_compatible(version: &str) -> bool {
    match (major(SCHEMA_VERSION), major(version)) {
        (Some(ours), Some(theirs)) => ours == theirs,
        _ => false,
    }
}
