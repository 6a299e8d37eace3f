//! JSON Schema export for the canonical configuration.

use crate::CanonicalConfig;
use gazette_digest_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use schemars::{Schema, schema_for};

/// JSON Schema for `CanonicalConfig`.
#[must_use]
pub fn canonical_config_schema() -> Schema {
    schema_for!(CanonicalConfig)
}

/// Pretty JSON rendering of [`canonical_config_schema`] (with trailing newline).
pub fn canonical_config_schema_json() -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(&canonical_config_schema()).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize schema: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}
