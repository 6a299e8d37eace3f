//! # gazette-digest-config
//!
//! Resolution of user-authored gazette digest documents into a canonical,
//! strongly typed configuration. Problems are accumulated into a
//! `ValidationReport` instead of failing on the first one.
//! This crate depends on `domain` and `shared` only.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// Constants injected by the resolver (system tags, default texts).
pub mod constants;
/// Top-level document resolution.
pub mod document;
/// Validation issues and resolver errors.
pub mod issues;
/// File and byte loading helpers.
pub mod load;
/// Key-tracking reader over untyped mappings.
pub mod reader;
/// Report block resolution.
pub mod report;
/// JSON Schema export.
pub mod schema;
/// Search block resolution.
pub mod search;
/// Literal and derived search terms.
pub mod terms;

pub use constants::{
    DEFAULT_DESCRIPTION_PREFIX, DEFAULT_NO_RESULTS_FOUND_TEXT, ResolverConstants, SYSTEM_TAGS,
};
pub use document::{CanonicalConfig, DocumentResolver};
pub use issues::{
    Diagnostics, FieldPath, IssueKind, ResolveError, ValidationIssue, ValidationReport,
};
pub use load::{
    DocumentFormat, ValidatedConfig, parse_document_bytes, parse_document_bytes_with,
    parse_document_path, parse_document_path_with, parse_raw_document, read_document_file,
    resolve_paths, to_pretty_json, to_yaml,
};
pub use report::{ReportConfig, resolve_report};
pub use schema::{canonical_config_schema, canonical_config_schema_json};
pub use search::{SearchConfig, resolve_search};
pub use terms::{DerivedTerms, SearchTerms, resolve_derived_terms, resolve_terms};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_digest_domain::domain_crate_version;
    use gazette_digest_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
