//! # gazette-digest-domain
//!
//! Domain vocabulary for gazette digest jobs:
//!
//! - **Vocabulary** - the Enumeration Registry (`TimeWindow`, `GazetteSection`,
//!   `MatchField`, `DataSource`) with accent/case-insensitive normalization
//! - **Identity** - `DocumentId`, derived from where a document was loaded
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use gazette_digest_shared::shared_crate_version;

pub mod identity;
pub mod vocabulary;

pub use identity::{DocumentId, IdentityError};
pub use vocabulary::{
    DataSource, GazetteSection, MatchField, TimeWindow, Vocabulary, VocabularyCategory,
    VocabularyError, fold_keyword, normalize, verify_table, verify_tables,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_depends_on_shared() {
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
