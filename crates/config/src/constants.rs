//! Fixed values the resolver injects into every document.

use gazette_digest_domain::DocumentId;

/// Tags every generated job carries.
pub const SYSTEM_TAGS: [&str; 2] = ["dou", "generated_dag"];

/// Prefix of the generated description (`"{prefix} {id}"`).
pub const DEFAULT_DESCRIPTION_PREFIX: &str = "Gazette digest";

/// Text sent when a run finds nothing and delivery is not skipped.
pub const DEFAULT_NO_RESULTS_FOUND_TEXT: &str =
    "Nenhum dos termos pesquisados foi encontrado nesta consulta";

/// Constants passed explicitly into [`crate::DocumentResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConstants {
    /// Tags added to every document.
    pub system_tags: Vec<String>,
    /// Prefix of the generated description.
    pub description_prefix: String,
    /// Default `no_results_text` (input key `no_results_found_text`).
    pub no_results_text: String,
}

impl ResolverConstants {
    /// Description used when a document does not provide one.
    #[must_use]
    pub fn description_for(&self, id: &DocumentId) -> String {
        format!("{} {id}", self.description_prefix)
    }
}

impl Default for ResolverConstants {
    fn default() -> Self {
        Self {
            system_tags: SYSTEM_TAGS.iter().map(|tag| (*tag).to_owned()).collect(),
            description_prefix: DEFAULT_DESCRIPTION_PREFIX.to_owned(),
            no_results_text: DEFAULT_NO_RESULTS_FOUND_TEXT.to_owned(),
        }
    }
}
