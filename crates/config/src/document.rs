//! Document resolver: the entry point from an untyped tree to a
//! [`CanonicalConfig`].
//!
//! Resolution is single-pass and stateless. Search blocks are independent,
//! so they are resolved in parallel and their issues are gathered back in
//! block order.

use crate::constants::ResolverConstants;
use crate::issues::{Diagnostics, FieldPath, IssueKind, ResolveError, ValidationReport};
use crate::reader::{FieldReader, describe};
use crate::report::{ReportConfig, resolve_report};
use crate::search::{SearchConfig, resolve_search};
use gazette_digest_domain::{DocumentId, verify_tables};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Key of the legacy single-key wrapper (`dag: {...}`).
const ENVELOPE_KEY: &str = "dag";

/// Fully validated, default-resolved, alias-free job configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalConfig {
    /// Identity, equal to the identity of the source location.
    pub id: DocumentId,
    /// Human-readable description.
    pub description: String,
    /// Cron expression; `None` means manual or event-driven.
    pub schedule: Option<String>,
    /// Dataset that triggers the job.
    pub dataset: Option<String>,
    /// Markdown documentation, trimmed.
    pub doc_markdown: Option<String>,
    /// User tags plus system tags plus the dataset tag.
    pub tags: BTreeSet<String>,
    /// Owners, in document order.
    pub owners: Vec<String>,
    /// Search blocks, in document order.
    pub searches: Vec<SearchConfig>,
    /// Report settings shared by all searches.
    pub report: ReportConfig,
}

/// Top-level resolver.
#[derive(Debug, Clone, Default)]
pub struct DocumentResolver {
    constants: ResolverConstants,
}

impl DocumentResolver {
    /// Resolver using the given constants.
    #[must_use]
    pub const fn new(constants: ResolverConstants) -> Self {
        Self { constants }
    }

    /// Constants injected into resolved documents.
    #[must_use]
    pub const fn constants(&self) -> &ResolverConstants {
        &self.constants
    }

    /// Resolve `raw` into a canonical config.
    ///
    /// `identity` is the identity derived from where the document was loaded.
    /// A declared `id` that disagrees with it fails fast; every other problem
    /// is accumulated into one [`ValidationReport`].
    pub fn resolve(
        &self,
        raw: &Value,
        identity: &DocumentId,
    ) -> Result<CanonicalConfig, ResolveError> {
        verify_tables().map_err(ResolveError::RegistryDefect)?;

        let result = self.resolve_document(unwrap_envelope(raw), identity);
        match &result {
            Ok(config) => tracing::debug!(
                document = %identity,
                searches = config.searches.len(),
                "document resolved"
            ),
            Err(ResolveError::Invalid(report)) => tracing::warn!(
                document = %identity,
                issues = report.len(),
                "document rejected"
            ),
            Err(ResolveError::RegistryDefect(defect)) => tracing::error!(
                document = %identity,
                error = %defect,
                "vocabulary table defect"
            ),
        }
        result
    }

    fn resolve_document(
        &self,
        raw: &Value,
        identity: &DocumentId,
    ) -> Result<CanonicalConfig, ResolveError> {
        let mut diagnostics = Diagnostics::new();
        let Some(mut reader) = FieldReader::open(raw, FieldPath::root(), &mut diagnostics) else {
            return diagnostics.finish(None);
        };

        if let Some(mismatch) = identity_mismatch(reader.take("id"), identity) {
            return Err(ResolveError::Invalid(mismatch));
        }

        let description = reader
            .trimmed_text("description", &mut diagnostics)
            .unwrap_or_else(|| self.constants.description_for(identity));
        let schedule = reader.trimmed_text("schedule", &mut diagnostics);
        let dataset = reader.trimmed_text("dataset", &mut diagnostics);
        let doc_markdown = reader.trimmed_text("doc_md", &mut diagnostics);
        let tags = self.tags(&mut reader, dataset.as_deref(), &mut diagnostics);
        let owners = reader.text_list("owner", &mut diagnostics).unwrap_or_default();

        if reader.take("skip_null").is_some() {
            diagnostics.push(
                reader.field_path("skip_null"),
                IssueKind::UnknownField,
                "skip_null is a report setting; move it under report",
            );
        }

        let searches = resolve_searches(&mut reader, &mut diagnostics);
        let report = match reader.take("report") {
            Some(value) => resolve_report(
                value,
                &reader.field_path("report"),
                &self.constants,
                &mut diagnostics,
            ),
            None => {
                diagnostics.push(
                    reader.field_path("report"),
                    IssueKind::MissingRequiredField,
                    "report is required",
                );
                None
            },
        };
        reader.finish(&mut diagnostics);

        let config = searches.zip(report).map(|(searches, report)| CanonicalConfig {
            id: identity.clone(),
            description,
            schedule,
            dataset,
            doc_markdown,
            tags,
            owners,
            searches,
            report,
        });
        diagnostics.finish(config)
    }

    fn tags(
        &self,
        reader: &mut FieldReader<'_>,
        dataset: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> = reader
            .text_list("tags", diagnostics)
            .unwrap_or_default()
            .into_iter()
            .collect();
        tags.extend(self.constants.system_tags.iter().cloned());
        if let Some(dataset) = dataset {
            tags.insert(dataset.to_owned());
        }
        tags
    }
}

/// Legacy documents wrap everything in a single `dag` key.
fn unwrap_envelope(raw: &Value) -> &Value {
    match raw.as_object() {
        Some(fields) if fields.len() == 1 => match fields.get(ENVELOPE_KEY) {
            Some(inner @ Value::Object(_)) => inner,
            _ => raw,
        },
        _ => raw,
    }
}

fn identity_mismatch(declared: Option<&Value>, identity: &DocumentId) -> Option<ValidationReport> {
    let declared = match declared? {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        other => {
            return Some(ValidationReport::single(
                FieldPath::root().key("id"),
                IssueKind::IdentityMismatch,
                format!("id must be the string \"{identity}\", found {}", describe(other)),
            ));
        },
    };
    (declared != identity.as_str()).then(|| {
        ValidationReport::single(
            FieldPath::root().key("id"),
            IssueKind::IdentityMismatch,
            format!("id {declared:?} does not match the document identity \"{identity}\""),
        )
    })
}

fn resolve_searches(
    reader: &mut FieldReader<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<SearchConfig>> {
    let path = reader.field_path("search");
    let no_search = |diagnostics: &mut Diagnostics, path: FieldPath| -> Option<Vec<SearchConfig>> {
        diagnostics.push(
            path,
            IssueKind::NoSearchDefined,
            "at least one search block is required",
        );
        None
    };

    match reader.take("search") {
        None => no_search(diagnostics, path),
        Some(Value::Array(blocks)) if blocks.is_empty() => no_search(diagnostics, path),
        Some(Value::Array(blocks)) => {
            let resolved: Vec<(Option<SearchConfig>, Diagnostics)> = blocks
                .par_iter()
                .enumerate()
                .map(|(index, block)| {
                    let mut block_diagnostics = Diagnostics::new();
                    let search = resolve_search(block, &path.index(index), &mut block_diagnostics);
                    (search, block_diagnostics)
                })
                .collect();

            let mut searches = Vec::with_capacity(resolved.len());
            for (search, block_diagnostics) in resolved {
                diagnostics.absorb(block_diagnostics);
                searches.push(search);
            }
            searches.into_iter().collect()
        },
        Some(block @ Value::Object(_)) => {
            resolve_search(block, &path, diagnostics).map(|search| vec![search])
        },
        Some(other) => {
            diagnostics.push(
                path,
                IssueKind::SchemaError,
                format!(
                    "search must be a mapping or a list of mappings, found {}",
                    describe(other)
                ),
            );
            None
        },
    }
}
