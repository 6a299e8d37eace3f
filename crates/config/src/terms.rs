//! Search terms: a literal list, or a description of where to fetch them.
//!
//! Only the shape is validated here. Running the storage query or reading
//! the external variable happens later, in the job that consumes the config.

use crate::issues::{Diagnostics, FieldPath, IssueKind};
use crate::reader::{FieldReader, describe, non_blank_text};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

const VARIABLE_KEY: &str = "from_airflow_variable";
const VARIABLE_ALIAS: &str = "from_variable";
const STORAGE_QUERY_KEY: &str = "from_db_select";

/// Terms of one search block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum SearchTerms {
    /// Terms written out in the document, in document order.
    Literal(Vec<String>),
    /// Terms produced at run time.
    Derived(DerivedTerms),
}

impl SearchTerms {
    /// Literal terms, if any.
    #[must_use]
    pub fn literal(&self) -> Option<&[String]> {
        match self {
            Self::Literal(terms) => Some(terms),
            Self::Derived(_) => None,
        }
    }
}

/// Where derived terms come from. Exactly one strategy is ever set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DerivedTerms {
    /// Read a named variable from the scheduler's variable store.
    FromExternalVariable {
        /// Variable name.
        name: String,
    },
    /// Run a query against a named storage connection.
    #[serde(rename_all = "camelCase")]
    FromStorageQuery {
        /// Query returning one term per row.
        sql: String,
        /// Connection identifier.
        connection_id: String,
    },
}

/// Resolve the `terms` value of a search block (absent or null included).
pub fn resolve_terms(
    raw: Option<&Value>,
    path: &FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<SearchTerms> {
    match raw {
        None => {
            diagnostics.push(
                path.clone(),
                IssueKind::MissingRequiredField,
                "terms is required: list them or describe how to derive them",
            );
            None
        },
        Some(Value::Array(items)) => resolve_literal_terms(items, path, diagnostics),
        Some(value @ Value::Object(_)) => {
            resolve_derived_terms(value, path, diagnostics).map(SearchTerms::Derived)
        },
        Some(other) => {
            diagnostics.push(
                path.clone(),
                IssueKind::SchemaError,
                format!(
                    "terms must be a list or a derivation mapping, found {}",
                    describe(other)
                ),
            );
            None
        },
    }
}

fn resolve_literal_terms(
    items: &[Value],
    path: &FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<SearchTerms> {
    if items.is_empty() {
        diagnostics.push(
            path.clone(),
            IssueKind::SchemaError,
            "terms must list at least one term",
        );
        return None;
    }

    let has_literals = items
        .iter()
        .any(|item| !matches!(item, Value::Object(fields) if is_derivation_mapping(fields)));
    let nested_strategy = if has_literals {
        "terms mixes literal entries with a derivation strategy; use one or the other"
    } else {
        "a derivation strategy replaces the terms list; write it as the terms mapping, not inside a list"
    };

    let before = diagnostics.issue_count();
    let mut terms = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = path.index(index);
        match item {
            Value::Number(number) => terms.push(number.to_string()),
            Value::Object(fields) if is_derivation_mapping(fields) => diagnostics.push(
                item_path,
                IssueKind::AmbiguousDerivationStrategy,
                nested_strategy,
            ),
            _ => {
                if let Some(term) = non_blank_text(item, item_path, diagnostics) {
                    terms.push(term);
                }
            },
        }
    }

    (diagnostics.issue_count() == before).then_some(SearchTerms::Literal(terms))
}

fn is_derivation_mapping(fields: &serde_json::Map<String, Value>) -> bool {
    [VARIABLE_KEY, VARIABLE_ALIAS, STORAGE_QUERY_KEY]
        .iter()
        .any(|key| fields.contains_key(*key))
}

/// Resolve a derivation mapping into exactly one strategy.
pub fn resolve_derived_terms(
    raw: &Value,
    path: &FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<DerivedTerms> {
    let mut reader = FieldReader::open(raw, path.clone(), diagnostics)?;
    let before = diagnostics.issue_count();

    let variable = reader.take_aliased(VARIABLE_KEY, VARIABLE_ALIAS, diagnostics);
    let storage_query = reader.take(STORAGE_QUERY_KEY);
    reader.finish(diagnostics);

    let derived = match (variable, storage_query) {
        (None, None) => {
            diagnostics.push(
                path.clone(),
                IssueKind::MissingDerivationStrategy,
                format!("derived terms need one of {VARIABLE_KEY} or {STORAGE_QUERY_KEY}"),
            );
            None
        },
        (Some(_), Some(_)) => {
            diagnostics.push(
                path.clone(),
                IssueKind::AmbiguousDerivationStrategy,
                format!("set only one of {VARIABLE_KEY} or {STORAGE_QUERY_KEY}"),
            );
            None
        },
        (Some(name), None) => non_blank_text(name, path.key(VARIABLE_KEY), diagnostics)
            .map(|name| DerivedTerms::FromExternalVariable { name }),
        (None, Some(query)) => resolve_storage_query(query, &path.key(STORAGE_QUERY_KEY), diagnostics),
    };

    derived.filter(|_| diagnostics.issue_count() == before)
}

fn resolve_storage_query(
    raw: &Value,
    path: &FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<DerivedTerms> {
    let mut reader = FieldReader::open(raw, path.clone(), diagnostics)?;
    let sql = required_part(&mut reader, "sql", diagnostics);
    let conn_id = required_part(&mut reader, "conn_id", diagnostics);
    reader.finish(diagnostics);

    Some(DerivedTerms::FromStorageQuery {
        sql: sql?,
        connection_id: conn_id?,
    })
}

fn required_part(
    reader: &mut FieldReader<'_>,
    key: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let path = reader.field_path(key);
    let Some(value) = reader.take(key) else {
        diagnostics.push(
            path,
            IssueKind::IncompleteDerivationSpec,
            format!("{STORAGE_QUERY_KEY} requires {key}"),
        );
        return None;
    };
    non_blank_text(value, path, diagnostics)
}
