//! Search block: one independent term/scope/matching definition.

use crate::issues::{Diagnostics, FieldPath, IssueKind};
use crate::reader::{FieldReader, describe};
use crate::terms::{SearchTerms, resolve_terms};
use gazette_digest_domain::{
    DataSource, GazetteSection, MatchField, TimeWindow, Vocabulary, normalize,
};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

/// Fully resolved search block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Literal or derived terms.
    pub terms: SearchTerms,
    /// Heading shown above this block's results.
    pub header: Option<String>,
    /// Sources to search, deduplicated in first-seen order.
    pub sources: Vec<DataSource>,
    /// Pass-through query text for downstream use.
    pub sql_override: Option<String>,
    /// Pass-through connection id for downstream use.
    pub connection_id: Option<String>,
    /// Territory codes for the secondary source.
    pub territory_id: Option<Vec<u64>>,
    /// Gazette sections, deduplicated in first-seen order.
    pub gazette_sections: Vec<GazetteSection>,
    /// Publication window searched on each run.
    pub date_window: TimeWindow,
    /// Part of the publication the terms are matched against.
    pub match_field: MatchField,
    /// Match the exact phrase.
    pub is_exact_search: bool,
    /// Drop matches that only hit the signature of a publication.
    pub ignore_signature_match: bool,
    /// Re-check matches against the term list before reporting.
    pub force_rematch: bool,
    /// Include the full publication text in the report.
    pub use_full_text: bool,
    /// Include the publication summary in the report.
    pub use_summary: bool,
    /// Issuing departments to keep; `None` keeps all.
    pub department: Option<Vec<String>>,
}

/// Resolve one raw search block found at `path`.
///
/// Returns `None` when any issue was recorded for the block; every field is
/// still checked so the report lists all of them.
pub fn resolve_search(
    raw: &Value,
    path: &FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<SearchConfig> {
    let before = diagnostics.issue_count();
    let mut reader = FieldReader::open(raw, path.clone(), diagnostics)?;

    let terms = resolve_terms(reader.take("terms"), &reader.field_path("terms"), diagnostics);
    let header = reader.trimmed_text("header", diagnostics);
    let sources = vocabulary_list(&mut reader, "sources", DataSource::Primary, diagnostics);
    let sql_override = reader.text("sql", diagnostics);
    let connection_id = reader.text("conn_id", diagnostics);
    let territory_id = territory_ids(&mut reader, diagnostics);
    let gazette_sections =
        vocabulary_list(&mut reader, "dou_sections", GazetteSection::All, diagnostics);

    let date_raw = reader.take_aliased("date", "search_date", diagnostics);
    let date_window: TimeWindow = vocabulary_value(date_raw, reader.field_path("date"), diagnostics);
    let field_raw = reader.take("field");
    let match_field: MatchField = vocabulary_value(field_raw, reader.field_path("field"), diagnostics);

    let is_exact_search = reader.flag("is_exact_search", true, diagnostics);
    let ignore_signature_match = reader.flag("ignore_signature_match", false, diagnostics);
    let force_rematch = reader.flag("force_rematch", false, diagnostics);
    let use_full_text = reader.flag("full_text", false, diagnostics);
    let use_summary = reader.flag("use_summary", false, diagnostics);
    let department = reader
        .text_list("department", diagnostics)
        .filter(|departments| !departments.is_empty());
    reader.finish(diagnostics);

    if diagnostics.issue_count() != before {
        return None;
    }

    Some(SearchConfig {
        terms: terms?,
        header,
        sources: sources?,
        sql_override,
        connection_id,
        territory_id,
        gazette_sections: gazette_sections?,
        date_window,
        match_field,
        is_exact_search,
        ignore_signature_match,
        force_rematch,
        use_full_text,
        use_summary,
        department,
    })
}

/// Scalar vocabulary field; absent or unrecognized yields the default.
fn vocabulary_value<V: Vocabulary + Default>(
    raw: Option<&Value>,
    path: FieldPath,
    diagnostics: &mut Diagnostics,
) -> V {
    raw.and_then(|value| vocabulary_item(value, path, diagnostics))
        .unwrap_or_default()
}

fn vocabulary_item<V: Vocabulary>(
    value: &Value,
    path: FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<V> {
    let raw = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => {
            diagnostics.push(
                path,
                IssueKind::SchemaError,
                format!(
                    "expected a {} keyword, found {}",
                    V::CATEGORY,
                    describe(other)
                ),
            );
            return None;
        },
    };
    match normalize::<V>(&raw) {
        Ok(variant) => Some(variant),
        Err(error) => {
            diagnostics.vocabulary(path, error);
            None
        },
    }
}

/// Vocabulary list: absent yields `[default]`, present must be non-empty.
/// Duplicates collapse, keeping the first occurrence.
fn vocabulary_list<V: Vocabulary>(
    reader: &mut FieldReader<'_>,
    key: &'static str,
    default: V,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<V>> {
    let path = reader.field_path(key);
    let Some(value) = reader.take(key) else {
        return Some(vec![default]);
    };

    let items: Vec<(FieldPath, &Value)> = match value {
        Value::Array(items) if items.is_empty() => {
            diagnostics.push(
                path,
                IssueKind::SchemaError,
                format!("{key} must list at least one value; omit it to use the default"),
            );
            return None;
        },
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (path.index(index), item))
            .collect(),
        scalar => vec![(path, scalar)],
    };

    let mut resolved: Vec<V> = Vec::with_capacity(items.len());
    let mut failed = false;
    for (item_path, item) in items {
        match vocabulary_item::<V>(item, item_path, diagnostics) {
            Some(variant) if !resolved.contains(&variant) => resolved.push(variant),
            Some(_) => {},
            None => failed = true,
        }
    }

    (!failed).then_some(resolved)
}

/// `territory_id`: one code or a list of codes, as integers or digit strings.
fn territory_ids(reader: &mut FieldReader<'_>, diagnostics: &mut Diagnostics) -> Option<Vec<u64>> {
    let path = reader.field_path("territory_id");
    let value = reader.take("territory_id")?;

    let codes: Vec<Option<u64>> = match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| territory_code(item, path.index(index), diagnostics))
            .collect(),
        scalar => vec![territory_code(scalar, path, diagnostics)],
    };

    codes
        .into_iter()
        .collect::<Option<Vec<u64>>>()
        .filter(|codes| !codes.is_empty())
}

fn territory_code(value: &Value, path: FieldPath, diagnostics: &mut Diagnostics) -> Option<u64> {
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        diagnostics.push(
            path,
            IssueKind::SchemaError,
            format!(
                "territory_id must be a non-negative integer code, found {}",
                describe(value)
            ),
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::ResolveError;
    use serde_json::json;
    use std::error::Error;

    fn block_path() -> FieldPath {
        FieldPath::root().key("search").index(0)
    }

    fn resolve(raw: &Value) -> Result<SearchConfig, ResolveError> {
        let mut diagnostics = Diagnostics::new();
        let search = resolve_search(raw, &block_path(), &mut diagnostics);
        diagnostics.finish(search)
    }

    fn issues(raw: &Value) -> Vec<(String, IssueKind)> {
        resolve(raw)
            .err()
            .and_then(|error| error.report().cloned())
            .map(|report| {
                report
                    .into_iter()
                    .map(|issue| (issue.field_path.to_string(), issue.kind))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn minimal_block_gets_every_default() -> Result<(), Box<dyn Error>> {
        let search = resolve(&json!({"terms": ["dados abertos"]}))?;
        assert_eq!(search.sources, vec![DataSource::Primary]);
        assert_eq!(search.gazette_sections, vec![GazetteSection::All]);
        assert_eq!(search.date_window, TimeWindow::Day);
        assert_eq!(search.match_field, MatchField::Full);
        assert!(search.is_exact_search);
        assert!(!search.ignore_signature_match);
        assert!(!search.force_rematch);
        assert!(!search.use_full_text);
        assert!(!search.use_summary);
        assert_eq!(search.header, None);
        assert_eq!(search.sql_override, None);
        assert_eq!(search.territory_id, None);
        assert_eq!(search.department, None);
        Ok(())
    }

    #[test]
    fn explicit_nulls_match_absent_fields() -> Result<(), Box<dyn Error>> {
        let with_nulls = resolve(&json!({
            "terms": ["dados abertos"],
            "header": null,
            "sources": null,
            "dou_sections": null,
            "date": null,
            "field": null,
            "is_exact_search": null,
            "department": null,
            "territory_id": null
        }))?;
        assert_eq!(with_nulls, resolve(&json!({"terms": ["dados abertos"]}))?);
        Ok(())
    }

    #[test]
    fn date_and_its_alias_feed_the_same_window() -> Result<(), Box<dyn Error>> {
        let date = resolve(&json!({"terms": ["x"], "date": "MES"}))?;
        let alias = resolve(&json!({"terms": ["x"], "search_date": "MES"}))?;
        assert_eq!(date.date_window, TimeWindow::Month);
        assert_eq!(alias.date_window, TimeWindow::Month);

        assert_eq!(
            issues(&json!({"terms": ["x"], "date": "MES", "search_date": "DIA"})),
            vec![("search[0].date".to_owned(), IssueKind::ConflictingAlias)]
        );
        Ok(())
    }

    #[test]
    fn lists_dedupe_in_first_seen_order() -> Result<(), Box<dyn Error>> {
        let search = resolve(&json!({
            "terms": ["x"],
            "sources": ["QD", "DOU", "qd"],
            "dou_sections": ["SECAO_1", "EDICAO_SUPLEMENTAR", "Seção 1"]
        }))?;
        assert_eq!(search.sources, vec![DataSource::Secondary, DataSource::Primary]);
        assert_eq!(
            search.gazette_sections,
            vec![GazetteSection::Section1, GazetteSection::SupplementaryEdition]
        );
        Ok(())
    }

    #[test]
    fn empty_vocabulary_lists_are_rejected() {
        assert_eq!(
            issues(&json!({"terms": ["x"], "sources": []})),
            vec![("search[0].sources".to_owned(), IssueKind::SchemaError)]
        );
    }

    #[test]
    fn unknown_enum_values_carry_element_paths() {
        assert_eq!(
            issues(&json!({
                "terms": ["x"],
                "sources": ["DOU", "TV"],
                "field": "RODAPE",
                "date": "QUINZENA"
            })),
            vec![
                ("search[0].sources[1]".to_owned(), IssueKind::UnknownEnumValue),
                ("search[0].date".to_owned(), IssueKind::UnknownEnumValue),
                ("search[0].field".to_owned(), IssueKind::UnknownEnumValue),
            ]
        );
    }

    #[test]
    fn territory_ids_normalize_to_a_list() -> Result<(), Box<dyn Error>> {
        let single = resolve(&json!({"terms": ["x"], "sources": ["QD"], "territory_id": 3300100}))?;
        assert_eq!(single.territory_id, Some(vec![3_300_100]));

        let many = resolve(&json!({
            "terms": ["x"],
            "territory_id": [3300100, "3300159", 3300209]
        }))?;
        assert_eq!(many.territory_id, Some(vec![3_300_100, 3_300_159, 3_300_209]));

        assert_eq!(
            issues(&json!({"terms": ["x"], "territory_id": [1, "rio"]})),
            vec![("search[0].territory_id[1]".to_owned(), IssueKind::SchemaError)]
        );
        Ok(())
    }

    #[test]
    fn every_problem_in_a_block_is_reported() {
        assert_eq!(
            issues(&json!({
                "dou_sections": ["SECAO_9"],
                "full_text": "sometimes",
                "colour": "blue"
            })),
            vec![
                ("search[0].terms".to_owned(), IssueKind::MissingRequiredField),
                ("search[0].dou_sections[0]".to_owned(), IssueKind::UnknownEnumValue),
                ("search[0].full_text".to_owned(), IssueKind::SchemaError),
                ("search[0].colour".to_owned(), IssueKind::UnknownField),
            ]
        );
    }

    #[test]
    fn department_filter_keeps_order_and_drops_empty_lists() -> Result<(), Box<dyn Error>> {
        let search = resolve(&json!({
            "terms": ["x"],
            "department": ["Ministério da Defesa", "Ministério da Saúde"]
        }))?;
        assert_eq!(
            search.department,
            Some(vec!["Ministério da Defesa".to_owned(), "Ministério da Saúde".to_owned()])
        );

        let empty = resolve(&json!({"terms": ["x"], "department": []}))?;
        assert_eq!(empty.department, None);
        Ok(())
    }
}
