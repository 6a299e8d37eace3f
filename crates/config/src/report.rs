//! Report block: delivery settings shared by every search of a document.

use crate::constants::ResolverConstants;
use crate::issues::{Diagnostics, FieldPath, IssueKind};
use crate::reader::FieldReader;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Fully resolved report settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    /// Recipients, in document order.
    pub emails: Vec<String>,
    /// Email subject.
    pub subject: String,
    /// Attach results as CSV.
    pub attach_csv: bool,
    /// Discord webhook to notify.
    pub discord_webhook: Option<String>,
    /// Slack webhook to notify.
    pub slack_webhook: Option<String>,
    /// Skip delivery when nothing matched.
    pub skip_null_results: bool,
    /// Leave the search filters out of the report.
    pub hide_filters: bool,
    /// HTML shown before the results.
    pub header_text: Option<String>,
    /// HTML shown after the results.
    pub footer_text: Option<String>,
    /// Text sent when nothing matched and `skip_null_results` is off.
    pub no_results_text: String,
}

/// Resolve the raw `report` mapping found at `path`.
pub fn resolve_report(
    raw: &Value,
    path: &FieldPath,
    constants: &ResolverConstants,
    diagnostics: &mut Diagnostics,
) -> Option<ReportConfig> {
    let before = diagnostics.issue_count();
    let mut reader = FieldReader::open(raw, path.clone(), diagnostics)?;

    let emails = emails(&mut reader, diagnostics);
    let subject = reader.required_text("subject", diagnostics);
    let attach_csv = reader.flag("attach_csv", false, diagnostics);
    let discord_webhook = webhook(&mut reader, "discord_webhook", diagnostics);
    let slack_webhook = webhook(&mut reader, "slack_webhook", diagnostics);
    let skip_null_results = reader.flag("skip_null", true, diagnostics);
    let hide_filters = reader.flag("hide_filters", false, diagnostics);
    let header_text = reader.trimmed_text("header_text", diagnostics);
    let footer_text = reader.trimmed_text("footer_text", diagnostics);
    let no_results_text = reader
        .trimmed_text("no_results_found_text", diagnostics)
        .unwrap_or_else(|| constants.no_results_text.clone());
    reader.finish(diagnostics);

    if diagnostics.issue_count() != before {
        return None;
    }

    Some(ReportConfig {
        emails: emails?,
        subject: subject?,
        attach_csv,
        discord_webhook,
        slack_webhook,
        skip_null_results,
        hide_filters,
        header_text,
        footer_text,
        no_results_text,
    })
}

fn emails(reader: &mut FieldReader<'_>, diagnostics: &mut Diagnostics) -> Option<Vec<String>> {
    let path = reader.field_path("emails");
    let emails = reader.text_list("emails", diagnostics);
    if !reader.is_set("emails") {
        diagnostics.push(
            path,
            IssueKind::MissingRequiredField,
            "emails is required: list at least one recipient",
        );
        return None;
    }
    let emails = emails?;
    if emails.is_empty() {
        diagnostics.push(
            path,
            IssueKind::SchemaError,
            "emails must list at least one recipient",
        );
        return None;
    }
    Some(emails)
}

fn webhook(
    reader: &mut FieldReader<'_>,
    key: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let path = reader.field_path(key);
    let url = reader.trimmed_text(key, diagnostics)?;
    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(url),
        _ => {
            diagnostics.push(
                path,
                IssueKind::SchemaError,
                format!("{key} must be an http(s) URL, found {url:?}"),
            );
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::ResolveError;
    use serde_json::json;
    use std::error::Error;

    fn resolve(raw: &Value) -> Result<ReportConfig, ResolveError> {
        let mut diagnostics = Diagnostics::new();
        let report = resolve_report(
            raw,
            &FieldPath::root().key("report"),
            &ResolverConstants::default(),
            &mut diagnostics,
        );
        diagnostics.finish(report)
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
    fn defaults_fill_optional_settings() -> Result<(), Box<dyn Error>> {
        let report = resolve(&json!({
            "emails": ["destination@economia.gov.br"],
            "subject": "Teste do Ro-dou"
        }))?;
        assert!(!report.attach_csv);
        assert!(report.skip_null_results);
        assert!(!report.hide_filters);
        assert_eq!(report.discord_webhook, None);
        assert_eq!(report.header_text, None);
        assert_eq!(
            report.no_results_text,
            "Nenhum dos termos pesquisados foi encontrado nesta consulta"
        );
        Ok(())
    }

    #[test]
    fn custom_texts_override_defaults() -> Result<(), Box<dyn Error>> {
        let report = resolve(&json!({
            "emails": ["destination@economia.gov.br"],
            "subject": "Teste do Ro-dou",
            "header_text": "<p><strong>Greetings<strong></p>",
            "footer_text": "<p>Best Regards</p>",
            "no_results_found_text": "No results found",
            "skip_null": false
        }))?;
        assert_eq!(report.header_text.as_deref(), Some("<p><strong>Greetings<strong></p>"));
        assert_eq!(report.footer_text.as_deref(), Some("<p>Best Regards</p>"));
        assert_eq!(report.no_results_text, "No results found");
        assert!(!report.skip_null_results);
        Ok(())
    }

    #[test]
    fn required_fields_are_reported_together() {
        assert_eq!(
            issues(&json!({"attach_csv": true})),
            vec![
                ("report.emails".to_owned(), IssueKind::MissingRequiredField),
                ("report.subject".to_owned(), IssueKind::MissingRequiredField),
            ]
        );
        assert_eq!(
            issues(&json!({"emails": [], "subject": " "})),
            vec![
                ("report.emails".to_owned(), IssueKind::SchemaError),
                ("report.subject".to_owned(), IssueKind::SchemaError),
            ]
        );
    }

    #[test]
    fn webhooks_must_be_http_urls() -> Result<(), Box<dyn Error>> {
        let report = resolve(&json!({
            "emails": ["a@b.gov.br"],
            "subject": "s",
            "slack_webhook": "https://hooks.slack.com/services/T000/B000/XXXX"
        }))?;
        assert!(report.slack_webhook.is_some());

        assert_eq!(
            issues(&json!({
                "emails": ["a@b.gov.br"],
                "subject": "s",
                "discord_webhook": "ftp://discord.example/hook",
                "slack_webhook": "not a url"
            })),
            vec![
                ("report.discord_webhook".to_owned(), IssueKind::SchemaError),
                ("report.slack_webhook".to_owned(), IssueKind::SchemaError),
            ]
        );
        Ok(())
    }
}
