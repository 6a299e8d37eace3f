//! Key-tracking reader over one mapping of the untyped document tree.
//!
//! Every block resolver opens a [`FieldReader`] on its mapping, takes the
//! keys it understands, and calls [`FieldReader::finish`] to report whatever
//! was left over. Explicit `null` is treated exactly like an absent key.

use crate::issues::{Diagnostics, FieldPath, IssueKind};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Reader over one mapping that remembers which keys were consumed.
#[derive(Debug)]
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    path: FieldPath,
    consumed: BTreeSet<&'static str>,
}

impl<'a> FieldReader<'a> {
    /// Open `value` as a mapping, recording a `SchemaError` when it is not one.
    pub fn open(value: &'a Value, path: FieldPath, diagnostics: &mut Diagnostics) -> Option<Self> {
        if let Some(fields) = value.as_object() {
            return Some(Self {
                fields,
                path,
                consumed: BTreeSet::new(),
            });
        }
        diagnostics.push(
            path,
            IssueKind::SchemaError,
            format!("expected a mapping, found {}", describe(value)),
        );
        None
    }

    /// Path of `key` inside the mapping.
    pub fn field_path(&self, key: &str) -> FieldPath {
        self.path.key(key)
    }

    /// Returns true when `key` holds a non-null value.
    pub fn is_set(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|value| !value.is_null())
    }

    /// Consume `key` and return its value unless it is absent or null.
    pub fn take(&mut self, key: &'static str) -> Option<&'a Value> {
        self.consumed.insert(key);
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Consume a key that has a second accepted spelling.
    ///
    /// Both spellings set is a `ConflictingAlias` reported on `canonical`;
    /// the canonical value is still returned so later checks do not cascade.
    pub fn take_aliased(
        &mut self,
        canonical: &'static str,
        alias: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'a Value> {
        let primary = self.take(canonical);
        let secondary = self.take(alias);
        if primary.is_some() && secondary.is_some() {
            diagnostics.push(
                self.field_path(canonical),
                IssueKind::ConflictingAlias,
                format!("{canonical} and {alias} name the same setting; keep only {canonical}"),
            );
        }
        primary.or(secondary)
    }

    /// Optional string, kept verbatim.
    pub fn text(&mut self, key: &'static str, diagnostics: &mut Diagnostics) -> Option<String> {
        let value = self.take(key)?;
        expect_text(value, self.field_path(key), diagnostics)
    }

    /// Optional string, trimmed; blank counts as absent.
    pub fn trimmed_text(
        &mut self,
        key: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        self.text(key, diagnostics)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }

    /// Required non-blank string.
    pub fn required_text(
        &mut self,
        key: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let path = self.field_path(key);
        let Some(value) = self.take(key) else {
            diagnostics.push(
                path,
                IssueKind::MissingRequiredField,
                format!("{key} is required"),
            );
            return None;
        };
        let text = expect_text(value, path.clone(), diagnostics)?;
        if text.trim().is_empty() {
            diagnostics.push(path, IssueKind::SchemaError, format!("{key} must not be blank"));
            return None;
        }
        Some(text)
    }

    /// Boolean with a default for absent/null.
    ///
    /// Besides YAML booleans, the strings `true/false`, `yes/no`, `on/off`
    /// and `1/0` are accepted.
    pub fn flag(&mut self, key: &'static str, default: bool, diagnostics: &mut Diagnostics) -> bool {
        let Some(value) = self.take(key) else {
            return default;
        };
        let parsed = match value {
            Value::Bool(flag) => Some(*flag),
            Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            diagnostics.push(
                self.field_path(key),
                IssueKind::SchemaError,
                format!("{key} must be a boolean, found {}", describe(value)),
            );
            default
        })
    }

    /// Optional list of non-blank strings; a single string is a one-element list.
    pub fn text_list(
        &mut self,
        key: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<String>> {
        let value = self.take(key)?;
        let path = self.field_path(key);
        match value {
            Value::String(_) => {
                non_blank_text(value, path, diagnostics).map(|text| vec![text])
            },
            Value::Array(items) => {
                let before = diagnostics.issue_count();
                let texts: Vec<String> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        non_blank_text(item, path.index(index), diagnostics)
                    })
                    .collect();
                (diagnostics.issue_count() == before).then_some(texts)
            },
            other => {
                diagnostics.push(
                    path,
                    IssueKind::SchemaError,
                    format!("{key} must be a list of strings, found {}", describe(other)),
                );
                None
            },
        }
    }

    /// Report every key nobody consumed, in document order.
    pub fn finish(self, diagnostics: &mut Diagnostics) {
        for key in self.fields.keys() {
            if !self.consumed.contains(key.as_str()) {
                diagnostics.push(
                    self.path.key(key),
                    IssueKind::UnknownField,
                    format!("unknown field {key:?}"),
                );
            }
        }
    }
}

/// Short description of a value's type for messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// String value or `SchemaError`.
pub fn expect_text(value: &Value, path: FieldPath, diagnostics: &mut Diagnostics) -> Option<String> {
    if let Value::String(text) = value {
        return Some(text.clone());
    }
    diagnostics.push(
        path,
        IssueKind::SchemaError,
        format!("expected a string, found {}", describe(value)),
    );
    None
}

/// Trimmed non-blank string or `SchemaError`.
pub fn non_blank_text(
    value: &Value,
    path: FieldPath,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let text = expect_text(value, path.clone(), diagnostics)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        diagnostics.push(path, IssueKind::SchemaError, "value must not be blank");
        return None;
    }
    Some(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error;

    #[test]
    fn null_is_absent_and_leftovers_are_unknown() -> Result<(), Box<dyn Error>> {
        let value = json!({"header": null, "subject": "Teste", "colour": "blue"});
        let mut diagnostics = Diagnostics::new();
        let mut reader = FieldReader::open(&value, FieldPath::root().key("report"), &mut diagnostics)
            .ok_or("mapping should open")?;

        assert_eq!(reader.take("header"), None);
        assert_eq!(reader.required_text("subject", &mut diagnostics).as_deref(), Some("Teste"));
        reader.finish(&mut diagnostics);

        let report = diagnostics.finish(Some(())).err().and_then(|error| error.report().cloned());
        let issues = report.map(|report| report.issues().to_vec()).unwrap_or_default();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnknownField);
        assert_eq!(issues[0].field_path.to_string(), "report.colour");
        Ok(())
    }

    #[test]
    fn aliases_conflict_only_when_both_are_set() {
        let both = json!({"date": "MES", "search_date": "DIA"});
        let mut diagnostics = Diagnostics::new();
        let mut reader = FieldReader::open(&both, FieldPath::root(), &mut diagnostics);
        let taken = reader
            .as_mut()
            .and_then(|reader| reader.take_aliased("date", "search_date", &mut diagnostics));
        assert_eq!(taken, Some(&json!("MES")));
        assert_eq!(diagnostics.issue_count(), 1);

        let alias_only = json!({"date": null, "search_date": "DIA"});
        let mut diagnostics = Diagnostics::new();
        let mut reader = FieldReader::open(&alias_only, FieldPath::root(), &mut diagnostics);
        let taken = reader
            .as_mut()
            .and_then(|reader| reader.take_aliased("date", "search_date", &mut diagnostics));
        assert_eq!(taken, Some(&json!("DIA")));
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn flags_accept_yaml_style_strings() -> Result<(), Box<dyn Error>> {
        let value = json!({"attach_csv": "yes", "hide_filters": 3});
        let mut diagnostics = Diagnostics::new();
        let mut reader = FieldReader::open(&value, FieldPath::root(), &mut diagnostics)
            .ok_or("mapping should open")?;
        assert!(reader.flag("attach_csv", false, &mut diagnostics));
        assert!(!reader.flag("hide_filters", false, &mut diagnostics));
        assert!(reader.flag("skip_null", true, &mut diagnostics));
        assert_eq!(diagnostics.issue_count(), 1);
        Ok(())
    }

    #[test]
    fn text_lists_accept_scalars_and_index_bad_elements() -> Result<(), Box<dyn Error>> {
        let value = json!({"emails": "a@b.gov", "owner": ["ana", " ", 4]});
        let mut diagnostics = Diagnostics::new();
        let mut reader = FieldReader::open(&value, FieldPath::root(), &mut diagnostics)
            .ok_or("mapping should open")?;
        assert_eq!(
            reader.text_list("emails", &mut diagnostics),
            Some(vec!["a@b.gov".to_owned()])
        );
        assert_eq!(reader.text_list("owner", &mut diagnostics), None);

        let report = diagnostics.finish(Some(())).err().and_then(|error| error.report().cloned());
        let paths: Vec<String> = report
            .map(|report| report.issues().iter().map(|issue| issue.field_path.to_string()).collect())
            .unwrap_or_default();
        assert_eq!(paths, vec!["owner[1]".to_owned(), "owner[2]".to_owned()]);
        Ok(())
    }
}
