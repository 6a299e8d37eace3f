//! Enumeration Registry: closed vocabularies for keyword-backed fields.
//!
//! Every vocabulary is a static table of `(spelling, variant)` pairs. User
//! input is folded (accents stripped, uppercased, separators collapsed to
//! `_`) before lookup, so `"Seção 1"`, `"secao-1"` and `"SECAO_1"` all land
//! on the same entry. Tables carry both the canonical English keyword and
//! the historical Portuguese spelling used by older documents.

use gazette_digest_shared::{ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Vocabulary category, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyCategory {
    /// Publication date window searched on each run.
    TimeWindow,
    /// Gazette section filter.
    GazetteSection,
    /// Document field the terms are matched against.
    MatchField,
    /// Upstream publication source.
    DataSource,
}

impl VocabularyCategory {
    /// Returns the category label used in issue messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeWindow => "time-window",
            Self::GazetteSection => "gazette-section",
            Self::MatchField => "match-field",
            Self::DataSource => "data-source",
        }
    }
}

impl fmt::Display for VocabularyCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Lookup failures for closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    /// The input does not match any spelling of the category.
    UnknownValue {
        /// Vocabulary that was consulted.
        category: VocabularyCategory,
        /// Raw user input.
        raw: String,
    },
    /// The static table itself is inconsistent (a bug, never user input).
    TableDefect {
        /// Vocabulary whose table is broken.
        category: VocabularyCategory,
        /// Spelling or keyword that exposed the defect.
        entry: &'static str,
        /// What is wrong with the entry.
        reason: &'static str,
    },
}

impl VocabularyError {
    /// Returns true when the error is an internal table defect.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::TableDefect { .. })
    }

    /// Allowed canonical keywords for the failing category.
    #[must_use]
    pub fn allowed_keywords(&self) -> &'static [&'static str] {
        let category = match self {
            Self::UnknownValue { category, .. } | Self::TableDefect { category, .. } => *category,
        };
        match category {
            VocabularyCategory::TimeWindow => TimeWindow::KEYWORDS,
            VocabularyCategory::GazetteSection => GazetteSection::KEYWORDS,
            VocabularyCategory::MatchField => MatchField::KEYWORDS,
            VocabularyCategory::DataSource => DataSource::KEYWORDS,
        }
    }
}

impl fmt::Display for VocabularyError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { category, raw } => write!(
                formatter,
                "unknown {category} value {raw:?} (expected one of: {})",
                self.allowed_keywords().join(", ")
            ),
            Self::TableDefect {
                category,
                entry,
                reason,
            } => write!(
                formatter,
                "{category} vocabulary table is inconsistent at {entry:?}: {reason} (this is a bug)"
            ),
        }
    }
}

impl std::error::Error for VocabularyError {}

impl From<VocabularyError> for ErrorEnvelope {
    fn from(error: VocabularyError) -> Self {
        let message = error.to_string();
        match error {
            VocabularyError::UnknownValue { category, raw } => {
                Self::expected(ErrorCode::new("domain", "unknown_enum_value"), message)
                    .with_metadata("category", category.as_str())
                    .with_metadata("value", raw)
            },
            VocabularyError::TableDefect {
                category,
                entry,
                reason,
            } => Self::invariant(ErrorCode::new("domain", "vocabulary_table_defect"), message)
                .with_metadata("category", category.as_str())
                .with_metadata("entry", entry)
                .with_metadata("reason", reason),
        }
    }
}

/// A closed, table-driven vocabulary.
pub trait Vocabulary: Copy + Eq + fmt::Debug + 'static {
    /// Category used in diagnostics.
    const CATEGORY: VocabularyCategory;
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];
    /// Canonical keywords, parallel to `VARIANTS`.
    const KEYWORDS: &'static [&'static str];
    /// Accepted spellings (already folded) and the variant each maps to.
    const SPELLINGS: &'static [(&'static str, Self)];

    /// Canonical keyword emitted in resolved configs.
    fn keyword(self) -> &'static str;

    /// Normalize free text into a variant.
    fn parse(raw: &str) -> Result<Self, VocabularyError> {
        normalize(raw)
    }
}

/// Fold free text into the comparison form used by vocabulary tables.
///
/// Accents are stripped, letters uppercased, and any run of non-alphanumeric
/// characters becomes a single `_` (leading/trailing runs are dropped).
#[must_use]
pub fn fold_keyword(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.nfd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_separator && !folded.is_empty() {
                folded.push('_');
            }
            pending_separator = false;
            folded.extend(ch.to_uppercase());
        } else {
            pending_separator = true;
        }
    }
    folded
}

/// Normalize `raw` into a variant of `V`.
pub fn normalize<V: Vocabulary>(raw: &str) -> Result<V, VocabularyError> {
    let folded = fold_keyword(raw);
    let mut found: Option<V> = None;
    for (spelling, variant) in V::SPELLINGS {
        if *spelling != folded {
            continue;
        }
        match found {
            Some(existing) if existing != *variant => {
                return Err(VocabularyError::TableDefect {
                    category: V::CATEGORY,
                    entry: *spelling,
                    reason: "spelling maps to more than one variant",
                });
            },
            _ => found = Some(*variant),
        }
    }

    found.ok_or_else(|| VocabularyError::UnknownValue {
        category: V::CATEGORY,
        raw: raw.to_owned(),
    })
}

/// Check one vocabulary table for internal consistency.
pub fn verify_table<V: Vocabulary>() -> Result<(), VocabularyError> {
    let defect = |entry: &'static str, reason: &'static str| VocabularyError::TableDefect {
        category: V::CATEGORY,
        entry,
        reason,
    };

    if V::VARIANTS.len() != V::KEYWORDS.len() {
        return Err(defect(V::CATEGORY.as_str(), "variant and keyword lists differ in length"));
    }

    for (index, (spelling, variant)) in V::SPELLINGS.iter().enumerate() {
        if fold_keyword(spelling) != *spelling {
            return Err(defect(*spelling, "spelling is not in folded form"));
        }
        let clash = V::SPELLINGS
            .iter()
            .skip(index + 1)
            .any(|(other, other_variant)| other == spelling && other_variant != variant);
        if clash {
            return Err(defect(*spelling, "spelling maps to more than one variant"));
        }
    }

    for (variant, keyword) in V::VARIANTS.iter().zip(V::KEYWORDS) {
        if variant.keyword() != *keyword {
            return Err(defect(*keyword, "keyword table out of order"));
        }
        let registered = V::SPELLINGS
            .iter()
            .any(|(spelling, mapped)| spelling == keyword && mapped == variant);
        if !registered {
            return Err(defect(*keyword, "canonical keyword is not a registered spelling"));
        }
    }

    Ok(())
}

/// Check every vocabulary table.
pub fn verify_tables() -> Result<(), VocabularyError> {
    verify_table::<TimeWindow>()?;
    verify_table::<GazetteSection>()?;
    verify_table::<MatchField>()?;
    verify_table::<DataSource>()?;
    Ok(())
}

/// Publication date window searched on each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeWindow {
    /// Publications of the run date.
    #[default]
    Day,
    /// The last seven days.
    Week,
    /// The last month.
    Month,
    /// The last year.
    Year,
}

impl Vocabulary for TimeWindow {
    const CATEGORY: VocabularyCategory = VocabularyCategory::TimeWindow;
    const VARIANTS: &'static [Self] = &[Self::Day, Self::Week, Self::Month, Self::Year];
    const KEYWORDS: &'static [&'static str] = &["DAY", "WEEK", "MONTH", "YEAR"];
    const SPELLINGS: &'static [(&'static str, Self)] = &[
        ("DAY", Self::Day),
        ("DIA", Self::Day),
        ("WEEK", Self::Week),
        ("SEMANA", Self::Week),
        ("MONTH", Self::Month),
        ("MES", Self::Month),
        ("YEAR", Self::Year),
        ("ANO", Self::Year),
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }
}

/// Gazette section filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
pub enum GazetteSection {
    /// Every section.
    #[default]
    #[serde(rename = "ALL")]
    All,
    /// Section 1 (normative acts).
    #[serde(rename = "SECTION_1")]
    Section1,
    /// Section 2 (personnel acts).
    #[serde(rename = "SECTION_2")]
    Section2,
    /// Section 3 (contracts and tenders).
    #[serde(rename = "SECTION_3")]
    Section3,
    /// Extra edition.
    #[serde(rename = "EXTRA_EDITION")]
    ExtraEdition,
    /// Supplementary edition.
    #[serde(rename = "SUPPLEMENTARY_EDITION")]
    SupplementaryEdition,
}

impl Vocabulary for GazetteSection {
    const CATEGORY: VocabularyCategory = VocabularyCategory::GazetteSection;
    const VARIANTS: &'static [Self] = &[
        Self::All,
        Self::Section1,
        Self::Section2,
        Self::Section3,
        Self::ExtraEdition,
        Self::SupplementaryEdition,
    ];
    const KEYWORDS: &'static [&'static str] = &[
        "ALL",
        "SECTION_1",
        "SECTION_2",
        "SECTION_3",
        "EXTRA_EDITION",
        "SUPPLEMENTARY_EDITION",
    ];
    const SPELLINGS: &'static [(&'static str, Self)] = &[
        ("ALL", Self::All),
        ("TODOS", Self::All),
        ("TODAS", Self::All),
        ("SECTION_1", Self::Section1),
        ("SECAO_1", Self::Section1),
        ("1", Self::Section1),
        ("SECTION_2", Self::Section2),
        ("SECAO_2", Self::Section2),
        ("2", Self::Section2),
        ("SECTION_3", Self::Section3),
        ("SECAO_3", Self::Section3),
        ("3", Self::Section3),
        ("EXTRA_EDITION", Self::ExtraEdition),
        ("EDICAO_EXTRA", Self::ExtraEdition),
        ("SUPPLEMENTARY_EDITION", Self::SupplementaryEdition),
        ("EDICAO_SUPLEMENTAR", Self::SupplementaryEdition),
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Section1 => "SECTION_1",
            Self::Section2 => "SECTION_2",
            Self::Section3 => "SECTION_3",
            Self::ExtraEdition => "EXTRA_EDITION",
            Self::SupplementaryEdition => "SUPPLEMENTARY_EDITION",
        }
    }
}

/// Document field the terms are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchField {
    /// Title and body.
    #[default]
    Full,
    /// Title only.
    Title,
    /// Body only.
    Body,
}

impl Vocabulary for MatchField {
    const CATEGORY: VocabularyCategory = VocabularyCategory::MatchField;
    const VARIANTS: &'static [Self] = &[Self::Full, Self::Title, Self::Body];
    const KEYWORDS: &'static [&'static str] = &["FULL", "TITLE", "BODY"];
    const SPELLINGS: &'static [(&'static str, Self)] = &[
        ("FULL", Self::Full),
        ("TUDO", Self::Full),
        ("TITLE", Self::Title),
        ("TITULO", Self::Title),
        ("BODY", Self::Body),
        ("CONTEUDO", Self::Body),
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Title => "TITLE",
            Self::Body => "BODY",
        }
    }
}

/// Upstream publication source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    /// The federal official gazette search service.
    #[default]
    Primary,
    /// The municipal gazettes aggregator.
    Secondary,
    /// The federal gazette bulk-data mirror.
    Inlabs,
}

impl Vocabulary for DataSource {
    const CATEGORY: VocabularyCategory = VocabularyCategory::DataSource;
    const VARIANTS: &'static [Self] = &[Self::Primary, Self::Secondary, Self::Inlabs];
    const KEYWORDS: &'static [&'static str] = &["PRIMARY", "SECONDARY", "INLABS"];
    const SPELLINGS: &'static [(&'static str, Self)] = &[
        ("PRIMARY", Self::Primary),
        ("DOU", Self::Primary),
        ("SECONDARY", Self::Secondary),
        ("QD", Self::Secondary),
        ("INLABS", Self::Inlabs),
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Secondary => "SECONDARY",
            Self::Inlabs => "INLABS",
        }
    }
}

macro_rules! display_keyword {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                    formatter.write_str(self.keyword())
                }
            }
        )+
    };
}

display_keyword!(TimeWindow, GazetteSection, MatchField, DataSource);
