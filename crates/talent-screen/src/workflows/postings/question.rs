use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::validation::ValidationError;

/// Opaque question identifier, stable across edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of a dropdown/checkbox option, unique within its question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub String);

impl OptionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A selectable option; display order is selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub value: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: OptionId::generate(),
            value: value.into(),
        }
    }

    pub fn blank() -> Self {
        Self::new(String::new())
    }
}

/// The six question shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionVariant {
    ShortAnswer,
    LongAnswer,
    Dropdown,
    Checkboxes,
    Range,
    Text,
}

impl QuestionVariant {
    pub const ALL: [QuestionVariant; 6] = [
        QuestionVariant::ShortAnswer,
        QuestionVariant::LongAnswer,
        QuestionVariant::Dropdown,
        QuestionVariant::Checkboxes,
        QuestionVariant::Range,
        QuestionVariant::Text,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            QuestionVariant::ShortAnswer => "short-answer",
            QuestionVariant::LongAnswer => "long-answer",
            QuestionVariant::Dropdown => "dropdown",
            QuestionVariant::Checkboxes => "checkboxes",
            QuestionVariant::Range => "range",
            QuestionVariant::Text => "text",
        }
    }

    pub const fn owns_options(self) -> bool {
        matches!(self, QuestionVariant::Dropdown | QuestionVariant::Checkboxes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "PHP", alias = "php")]
    Php,
    #[serde(rename = "USD", alias = "usd")]
    Usd,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Php => "PHP",
            Currency::Usd => "USD",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PHP" => Some(Currency::Php),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeType {
    Currency,
    Number,
}

/// What a range question measures; a currency is only meaningful for currency ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeUnit {
    Number,
    Currency(Currency),
}

impl RangeUnit {
    pub const fn range_type(self) -> RangeType {
        match self {
            RangeUnit::Number => RangeType::Number,
            RangeUnit::Currency(_) => RangeType::Currency,
        }
    }

    pub const fn currency(self) -> Option<Currency> {
        match self {
            RangeUnit::Number => None,
            RangeUnit::Currency(currency) => Some(currency),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub unit: RangeUnit,
    pub min_value: String,
    pub max_value: String,
}

impl RangeSpec {
    pub fn new(unit: RangeUnit) -> Self {
        Self {
            unit,
            min_value: String::new(),
            max_value: String::new(),
        }
    }
}

/// Variant-specific payload. Each arm carries exactly the fields its variant owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    ShortAnswer,
    LongAnswer,
    Text,
    Dropdown { options: Vec<QuestionOption> },
    Checkboxes { options: Vec<QuestionOption> },
    Range(RangeSpec),
}

impl QuestionKind {
    pub fn variant(&self) -> QuestionVariant {
        match self {
            QuestionKind::ShortAnswer => QuestionVariant::ShortAnswer,
            QuestionKind::LongAnswer => QuestionVariant::LongAnswer,
            QuestionKind::Text => QuestionVariant::Text,
            QuestionKind::Dropdown { .. } => QuestionVariant::Dropdown,
            QuestionKind::Checkboxes { .. } => QuestionVariant::Checkboxes,
            QuestionKind::Range(_) => QuestionVariant::Range,
        }
    }

    /// Fresh payload for `variant` with every owned field at its default.
    pub fn blank(variant: QuestionVariant, defaults: RangeDefaults) -> Self {
        match variant {
            QuestionVariant::ShortAnswer => QuestionKind::ShortAnswer,
            QuestionVariant::LongAnswer => QuestionKind::LongAnswer,
            QuestionVariant::Text => QuestionKind::Text,
            QuestionVariant::Dropdown => QuestionKind::Dropdown {
                options: vec![QuestionOption::blank()],
            },
            QuestionVariant::Checkboxes => QuestionKind::Checkboxes {
                options: vec![QuestionOption::blank()],
            },
            QuestionVariant::Range => {
                let unit = if defaults.prior_currency_range {
                    RangeUnit::Currency(defaults.default_currency)
                } else {
                    RangeUnit::Number
                };
                QuestionKind::Range(RangeSpec::new(unit))
            }
        }
    }

    pub fn options(&self) -> Option<&[QuestionOption]> {
        match self {
            QuestionKind::Dropdown { options } | QuestionKind::Checkboxes { options } => {
                Some(options)
            }
            _ => None,
        }
    }

    pub(crate) fn options_mut(&mut self) -> Option<&mut Vec<QuestionOption>> {
        match self {
            QuestionKind::Dropdown { options } | QuestionKind::Checkboxes { options } => {
                Some(options)
            }
            _ => None,
        }
    }

    pub fn range(&self) -> Option<&RangeSpec> {
        match self {
            QuestionKind::Range(spec) => Some(spec),
            _ => None,
        }
    }
}

/// Where a question came from. Suggested questions keep their catalog id for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOrigin {
    Custom,
    Suggested { catalog_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    #[default]
    Custom,
    Suggested,
}

/// Inputs `revariant` needs to pick the default unit of a new range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDefaults {
    /// The question was a currency range at some earlier point of its draft history.
    pub prior_currency_range: bool,
    /// The job's default currency.
    pub default_currency: Currency,
}

impl RangeDefaults {
    pub fn number(default_currency: Currency) -> Self {
        Self {
            prior_currency_range: false,
            default_currency,
        }
    }
}

/// A recruiter-authored screening question.
///
/// On the wire a question is a flat record (see [`RawQuestion`]); fields that the variant
/// does not own are dropped while deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQuestion", into = "RawQuestion")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub origin: QuestionOrigin,
    pub kind: QuestionKind,
    /// Set once a currency range has been switched away from, so a later switch back to
    /// range starts as a currency range again. Persisted with the draft.
    pub prior_currency_range: bool,
}

impl Question {
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            origin: QuestionOrigin::Custom,
            kind,
            prior_currency_range: false,
        }
    }

    /// A blank custom dropdown with one empty option, as added from the editor.
    pub fn blank_custom() -> Self {
        Self {
            id: QuestionId::generate(),
            text: String::new(),
            origin: QuestionOrigin::Custom,
            kind: QuestionKind::Dropdown {
                options: vec![QuestionOption::blank()],
            },
            prior_currency_range: false,
        }
    }

    pub fn variant(&self) -> QuestionVariant {
        self.kind.variant()
    }

    pub fn options(&self) -> Option<&[QuestionOption]> {
        self.kind.options()
    }

    pub fn catalog_id(&self) -> Option<&str> {
        match &self.origin {
            QuestionOrigin::Suggested { catalog_id } => Some(catalog_id),
            QuestionOrigin::Custom => None,
        }
    }

    pub fn is_currency_range(&self) -> bool {
        matches!(
            self.kind.range().map(|spec| spec.unit),
            Some(RangeUnit::Currency(_))
        )
    }

    /// Currently a currency range, or was one before a variant or unit change.
    pub fn had_currency_range(&self) -> bool {
        self.prior_currency_range || self.is_currency_range()
    }

    pub fn is_suggested(&self) -> bool {
        matches!(self.origin, QuestionOrigin::Suggested { .. })
    }

    /// Blank text marks a question as incomplete for highlighting.
    pub fn is_incomplete(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// True when `value` matches one of the option values exactly.
    pub fn has_option_value(&self, value: &str) -> bool {
        self.options()
            .map(|options| options.iter().any(|option| option.value == value))
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.is_incomplete() {
            errors.push(ValidationError::BlankText {
                question_id: self.id.clone(),
            });
        }

        if let Some(options) = self.options() {
            if options.is_empty() {
                errors.push(ValidationError::MissingOptions {
                    question_id: self.id.clone(),
                });
            }

            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(&option.id) {
                    errors.push(ValidationError::DuplicateOption {
                        question_id: self.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
                if option.value.trim().is_empty() {
                    errors.push(ValidationError::BlankOption {
                        question_id: self.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
            }
        }

        errors
    }
}

/// Switch `question` to `variant`, resetting every field the new variant does not own.
///
/// Switching to the current variant returns the question unchanged. Dropdown and checkbox
/// questions share ownership of the option list, so it survives a switch between the two.
pub fn revariant(question: &Question, variant: QuestionVariant, defaults: RangeDefaults) -> Question {
    if question.variant() == variant {
        return question.clone();
    }

    let kind = match (&question.kind, variant) {
        (QuestionKind::Checkboxes { options }, QuestionVariant::Dropdown) => {
            QuestionKind::Dropdown {
                options: options.clone(),
            }
        }
        (QuestionKind::Dropdown { options }, QuestionVariant::Checkboxes) => {
            QuestionKind::Checkboxes {
                options: options.clone(),
            }
        }
        _ => QuestionKind::blank(variant, defaults),
    };

    let mut next = Question {
        kind,
        ..question.clone()
    };
    next.prior_currency_range = question.had_currency_range() && !next.is_currency_range();
    next
}

/// Flat persisted shape of a question, as stored in posting documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: QuestionId,
    #[serde(default)]
    pub text: String,
    pub variant: QuestionVariant,
    #[serde(default)]
    pub origin: OriginKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_type: Option<RangeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub prior_currency_range: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<RawQuestion> for Question {
    fn from(raw: RawQuestion) -> Self {
        let kind = match raw.variant {
            QuestionVariant::ShortAnswer => QuestionKind::ShortAnswer,
            QuestionVariant::LongAnswer => QuestionKind::LongAnswer,
            QuestionVariant::Text => QuestionKind::Text,
            QuestionVariant::Dropdown => QuestionKind::Dropdown {
                options: raw.options.unwrap_or_default(),
            },
            QuestionVariant::Checkboxes => QuestionKind::Checkboxes {
                options: raw.options.unwrap_or_default(),
            },
            QuestionVariant::Range => {
                let unit = match raw.range_type {
                    Some(RangeType::Currency) => {
                        RangeUnit::Currency(raw.currency.unwrap_or_default())
                    }
                    Some(RangeType::Number) | None => RangeUnit::Number,
                };
                QuestionKind::Range(RangeSpec {
                    unit,
                    min_value: raw.min_value.unwrap_or_default(),
                    max_value: raw.max_value.unwrap_or_default(),
                })
            }
        };

        let origin = match raw.origin {
            OriginKind::Custom => QuestionOrigin::Custom,
            OriginKind::Suggested => QuestionOrigin::Suggested {
                catalog_id: raw.catalog_id.unwrap_or_else(|| raw.id.0.clone()),
            },
        };

        let mut question = Question {
            id: raw.id,
            text: raw.text,
            origin,
            kind,
            prior_currency_range: false,
        };
        question.prior_currency_range = raw.prior_currency_range && !question.is_currency_range();
        question
    }
}

impl From<Question> for RawQuestion {
    fn from(question: Question) -> Self {
        let (origin, catalog_id) = match question.origin {
            QuestionOrigin::Custom => (OriginKind::Custom, None),
            QuestionOrigin::Suggested { catalog_id } => (OriginKind::Suggested, Some(catalog_id)),
        };

        let mut raw = RawQuestion {
            id: question.id,
            text: question.text,
            variant: question.kind.variant(),
            origin,
            catalog_id,
            options: None,
            range_type: None,
            currency: None,
            min_value: None,
            max_value: None,
            prior_currency_range: question.prior_currency_range,
        };

        match question.kind {
            QuestionKind::Dropdown { options } | QuestionKind::Checkboxes { options } => {
                raw.options = Some(options);
            }
            QuestionKind::Range(spec) => {
                raw.range_type = Some(spec.unit.range_type());
                raw.currency = spec.unit.currency();
                raw.min_value = Some(spec.min_value);
                raw.max_value = Some(spec.max_value);
            }
            QuestionKind::ShortAnswer | QuestionKind::LongAnswer | QuestionKind::Text => {}
        }

        raw
    }
}
