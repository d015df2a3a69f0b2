use serde::Serialize;

use super::question::{
    Currency, Question, QuestionId, QuestionKind, QuestionOption, QuestionOrigin,
    QuestionVariant, RangeSpec, RangeType, RangeUnit,
};

/// Fixed suggested question offered to every recruiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub catalog_id: &'static str,
    pub text: &'static str,
    pub variant: QuestionVariant,
    #[serde(skip_serializing_if = "has_no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_type: Option<RangeType>,
}

fn has_no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        catalog_id: "notice-period",
        text: "How soon can you start?",
        variant: QuestionVariant::Dropdown,
        options: &["Immediately", "<30 days", ">30 days"],
        range_type: None,
    },
    CatalogEntry {
        catalog_id: "expected-salary",
        text: "What is your expected monthly salary?",
        variant: QuestionVariant::Range,
        options: &[],
        range_type: Some(RangeType::Currency),
    },
    CatalogEntry {
        catalog_id: "years-experience",
        text: "How many years of relevant experience do you have?",
        variant: QuestionVariant::ShortAnswer,
        options: &[],
        range_type: None,
    },
    CatalogEntry {
        catalog_id: "work-setup",
        text: "Which work setups are you open to?",
        variant: QuestionVariant::Checkboxes,
        options: &["Onsite", "Hybrid", "Remote"],
        range_type: None,
    },
    CatalogEntry {
        catalog_id: "relocation",
        text: "Are you willing to relocate?",
        variant: QuestionVariant::Dropdown,
        options: &["Yes", "No"],
        range_type: None,
    },
    CatalogEntry {
        catalog_id: "cover-note",
        text: "Why are you interested in this role?",
        variant: QuestionVariant::LongAnswer,
        options: &[],
        range_type: None,
    },
];

pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}

pub fn entry(catalog_id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.catalog_id == catalog_id)
}

impl CatalogEntry {
    /// Build a fresh question for a posting; currency ranges use the job's currency.
    pub fn instantiate(&self, currency: Currency) -> Question {
        let options = || {
            self.options
                .iter()
                .map(|value| QuestionOption::new(*value))
                .collect::<Vec<_>>()
        };

        let kind = match self.variant {
            QuestionVariant::ShortAnswer => QuestionKind::ShortAnswer,
            QuestionVariant::LongAnswer => QuestionKind::LongAnswer,
            QuestionVariant::Text => QuestionKind::Text,
            QuestionVariant::Dropdown => QuestionKind::Dropdown { options: options() },
            QuestionVariant::Checkboxes => QuestionKind::Checkboxes { options: options() },
            QuestionVariant::Range => {
                let unit = match self.range_type {
                    Some(RangeType::Currency) => RangeUnit::Currency(currency),
                    _ => RangeUnit::Number,
                };
                QuestionKind::Range(RangeSpec::new(unit))
            }
        };

        Question {
            id: QuestionId::generate(),
            text: self.text.to_string(),
            origin: QuestionOrigin::Suggested {
                catalog_id: self.catalog_id.to_string(),
            },
            kind,
            prior_currency_range: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = entries().iter().map(|entry| entry.catalog_id).collect();
        assert_eq!(ids.len(), entries().len());
    }

    #[test]
    fn instantiated_questions_are_publishable() {
        for entry in entries() {
            let question = entry.instantiate(Currency::Php);
            assert!(question.validate().is_empty(), "{} invalid", entry.catalog_id);
            assert_eq!(question.catalog_id(), Some(entry.catalog_id));
        }
    }

    #[test]
    fn salary_range_uses_job_currency() {
        let question = entry("expected-salary")
            .expect("catalog entry")
            .instantiate(Currency::Usd);
        assert_eq!(
            question.kind.range().map(|spec| spec.unit),
            Some(RangeUnit::Currency(Currency::Usd))
        );
    }
}
