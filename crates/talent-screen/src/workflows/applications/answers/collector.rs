use std::collections::HashMap;

use serde::Serialize;

use super::{AnswerValue, CanonicalAnswer};
use crate::workflows::postings::{Question, QuestionId, QuestionKind, QuestionSet};

/// Completeness verdict for one application's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessReport {
    pub complete: bool,
    /// Unanswered or invalid questions, in question set order.
    pub missing_question_ids: Vec<QuestionId>,
}

/// Proof that every question in the set has a valid answer. Only [`CompletenessReport`]
/// hands one out, so the screening transition cannot be requested without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteAnswers(());

impl CompletenessReport {
    pub fn first_missing(&self) -> Option<&QuestionId> {
        self.missing_question_ids.first()
    }

    /// Proof of completeness, or the questions still missing an answer.
    pub fn verify(self) -> Result<CompleteAnswers, MissingAnswers> {
        match self.missing_question_ids.first() {
            None => Ok(CompleteAnswers(())),
            Some(first_missing) => Err(MissingAnswers {
                first_missing: first_missing.clone(),
                missing: self.missing_question_ids,
            }),
        }
    }
}

/// Questions without a valid answer, first one named separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAnswers {
    pub first_missing: QuestionId,
    pub missing: Vec<QuestionId>,
}

/// Check every question in `set` against `answers`. Entries for unknown questions are ignored.
pub fn validate(set: &QuestionSet, answers: &[CanonicalAnswer]) -> CompletenessReport {
    let by_id: HashMap<&QuestionId, Option<&AnswerValue>> = answers
        .iter()
        .map(|entry| (&entry.question_id, entry.answer.as_ref()))
        .collect();

    let missing_question_ids: Vec<QuestionId> = set
        .iter()
        .filter(|question| {
            let answer = by_id.get(&question.id).copied().flatten();
            !is_answered(question, answer)
        })
        .map(|question| question.id.clone())
        .collect();

    CompletenessReport {
        complete: missing_question_ids.is_empty(),
        missing_question_ids,
    }
}

/// Per-variant completeness. Range values are not checked for numeric format here.
pub fn is_answered(question: &Question, answer: Option<&AnswerValue>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match (&question.kind, answer) {
        (
            QuestionKind::ShortAnswer | QuestionKind::LongAnswer | QuestionKind::Text,
            AnswerValue::Text(value),
        ) => is_filled(value),
        (QuestionKind::Dropdown { .. }, AnswerValue::Text(value)) => {
            is_filled(value) && question.has_option_value(value)
        }
        (QuestionKind::Checkboxes { .. }, AnswerValue::Selections(values)) => {
            !values.is_empty() && values.iter().all(|value| question.has_option_value(value))
        }
        (QuestionKind::Range(_), AnswerValue::Range(range)) => {
            range.min_value.as_deref().is_some_and(is_filled)
                && range.max_value.as_deref().is_some_and(is_filled)
        }
        _ => false,
    }
}

fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}
