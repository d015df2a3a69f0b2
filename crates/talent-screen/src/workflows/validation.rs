use serde::Serialize;

use super::postings::{OptionId, QuestionId};

/// Recoverable input problems, each naming the question or field at fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ValidationError {
    #[error("question {question_id} has blank text")]
    BlankText { question_id: QuestionId },
    #[error("option {option_id} of question {question_id} has a blank value")]
    BlankOption {
        question_id: QuestionId,
        option_id: OptionId,
    },
    #[error("question {question_id} needs at least one option")]
    MissingOptions { question_id: QuestionId },
    #[error("question id {question_id} appears more than once")]
    DuplicateQuestion { question_id: QuestionId },
    #[error("option id {option_id} appears more than once in question {question_id}")]
    DuplicateOption {
        question_id: QuestionId,
        option_id: OptionId,
    },
    #[error("cv upload is empty")]
    EmptyCv,
    #[error("cv upload of {size} bytes exceeds the {limit} byte limit")]
    CvTooLarge { size: usize, limit: usize },
}

impl ValidationError {
    /// Question the problem is attached to, if any.
    pub fn question_id(&self) -> Option<&QuestionId> {
        match self {
            ValidationError::BlankText { question_id }
            | ValidationError::BlankOption { question_id, .. }
            | ValidationError::MissingOptions { question_id }
            | ValidationError::DuplicateQuestion { question_id }
            | ValidationError::DuplicateOption { question_id, .. } => Some(question_id),
            ValidationError::EmptyCv | ValidationError::CvTooLarge { .. } => None,
        }
    }
}
