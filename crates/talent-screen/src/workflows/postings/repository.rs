use std::fmt;

use serde::{Deserialize, Serialize};

use super::question_set::QuestionSet;
use crate::workflows::store::RepositoryError;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(pub String);

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Key-value storage for the question set persisted with each posting. Last write wins.
pub trait PostingStore: Send + Sync {
    fn load_question_set(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError>;
    fn save_question_set(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError>;
    /// Unpublished working copy saved through an explicit draft call.
    fn load_draft(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError>;
    fn save_draft(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError>;
}
