use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::question::{Question, QuestionId};
use crate::workflows::validation::ValidationError;

/// Ordered collection of questions attached to a job posting.
///
/// Order is display and numbering order. Question ids are unique within a set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(&question.id) {
                return Err(ValidationError::DuplicateQuestion {
                    question_id: question.id.clone(),
                });
            }
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|question| &question.id == id)
    }

    pub fn find_by_catalog_id(&self, catalog_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.catalog_id() == Some(catalog_id))
    }

    /// Ids of questions whose text is still blank.
    pub fn incomplete_ids(&self) -> BTreeSet<QuestionId> {
        self.questions
            .iter()
            .filter(|question| question.is_incomplete())
            .map(|question| question.id.clone())
            .collect()
    }

    /// Every problem that blocks publishing, in question order.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = self
            .questions
            .iter()
            .flat_map(Question::validate)
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub(crate) fn questions_mut(&mut self) -> &mut Vec<Question> {
        &mut self.questions
    }
}

impl TryFrom<Vec<Question>> for QuestionSet {
    type Error = ValidationError;

    fn try_from(questions: Vec<Question>) -> Result<Self, Self::Error> {
        Self::new(questions)
    }
}

impl From<QuestionSet> for Vec<Question> {
    fn from(set: QuestionSet) -> Self {
        set.questions
    }
}
