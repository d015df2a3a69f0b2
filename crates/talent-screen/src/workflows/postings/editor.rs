use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;

use super::catalog;
use super::question::{
    revariant, Currency, OptionId, Question, QuestionId, QuestionKind, QuestionOption,
    QuestionVariant, RangeDefaults, RangeType, RangeUnit,
};
use super::question_set::QuestionSet;
use crate::workflows::validation::ValidationError;

/// Partial update merged into a question. Fields the resulting variant does not own are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub variant: Option<QuestionVariant>,
    pub options: Option<Vec<QuestionOption>>,
    pub range_type: Option<RangeType>,
    pub currency: Option<Currency>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
}

/// Result of adding a catalog question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestedOutcome {
    Added(QuestionId),
    /// A question from the same catalog entry is already in the set; nothing changed.
    AlreadyAdded(QuestionId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("option {option_id} not found on question {question_id}")]
    OptionNotFound {
        question_id: QuestionId,
        option_id: OptionId,
    },
    #[error("question {0} does not take options")]
    NotAChoiceQuestion(QuestionId),
    #[error("suggested question {0} has read-only text")]
    ReadOnlyText(QuestionId),
    #[error("unknown catalog entry '{0}'")]
    UnknownCatalogEntry(String),
    #[error("target index {index} is out of bounds for {len} items")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Recruiter-side editing session over one posting's question set.
///
/// Edits are never blocked by incomplete questions; blank-text questions are tracked in
/// [`QuestionSetEditor::incomplete`] for highlighting.
#[derive(Debug, Clone)]
pub struct QuestionSetEditor {
    set: QuestionSet,
    default_currency: Currency,
    incomplete: BTreeSet<QuestionId>,
}

impl QuestionSetEditor {
    pub fn new(set: QuestionSet, default_currency: Currency) -> Self {
        let incomplete = set.incomplete_ids();
        Self {
            set,
            default_currency,
            incomplete,
        }
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.set
    }

    pub fn into_question_set(self) -> QuestionSet {
        self.set
    }

    pub fn incomplete(&self) -> &BTreeSet<QuestionId> {
        &self.incomplete
    }

    /// Append a blank dropdown question with one empty option.
    pub fn add_custom(&mut self) -> &QuestionSet {
        let question = Question::blank_custom();
        self.incomplete.insert(question.id.clone());
        self.set.questions_mut().push(question);
        &self.set
    }

    /// Append the catalog question `catalog_id` unless one from the same entry is present.
    pub fn add_suggested(&mut self, catalog_id: &str) -> Result<SuggestedOutcome, EditorError> {
        if let Some(existing) = self.set.find_by_catalog_id(catalog_id) {
            return Ok(SuggestedOutcome::AlreadyAdded(existing.id.clone()));
        }

        let entry = catalog::entry(catalog_id)
            .ok_or_else(|| EditorError::UnknownCatalogEntry(catalog_id.to_string()))?;
        let question = entry.instantiate(self.default_currency);
        let id = question.id.clone();
        self.track(&question);
        self.set.questions_mut().push(question);
        Ok(SuggestedOutcome::Added(id))
    }

    /// Merge `patch` into a question. A variant change resets fields through [`revariant`].
    pub fn update(
        &mut self,
        question_id: &QuestionId,
        patch: QuestionPatch,
    ) -> Result<&Question, EditorError> {
        let index = self.index_of(question_id)?;
        let current = &self.set.questions()[index];
        let had_currency_range = current.had_currency_range();
        let mut next = current.clone();

        if let Some(text) = patch.text {
            if next.is_suggested() && text != next.text {
                return Err(EditorError::ReadOnlyText(question_id.clone()));
            }
            next.text = text;
        }

        if let Some(variant) = patch.variant {
            let defaults = RangeDefaults {
                prior_currency_range: had_currency_range,
                default_currency: self.default_currency,
            };
            next = revariant(&next, variant, defaults);
        }

        match &mut next.kind {
            QuestionKind::Dropdown { options } | QuestionKind::Checkboxes { options } => {
                if let Some(replacement) = patch.options {
                    ensure_unique_options(question_id, &replacement)?;
                    *options = replacement;
                }
            }
            QuestionKind::Range(spec) => {
                let currency = patch
                    .currency
                    .or(spec.unit.currency())
                    .unwrap_or(self.default_currency);
                spec.unit = match patch.range_type.unwrap_or(spec.unit.range_type()) {
                    RangeType::Number => RangeUnit::Number,
                    RangeType::Currency => RangeUnit::Currency(currency),
                };
                if let Some(min_value) = patch.min_value {
                    spec.min_value = min_value;
                }
                if let Some(max_value) = patch.max_value {
                    spec.max_value = max_value;
                }
            }
            QuestionKind::ShortAnswer | QuestionKind::LongAnswer | QuestionKind::Text => {}
        }

        next.prior_currency_range = had_currency_range && !next.is_currency_range();
        self.track(&next);
        self.set.questions_mut()[index] = next;
        Ok(&self.set.questions()[index])
    }

    /// Remove a question. Answers that referenced it are ignored downstream.
    pub fn remove(&mut self, question_id: &QuestionId) -> Result<Question, EditorError> {
        let index = self.index_of(question_id)?;
        let removed = self.set.questions_mut().remove(index);
        self.incomplete.remove(question_id);
        Ok(removed)
    }

    /// Move a question to `target_index`, keeping the relative order of the others.
    pub fn reorder(
        &mut self,
        question_id: &QuestionId,
        target_index: usize,
    ) -> Result<&QuestionSet, EditorError> {
        let index = self.index_of(question_id)?;
        move_item(self.set.questions_mut(), index, target_index)?;
        Ok(&self.set)
    }

    /// Append an empty option to a dropdown/checkbox question.
    pub fn add_option(&mut self, question_id: &QuestionId) -> Result<OptionId, EditorError> {
        let options = self.options_mut(question_id)?;
        let option = QuestionOption::blank();
        let id = option.id.clone();
        options.push(option);
        Ok(id)
    }

    pub fn remove_option(
        &mut self,
        question_id: &QuestionId,
        option_id: &OptionId,
    ) -> Result<QuestionOption, EditorError> {
        let options = self.options_mut(question_id)?;
        let index = option_index(question_id, options, option_id)?;
        Ok(options.remove(index))
    }

    pub fn update_option(
        &mut self,
        question_id: &QuestionId,
        option_id: &OptionId,
        value: impl Into<String>,
    ) -> Result<&QuestionOption, EditorError> {
        let options = self.options_mut(question_id)?;
        let index = option_index(question_id, options, option_id)?;
        options[index].value = value.into();
        Ok(&options[index])
    }

    pub fn reorder_option(
        &mut self,
        question_id: &QuestionId,
        option_id: &OptionId,
        target_index: usize,
    ) -> Result<&[QuestionOption], EditorError> {
        let options = self.options_mut(question_id)?;
        let index = option_index(question_id, options, option_id)?;
        move_item(options, index, target_index)?;
        Ok(options)
    }

    fn index_of(&self, question_id: &QuestionId) -> Result<usize, EditorError> {
        self.set
            .position(question_id)
            .ok_or_else(|| EditorError::QuestionNotFound(question_id.clone()))
    }

    fn options_mut(
        &mut self,
        question_id: &QuestionId,
    ) -> Result<&mut Vec<QuestionOption>, EditorError> {
        let index = self.index_of(question_id)?;
        self.set.questions_mut()[index]
            .kind
            .options_mut()
            .ok_or_else(|| EditorError::NotAChoiceQuestion(question_id.clone()))
    }

    fn track(&mut self, question: &Question) {
        if question.is_incomplete() {
            self.incomplete.insert(question.id.clone());
        } else {
            self.incomplete.remove(&question.id);
        }
    }
}

fn option_index(
    question_id: &QuestionId,
    options: &[QuestionOption],
    option_id: &OptionId,
) -> Result<usize, EditorError> {
    options
        .iter()
        .position(|option| &option.id == option_id)
        .ok_or_else(|| EditorError::OptionNotFound {
            question_id: question_id.clone(),
            option_id: option_id.clone(),
        })
}

fn ensure_unique_options(
    question_id: &QuestionId,
    options: &[QuestionOption],
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(&option.id) {
            return Err(ValidationError::DuplicateOption {
                question_id: question_id.clone(),
                option_id: option.id.clone(),
            });
        }
    }
    Ok(())
}

/// Move `items[from]` to `to`. Moving onto its own index leaves the list untouched.
fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), EditorError> {
    if to >= items.len() {
        return Err(EditorError::IndexOutOfBounds {
            index: to,
            len: items.len(),
        });
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}
