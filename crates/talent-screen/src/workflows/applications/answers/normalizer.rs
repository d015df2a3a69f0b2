use std::collections::HashMap;

use super::{AnswerSubmission, AnswerValue, CanonicalAnswer};
use crate::workflows::postings::{QuestionId, QuestionSet};

struct Found<'a> {
    snapshot: Option<&'a str>,
    answer: Option<&'a AnswerValue>,
}

/// Convert either accepted answer shape into the canonical list for `set`.
///
/// Output has exactly one entry per question, in question set order. Entries for questions
/// no longer in the set are dropped. A non-blank question text snapshot from an earlier
/// normalization is kept, otherwise the current question text is recorded. When the same
/// question id appears twice the later entry wins. Applying this to its own output returns
/// the same list.
pub fn to_canonical(set: &QuestionSet, submission: &AnswerSubmission) -> Vec<CanonicalAnswer> {
    let mut found: HashMap<&QuestionId, Found<'_>> = HashMap::new();
    match submission {
        AnswerSubmission::Canonical(entries) => {
            for entry in entries {
                found.insert(
                    &entry.question_id,
                    Found {
                        snapshot: Some(entry.question_text.as_str()),
                        answer: entry.answer.as_ref(),
                    },
                );
            }
        }
        AnswerSubmission::Legacy(mapping) => {
            for (question_id, answer) in mapping {
                found.insert(
                    question_id,
                    Found {
                        snapshot: None,
                        answer: answer.as_ref(),
                    },
                );
            }
        }
    }

    set.iter()
        .map(|question| {
            let entry = found.get(&question.id);
            let question_text = entry
                .and_then(|entry| entry.snapshot)
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(question.text.as_str())
                .to_string();
            CanonicalAnswer {
                question_id: question.id.clone(),
                question_text,
                answer: entry.and_then(|entry| entry.answer).cloned(),
            }
        })
        .collect()
}
