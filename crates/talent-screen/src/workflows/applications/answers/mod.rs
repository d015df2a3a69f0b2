//! Candidate answers: wire shapes, completeness checks, normalization and export.

pub mod collector;
pub mod export;
pub mod normalizer;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::workflows::postings::QuestionId;

pub use collector::{validate, CompleteAnswers, CompletenessReport, MissingAnswers};
pub use normalizer::to_canonical;

/// Answer payload. The bound question's variant decides which shape is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Short/long answer, text and dropdown questions.
    Text(String),
    /// Checkbox questions, by option value.
    Selections(Vec<String>),
    Range(RangeAnswer),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeAnswer {
    #[serde(default)]
    pub min_value: Option<String>,
    #[serde(default)]
    pub max_value: Option<String>,
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn selections<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Selections(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min_value: impl Into<String>, max_value: impl Into<String>) -> Self {
        AnswerValue::Range(RangeAnswer {
            min_value: Some(min_value.into()),
            max_value: Some(max_value.into()),
        })
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(value) => f.write_str(value),
            AnswerValue::Selections(values) => f.write_str(&values.join("; ")),
            AnswerValue::Range(range) => write!(
                f,
                "{} - {}",
                range.min_value.as_deref().unwrap_or_default(),
                range.max_value.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// System-of-record answer entry with a snapshot of the question text at answer time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalAnswer {
    pub question_id: QuestionId,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub answer: Option<AnswerValue>,
}

/// Answers as accepted from candidates: the canonical list or the older id-to-answer mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerSubmission {
    Canonical(Vec<CanonicalAnswer>),
    Legacy(BTreeMap<QuestionId, Option<AnswerValue>>),
}

impl From<Vec<CanonicalAnswer>> for AnswerSubmission {
    fn from(answers: Vec<CanonicalAnswer>) -> Self {
        AnswerSubmission::Canonical(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submission_detects_wire_format() {
        let legacy: AnswerSubmission =
            serde_json::from_value(json!({ "q1": "42", "q2": ["Remote"] })).expect("legacy");
        match legacy {
            AnswerSubmission::Legacy(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(
                    map.get(&QuestionId::from("q2")),
                    Some(&Some(AnswerValue::selections(["Remote"])))
                );
            }
            other => panic!("expected legacy mapping, got {other:?}"),
        }

        let canonical: AnswerSubmission = serde_json::from_value(json!([
            { "questionId": "q1", "questionText": "Age?", "answer": "42" },
            { "questionId": "q2", "questionText": "Salary", "answer": { "minValue": "1", "maxValue": "2" } },
            { "questionId": "q3", "questionText": "Cover", "answer": null },
        ]))
        .expect("canonical");
        match canonical {
            AnswerSubmission::Canonical(entries) => {
                assert_eq!(entries[1].answer, Some(AnswerValue::range("1", "2")));
                assert_eq!(entries[2].answer, None);
            }
            other => panic!("expected canonical list, got {other:?}"),
        }
    }

    #[test]
    fn canonical_entries_serialize_null_answers() {
        let entry = CanonicalAnswer {
            question_id: QuestionId::from("q1"),
            question_text: "Age?".to_string(),
            answer: None,
        };
        assert_eq!(
            serde_json::to_value(&entry).expect("serializes"),
            json!({ "questionId": "q1", "questionText": "Age?", "answer": null })
        );
    }

    #[test]
    fn display_renders_each_shape() {
        assert_eq!(AnswerValue::text("42").to_string(), "42");
        assert_eq!(
            AnswerValue::selections(["Remote", "Hybrid"]).to_string(),
            "Remote; Hybrid"
        );
        assert_eq!(AnswerValue::range("10", "20").to_string(), "10 - 20");
    }
}
