use std::io::Write;

use serde::Serialize;

use super::CanonicalAnswer;

#[derive(Debug, Serialize)]
struct AnswerRow<'a> {
    question_id: &'a str,
    question_text: &'a str,
    answered: bool,
    answer: String,
}

/// Write canonical answers as CSV with a header row, one row per question.
pub fn write_csv<W: Write>(writer: W, answers: &[CanonicalAnswer]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for entry in answers {
        csv_writer.serialize(AnswerRow {
            question_id: entry.question_id.as_str(),
            question_text: &entry.question_text,
            answered: entry.answer.is_some(),
            answer: entry
                .answer
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
