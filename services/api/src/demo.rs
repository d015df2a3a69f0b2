use crate::infra::{InMemoryApplicationStore, InMemoryPostingStore, PlainTextDigitizer};
use async_trait::async_trait;
use chrono::Local;
use clap::{Args, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use talent_screen::config::ScreeningConfig;
use talent_screen::error::AppError;
use talent_screen::workflows::applications::answers::{self, export};
use talent_screen::workflows::applications::{
    AnswerSubmission, AnswerValue, Application, ApplicationId, CandidateId, CanonicalAnswer,
    CompletenessReport, CvUpload, ReviewStatus, ScoreResponse, ScoringError, ScoringService,
    ScreeningPipeline,
};
use talent_screen::workflows::postings::{
    Currency, PostingEditorService, PostingId, QuestionPatch, QuestionSet, QuestionVariant,
    SuggestedOutcome,
};

const SAMPLE_CV: &str = "Sam Cruz
sam.cruz@example.test
Backend engineer, payments

Experience:
- Northwind Payments, 2021-2025
- Acme Logistics, 2018-2021
Skills:
- Rust
- PostgreSQL
";

const DEMO_SUGGESTIONS: [&str; 3] = ["notice-period", "expected-salary", "work-setup"];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Posting the demo question set is published under
    #[arg(long, default_value = "demo-posting")]
    posting: String,
    /// Candidate applying to the posting
    #[arg(long, default_value = "demo-candidate")]
    candidate: String,
    /// Plain-text CV to submit instead of the built-in sample
    #[arg(long)]
    cv: Option<PathBuf>,
    /// Outcome the stand-in scoring service returns
    #[arg(long, value_enum, default_value_t = DemoOutcome::Interview)]
    outcome: DemoOutcome,
    /// Currency used for salary range questions
    #[arg(long, default_value = "PHP", value_parser = parse_currency)]
    currency: Currency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoOutcome {
    Interview,
    ManualReview,
    Dropped,
}

impl DemoOutcome {
    fn score(self) -> ScoreResponse {
        match self {
            DemoOutcome::Interview => ScoreResponse::active(ReviewStatus::ForInterview),
            DemoOutcome::ManualReview => ScoreResponse::active(ReviewStatus::ForManualReview),
            DemoOutcome::Dropped => ScoreResponse::dropped(),
        }
    }
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::parse(raw).ok_or_else(|| format!("unsupported currency '{raw}'"))
}

/// Scoring stand-in that answers every request with the same verdict.
struct ScriptedScorer(ScoreResponse);

#[async_trait]
impl ScoringService for ScriptedScorer {
    async fn score(&self, _application_id: &ApplicationId) -> Result<ScoreResponse, ScoringError> {
        Ok(self.0)
    }
}

#[derive(Args, Debug)]
pub(crate) struct AnswersArgs {
    /// JSON file holding the question set (array of questions)
    #[arg(long)]
    questions: PathBuf,
    /// JSON file holding the answers, canonical list or legacy id map
    #[arg(long)]
    answers: PathBuf,
    /// Write CSV instead of JSON
    #[arg(long)]
    csv: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        posting,
        candidate,
        cv,
        outcome,
        currency,
    } = args;

    let cv_text = match cv {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE_CV.to_string(),
    };

    println!(
        "Screening demo ({})",
        Local::now().format("%Y-%m-%d %H:%M")
    );

    let postings = Arc::new(InMemoryPostingStore::default());
    let editor = PostingEditorService::new(postings.clone(), currency);
    let posting_id = PostingId::from(posting.as_str());

    println!("\nQuestion set for posting {posting_id}");
    for catalog_id in DEMO_SUGGESTIONS {
        match editor.edit(&posting_id, |session| session.add_suggested(catalog_id)) {
            Ok((_, SuggestedOutcome::Added(id))) => {
                println!("- added suggested '{catalog_id}' as {id}")
            }
            Ok((_, SuggestedOutcome::AlreadyAdded(id))) => {
                println!("- '{catalog_id}' already present as {id}")
            }
            Err(err) => println!("- could not add '{catalog_id}': {err}"),
        }
    }

    let custom = editor.edit(&posting_id, |session| {
        let Some(question_id) = session
            .add_custom()
            .questions()
            .last()
            .map(|question| question.id.clone())
        else {
            return Ok(None);
        };
        let patch = QuestionPatch {
            text: Some("Which programming languages do you use daily?".to_string()),
            variant: Some(QuestionVariant::ShortAnswer),
            ..QuestionPatch::default()
        };
        session
            .update(&question_id, patch)
            .map(|question| Some(question.id.clone()))
    });
    match custom {
        Ok((draft, Some(id))) => println!(
            "- added custom question {id} ({} incomplete)",
            draft.incomplete_question_ids.len()
        ),
        Ok((_, None)) => println!("- custom question was not added"),
        Err(err) => println!("- custom question rejected: {err}"),
    }

    let published = match editor.publish_draft(&posting_id) {
        Ok(set) => set,
        Err(err) => {
            println!("  Publishing failed: {err}");
            return Ok(());
        }
    };
    render_question_set(&published);

    let pipeline = ScreeningPipeline::new(
        postings,
        Arc::new(InMemoryApplicationStore::default()),
        Arc::new(PlainTextDigitizer),
        Arc::new(ScriptedScorer(outcome.score())),
        &ScreeningConfig::default(),
    );

    println!("\nCandidate journey for {candidate}");
    let application = match pipeline.begin(posting_id.clone(), CandidateId::from(candidate.as_str()))
    {
        Ok(application) => application,
        Err(err) => {
            println!("  Application could not start: {err}");
            return Ok(());
        }
    };
    println!("- application {} -> {}", application.id, application.state);

    let upload = CvUpload::new("cv.txt", "text/plain", cv_text.into_bytes());
    let application = match pipeline.submit_cv(&application.id, upload).await {
        Ok(application) => application,
        Err(err) => {
            println!("  CV rejected: {err}");
            return Ok(());
        }
    };
    let name = application
        .cv
        .as_ref()
        .and_then(|cv| cv.structured())
        .and_then(|cv| cv.full_name.clone())
        .unwrap_or_else(|| "unknown".to_string());
    println!("- cv digitized for {name} -> {}", application.state);

    let partial = demo_answers(&published, 1);
    match pipeline.save_answers(&application.id, &partial) {
        Ok(progress) => render_completeness("- partial answers saved", &progress.completeness),
        Err(err) => println!("  Answers rejected: {err}"),
    }

    let full = demo_answers(&published, published.len());
    match pipeline.advance(&application.id, Some(full)).await {
        Ok(routed) => render_outcome(&routed),
        Err(err) => println!("  Advance failed: {err}"),
    }

    Ok(())
}

/// Answers for the first `count` questions, each shaped for its variant.
fn demo_answers(set: &QuestionSet, count: usize) -> AnswerSubmission {
    set.iter()
        .take(count)
        .map(|question| {
            let answer = match question.variant() {
                QuestionVariant::Dropdown => question
                    .options()
                    .and_then(|options| options.first())
                    .map(|option| AnswerValue::text(option.value.clone())),
                QuestionVariant::Checkboxes => question.options().map(|options| {
                    AnswerValue::selections(options.iter().take(2).map(|option| option.value.clone()))
                }),
                QuestionVariant::Range => Some(AnswerValue::range("60000", "80000")),
                QuestionVariant::ShortAnswer
                | QuestionVariant::LongAnswer
                | QuestionVariant::Text => Some(AnswerValue::text("Rust, SQL")),
            };
            CanonicalAnswer {
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                answer,
            }
        })
        .collect::<Vec<_>>()
        .into()
}

fn render_question_set(set: &QuestionSet) {
    println!("Published {} question(s):", set.len());
    for (index, question) in set.iter().enumerate() {
        let origin = if question.is_suggested() {
            "suggested"
        } else {
            "custom"
        };
        println!(
            "  {}. [{}] {} ({origin})",
            index + 1,
            question.variant().label(),
            question.text
        );
        if let Some(options) = question.options() {
            let values: Vec<&str> = options.iter().map(|option| option.value.as_str()).collect();
            println!("     options: {}", values.join(", "));
        }
    }
}

fn render_completeness(label: &str, report: &CompletenessReport) {
    if report.complete {
        println!("{label}: complete");
        return;
    }
    let missing: Vec<&str> = report
        .missing_question_ids
        .iter()
        .map(|id| id.as_str())
        .collect();
    println!("{label}: {} missing ({})", missing.len(), missing.join(", "));
}

fn render_outcome(application: &Application) {
    match application.routing_outcome() {
        Some(outcome) => println!("- routed: {outcome}"),
        None => println!("- still {}", application.state),
    }
    println!("  Transition history:");
    for record in &application.history {
        println!(
            "    {} {} -> {}{}",
            record.at.with_timezone(&Local).format("%H:%M:%S%.3f"),
            record.from,
            record.to,
            record
                .note
                .as_deref()
                .map(|note| format!(" ({note})"))
                .unwrap_or_default()
        );
    }
    match serde_json::to_string_pretty(&application.status_view()) {
        Ok(json) => println!("  Status payload:\n{json}"),
        Err(err) => println!("  Status payload unavailable: {err}"),
    }
}

pub(crate) fn run_answers_normalize(args: AnswersArgs) -> Result<(), AppError> {
    let (set, canonical) = load_canonical(&args.questions, &args.answers)?;
    let stdout = io::stdout();

    if args.csv {
        export::write_csv(stdout.lock(), &canonical)?;
    } else {
        serde_json::to_writer_pretty(stdout.lock(), &canonical)?;
        println!();
    }

    let report = answers::validate(&set, &canonical);
    if !report.complete {
        eprintln!(
            "warning: {} question(s) still unanswered",
            report.missing_question_ids.len()
        );
    }
    Ok(())
}

pub(crate) fn run_answers_check(args: AnswersArgs) -> Result<(), AppError> {
    let (set, canonical) = load_canonical(&args.questions, &args.answers)?;
    let report = answers::validate(&set, &canonical);

    if args.csv {
        let mut writer = csv::Writer::from_writer(io::stdout().lock());
        writer.write_record(["question_id", "answered"])?;
        for question in set.iter() {
            let answered = !report.missing_question_ids.contains(&question.id);
            writer.write_record([question.id.as_str(), if answered { "yes" } else { "no" }])?;
        }
        writer.flush()?;
    } else {
        serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
        println!();
    }
    Ok(())
}

fn load_canonical(
    questions: &Path,
    answers_path: &Path,
) -> Result<(QuestionSet, Vec<CanonicalAnswer>), AppError> {
    let set: QuestionSet = serde_json::from_str(&fs::read_to_string(questions)?)?;
    let submission: AnswerSubmission = serde_json::from_str(&fs::read_to_string(answers_path)?)?;
    let canonical = answers::to_canonical(&set, &submission);
    Ok((set, canonical))
}
