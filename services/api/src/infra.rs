use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talent_screen::config::CollaboratorConfig;
use talent_screen::workflows::applications::{
    Application, ApplicationId, ApplicationStore, CvDigitizer, CvSection, CvUpload,
    DigitizationRemark, ReviewStatus, ScoreResponse, ScoringError, ScoringService, StructuredCv,
};
use talent_screen::workflows::postings::{PostingId, PostingStore, QuestionSet};
use talent_screen::workflows::RepositoryError;
use tracing::{info, warn};

const OCTET_STREAM: &str = "application/octet-stream";
const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPostingStore {
    published: Arc<Mutex<HashMap<PostingId, QuestionSet>>>,
    drafts: Arc<Mutex<HashMap<PostingId, QuestionSet>>>,
}

impl PostingStore for InMemoryPostingStore {
    fn load_question_set(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
        let guard = self.published.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn save_question_set(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError> {
        let mut guard = self.published.lock().map_err(poisoned)?;
        guard.insert(id.clone(), set);
        Ok(())
    }

    fn load_draft(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
        let guard = self.drafts.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn save_draft(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError> {
        let mut guard = self.drafts.lock().map_err(poisoned)?;
        guard.insert(id.clone(), set);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationStore for InMemoryApplicationStore {
    fn load_application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn save_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert(application.id.clone(), application);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store poisoned".to_string())
}

/// Content type sent to the digitizer, guessed from the file name when the client sent none.
pub(crate) fn effective_content_type(upload: &CvUpload) -> String {
    let declared = upload.content_type.trim();
    if declared.is_empty() || declared == OCTET_STREAM {
        mime_guess::from_path(&upload.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    } else {
        declared.to_string()
    }
}

/// Digitizer service reached over HTTP. The raw file is posted as the request body.
pub(crate) struct HttpCvDigitizer {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCvDigitizer {
    pub(crate) fn new(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemarkBody {
    remark: String,
}

#[async_trait]
impl CvDigitizer for HttpCvDigitizer {
    async fn digitize(&self, upload: &CvUpload) -> Result<StructuredCv, DigitizationRemark> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, effective_content_type(upload))
            .header(FILE_NAME_HEADER, upload.file_name.as_str())
            .body(upload.bytes.clone())
            .send()
            .await
            .map_err(|err| DigitizationRemark::new(format!("digitizer unreachable: {err}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<StructuredCv>()
                .await
                .map_err(|err| DigitizationRemark::new(format!("unreadable digitizer reply: {err}")));
        }

        let body = response.text().await.unwrap_or_default();
        let remark = serde_json::from_str::<RemarkBody>(&body)
            .map(|parsed| parsed.remark)
            .unwrap_or_else(|_| format!("digitizer returned {status}: {body}"));
        Err(DigitizationRemark::new(remark))
    }
}

/// Scoring service reached over HTTP.
pub(crate) struct HttpScoringService {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpScoringService {
    pub(crate) fn new(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl ScoringService for HttpScoringService {
    async fn score(&self, application_id: &ApplicationId) -> Result<ScoreResponse, ScoringError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "applicationId": application_id }))
            .send()
            .await
            .map_err(|err| ScoringError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScoringError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ScoreResponse>()
            .await
            .map_err(|err| ScoringError::Malformed(err.to_string()))
    }
}

/// Reads plain-text CVs locally: first line is the name, `Heading:` lines open sections.
#[derive(Default)]
pub(crate) struct PlainTextDigitizer;

#[async_trait]
impl CvDigitizer for PlainTextDigitizer {
    async fn digitize(&self, upload: &CvUpload) -> Result<StructuredCv, DigitizationRemark> {
        if !effective_content_type(upload).starts_with("text/") {
            return Err(DigitizationRemark::new(
                "only plain-text CVs can be read without a digitizer service",
            ));
        }
        let text = std::str::from_utf8(&upload.bytes)
            .map_err(|_| DigitizationRemark::new("cv is not valid UTF-8 text"))?;
        parse_plain_text(text)
            .ok_or_else(|| DigitizationRemark::new("cv does not contain any readable text"))
    }
}

pub(crate) fn parse_plain_text(text: &str) -> Option<StructuredCv> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let full_name = lines.next()?.to_string();

    let mut cv = StructuredCv {
        full_name: Some(full_name),
        ..StructuredCv::default()
    };
    for line in lines {
        if cv.email.is_none() && line.contains('@') && !line.contains(' ') {
            cv.email = Some(line.to_string());
        } else if let Some(title) = line.strip_suffix(':') {
            cv.sections.push(CvSection {
                title: title.trim().to_string(),
                entries: Vec::new(),
            });
        } else if let Some(section) = cv.sections.last_mut() {
            section
                .entries
                .push(line.trim_start_matches(['-', '*']).trim().to_string());
        } else if cv.headline.is_none() {
            cv.headline = Some(line.to_string());
        }
    }
    Some(cv)
}

/// Offline scorer: every application goes to a recruiter for manual review.
#[derive(Default)]
pub(crate) struct ManualReviewScorer;

#[async_trait]
impl ScoringService for ManualReviewScorer {
    async fn score(&self, _application_id: &ApplicationId) -> Result<ScoreResponse, ScoringError> {
        Ok(ScoreResponse::active(ReviewStatus::ForManualReview))
    }
}

pub(crate) struct Collaborators {
    pub(crate) digitizer: Arc<dyn CvDigitizer>,
    pub(crate) scorer: Arc<dyn ScoringService>,
}

/// HTTP collaborators where URLs are configured, local fallbacks otherwise.
pub(crate) fn collaborators(config: &CollaboratorConfig) -> Result<Collaborators, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;

    let digitizer: Arc<dyn CvDigitizer> = match &config.digitizer_url {
        Some(url) => {
            info!(%url, "using remote cv digitizer");
            Arc::new(HttpCvDigitizer::new(url.clone(), client.clone()))
        }
        None => {
            warn!("no digitizer configured; only plain-text CVs will be accepted");
            Arc::new(PlainTextDigitizer)
        }
    };

    let scorer: Arc<dyn ScoringService> = match &config.scoring_url {
        Some(url) => {
            info!(%url, "using remote scoring service");
            Arc::new(HttpScoringService::new(url.clone(), client))
        }
        None => {
            warn!("no scoring service configured; applications go to manual review");
            Arc::new(ManualReviewScorer)
        }
    };

    Ok(Collaborators { digitizer, scorer })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_cv_is_structured() {
        let cv = parse_plain_text(
            "Sam Cruz\nsam@example.test\nBackend engineer\n\nExperience:\n- Acme, 2020-2025\nSkills:\n* Rust\n",
        )
        .expect("readable");

        assert_eq!(cv.full_name.as_deref(), Some("Sam Cruz"));
        assert_eq!(cv.email.as_deref(), Some("sam@example.test"));
        assert_eq!(cv.headline.as_deref(), Some("Backend engineer"));
        assert_eq!(cv.sections.len(), 2);
        assert_eq!(cv.sections[0].entries, vec!["Acme, 2020-2025".to_string()]);
        assert_eq!(cv.sections[1].title, "Skills");
    }

    #[test]
    fn blank_text_is_unreadable() {
        assert!(parse_plain_text("  \n\n").is_none());
    }

    #[test]
    fn content_type_guessed_from_file_name() {
        let upload = CvUpload::new("resume.pdf", OCTET_STREAM, b"%PDF".to_vec());
        assert_eq!(effective_content_type(&upload), "application/pdf");

        let declared = CvUpload::new("resume.bin", "text/plain", b"Sam".to_vec());
        assert_eq!(effective_content_type(&declared), "text/plain");
    }

    #[tokio::test]
    async fn plain_text_digitizer_rejects_binary_files() {
        let remark = PlainTextDigitizer
            .digitize(&CvUpload::new("resume.pdf", "", b"%PDF-1.7".to_vec()))
            .await
            .expect_err("pdf needs the remote digitizer");
        assert!(remark.remark.contains("plain-text"));
    }

    #[test]
    fn stores_round_trip_records() {
        let store = InMemoryPostingStore::default();
        let id = PostingId::from("p-1");
        store
            .save_question_set(&id, QuestionSet::default())
            .expect("saved");
        assert_eq!(
            store.load_question_set(&id).expect("loaded"),
            Some(QuestionSet::default())
        );
        assert_eq!(store.load_draft(&id).expect("loaded"), None);
    }
}
