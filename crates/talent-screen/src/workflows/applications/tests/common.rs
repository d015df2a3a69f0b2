use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::ScreeningConfig;
use crate::workflows::applications::collaborators::{
    CvDigitizer, DigitizationRemark, ReviewStatus, ScoreResponse, ScoringError, ScoringService,
};
use crate::workflows::applications::domain::{
    Application, ApplicationId, CandidateId, CvSection, CvUpload, StructuredCv,
};
use crate::workflows::applications::repository::ApplicationStore;
use crate::workflows::applications::state::ApplicationState;
use crate::workflows::applications::{application_router, ScreeningPipeline};
use crate::workflows::postings::{
    PostingId, PostingStore, Question, QuestionKind, QuestionOption, QuestionSet,
};
use crate::workflows::store::RepositoryError;

pub(super) const POSTING: &str = "p-1";
pub(super) const CANDIDATE: &str = "c-1";

pub(super) fn posting_id() -> PostingId {
    PostingId::from(POSTING)
}

pub(super) fn candidate_id() -> CandidateId {
    CandidateId::from(CANDIDATE)
}

pub(super) fn application_id() -> ApplicationId {
    ApplicationId::for_candidate(&posting_id(), &candidate_id())
}

pub(super) fn question_set() -> QuestionSet {
    QuestionSet::new(vec![
        Question::new("age", "Age?", QuestionKind::ShortAnswer),
        Question::new(
            "notice",
            "Notice period",
            QuestionKind::Dropdown {
                options: vec![
                    QuestionOption::new("Immediately"),
                    QuestionOption::new("<30 days"),
                    QuestionOption::new(">30 days"),
                ],
            },
        ),
    ])
    .expect("unique ids")
}

pub(super) fn complete_answers() -> Value {
    serde_json::json!({ "age": "29", "notice": "<30 days" })
}

pub(super) fn structured_cv() -> StructuredCv {
    StructuredCv {
        full_name: Some("Dana Reyes".to_string()),
        email: Some("dana@example.test".to_string()),
        headline: None,
        sections: vec![CvSection {
            title: "Experience".to_string(),
            entries: vec!["Backend engineer, 2019-2025".to_string()],
        }],
    }
}

pub(super) fn cv_upload() -> CvUpload {
    CvUpload::new("dana.pdf", "application/pdf", b"%PDF-1.7 dana".to_vec())
}

pub(super) fn screening_config() -> ScreeningConfig {
    ScreeningConfig {
        max_cv_bytes: 1024,
        ..ScreeningConfig::default()
    }
}

#[derive(Default)]
pub(super) struct MemoryPostings {
    sets: Mutex<HashMap<PostingId, QuestionSet>>,
}

impl MemoryPostings {
    pub(super) fn publish(&self, posting_id: PostingId, set: QuestionSet) {
        self.sets
            .lock()
            .expect("posting mutex poisoned")
            .insert(posting_id, set);
    }
}

impl PostingStore for MemoryPostings {
    fn load_question_set(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
        Ok(self.sets.lock().expect("posting mutex poisoned").get(id).cloned())
    }

    fn save_question_set(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError> {
        self.publish(id.clone(), set);
        Ok(())
    }

    fn load_draft(&self, _id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
        Ok(None)
    }

    fn save_draft(&self, _id: &PostingId, _set: QuestionSet) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, Application>>,
    saves: Mutex<usize>,
}

impl MemoryApplications {
    pub(super) fn stored(&self, id: &ApplicationId) -> Option<Application> {
        self.records
            .lock()
            .expect("application mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn save_count(&self) -> usize {
        *self.saves.lock().expect("save counter poisoned")
    }
}

impl ApplicationStore for MemoryApplications {
    fn load_application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn save_application(&self, application: Application) -> Result<(), RepositoryError> {
        *self.saves.lock().expect("save counter poisoned") += 1;
        self.records
            .lock()
            .expect("application mutex poisoned")
            .insert(application.id.clone(), application);
        Ok(())
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationStore for UnavailableApplications {
    fn load_application(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_application(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Digitizer replaying queued results; succeeds with [`structured_cv`] once the queue is empty.
#[derive(Default)]
pub(super) struct ScriptedDigitizer {
    results: Mutex<VecDeque<Result<StructuredCv, DigitizationRemark>>>,
    uploads: Mutex<Vec<String>>,
}

impl ScriptedDigitizer {
    pub(super) fn failing(remark: &str) -> Self {
        let digitizer = Self::default();
        digitizer
            .results
            .lock()
            .expect("digitizer mutex poisoned")
            .push_back(Err(DigitizationRemark::new(remark)));
        digitizer
    }

    pub(super) fn uploads(&self) -> Vec<String> {
        self.uploads.lock().expect("digitizer mutex poisoned").clone()
    }
}

#[async_trait]
impl CvDigitizer for ScriptedDigitizer {
    async fn digitize(&self, upload: &CvUpload) -> Result<StructuredCv, DigitizationRemark> {
        self.uploads
            .lock()
            .expect("digitizer mutex poisoned")
            .push(upload.file_name.clone());
        self.results
            .lock()
            .expect("digitizer mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(structured_cv()))
    }
}

/// Scorer replaying queued results and recording the stored state at call time.
pub(super) struct ScriptedScorer {
    results: Mutex<VecDeque<Result<ScoreResponse, ScoringError>>>,
    store: Arc<MemoryApplications>,
    observed: Mutex<Vec<Option<ApplicationState>>>,
}

impl ScriptedScorer {
    pub(super) fn new(
        store: Arc<MemoryApplications>,
        results: Vec<Result<ScoreResponse, ScoringError>>,
    ) -> Self {
        Self {
            results: Mutex::new(results.into()),
            store,
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Stored state seen by each scoring call, in call order.
    pub(super) fn observed(&self) -> Vec<Option<ApplicationState>> {
        self.observed.lock().expect("scorer mutex poisoned").clone()
    }
}

#[async_trait]
impl ScoringService for ScriptedScorer {
    async fn score(&self, application_id: &ApplicationId) -> Result<ScoreResponse, ScoringError> {
        let stored = self
            .store
            .stored(application_id)
            .map(|application| application.state);
        self.observed
            .lock()
            .expect("scorer mutex poisoned")
            .push(stored);
        self.results
            .lock()
            .expect("scorer mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(ScoreResponse::active(ReviewStatus::ForInterview)))
    }
}

pub(super) struct Harness {
    pub(super) pipeline: Arc<ScreeningPipeline<MemoryPostings, MemoryApplications>>,
    pub(super) postings: Arc<MemoryPostings>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) digitizer: Arc<ScriptedDigitizer>,
    pub(super) scorer: Arc<ScriptedScorer>,
}

pub(super) fn harness(
    digitizer: ScriptedDigitizer,
    scores: Vec<Result<ScoreResponse, ScoringError>>,
) -> Harness {
    let postings = Arc::new(MemoryPostings::default());
    postings.publish(posting_id(), question_set());
    let applications = Arc::new(MemoryApplications::default());
    let digitizer = Arc::new(digitizer);
    let scorer = Arc::new(ScriptedScorer::new(applications.clone(), scores));
    let pipeline = Arc::new(ScreeningPipeline::new(
        postings.clone(),
        applications.clone(),
        digitizer.clone(),
        scorer.clone(),
        &screening_config(),
    ));
    Harness {
        pipeline,
        postings,
        applications,
        digitizer,
        scorer,
    }
}

pub(super) fn default_harness() -> Harness {
    harness(ScriptedDigitizer::default(), Vec::new())
}

/// Harness with an application already waiting for pre-screening answers.
pub(super) async fn prescreening_harness(
    scores: Vec<Result<ScoreResponse, ScoringError>>,
) -> Harness {
    let harness = harness(ScriptedDigitizer::default(), scores);
    harness
        .pipeline
        .begin(posting_id(), candidate_id())
        .expect("begin");
    harness
        .pipeline
        .submit_cv(&application_id(), cv_upload())
        .await
        .expect("cv digitized");
    harness
}

impl Harness {
    pub(super) fn router(&self) -> axum::Router {
        application_router(self.pipeline.clone())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
