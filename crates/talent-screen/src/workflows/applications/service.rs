use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::answers::{self, AnswerSubmission, CompletenessReport, MissingAnswers};
use super::collaborators::{CvDigitizer, ScoringError, ScoringService};
use super::domain::{Application, ApplicationId, CandidateId, CvPayload, CvUpload, StructuredCv};
use super::repository::ApplicationStore;
use super::state::{ApplicationEvent, ApplicationState, RoutingOutcome, TransitionError};
use crate::config::ScreeningConfig;
use crate::workflows::postings::{PostingId, PostingStore, QuestionId, QuestionSet};
use crate::workflows::store::RepositoryError;
use crate::workflows::validation::ValidationError;

/// Answers saved so far plus how far they are from complete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerProgress {
    pub application: Application,
    pub completeness: CompletenessReport,
}

/// Drives an application from CV intake through pre-screening to a routing outcome.
pub struct ScreeningPipeline<P, A> {
    postings: Arc<P>,
    applications: Arc<A>,
    digitizer: Arc<dyn CvDigitizer>,
    scorer: Arc<dyn ScoringService>,
    max_cv_bytes: usize,
}

impl<P, A> ScreeningPipeline<P, A>
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    pub fn new(
        postings: Arc<P>,
        applications: Arc<A>,
        digitizer: Arc<dyn CvDigitizer>,
        scorer: Arc<dyn ScoringService>,
        config: &ScreeningConfig,
    ) -> Self {
        Self {
            postings,
            applications,
            digitizer,
            scorer,
            max_cv_bytes: config.max_cv_bytes,
        }
    }

    /// Start an application, or return the existing one for this candidate and posting.
    pub fn begin(
        &self,
        posting_id: PostingId,
        candidate_id: CandidateId,
    ) -> Result<Application, PipelineError> {
        let id = ApplicationId::for_candidate(&posting_id, &candidate_id);
        if let Some(existing) = self.applications.load_application(&id)? {
            debug!(application_id = %id, "application already started");
            return Ok(existing);
        }

        let application = Application::new(posting_id, candidate_id, Utc::now());
        self.applications.save_application(application.clone())?;
        info!(application_id = %application.id, "application started");
        Ok(application)
    }

    pub fn max_cv_bytes(&self) -> usize {
        self.max_cv_bytes
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, PipelineError> {
        self.load(id)
    }

    /// Completeness of the saved answers against the posting's current question set.
    pub fn completeness(&self, id: &ApplicationId) -> Result<CompletenessReport, PipelineError> {
        let application = self.load(id)?;
        let set = self.question_set(&application.posting_id)?;
        Ok(answers::validate(&set, &application.answers))
    }

    /// Upload a CV file and digitize it.
    ///
    /// `DigitizingCv` is saved before the digitizer is called. On failure the application
    /// returns to `AwaitingCv` with its previous CV, and the remark is returned to the caller.
    pub async fn submit_cv(
        &self,
        id: &ApplicationId,
        upload: CvUpload,
    ) -> Result<Application, PipelineError> {
        let mut application = self.load(id)?;
        application.state.apply(ApplicationEvent::CvSubmitted)?;

        if upload.bytes.is_empty() {
            return Err(ValidationError::EmptyCv.into());
        }
        if upload.size() > self.max_cv_bytes {
            return Err(ValidationError::CvTooLarge {
                size: upload.size(),
                limit: self.max_cv_bytes,
            }
            .into());
        }

        let previous_cv = application.cv.clone();
        application.transition(
            ApplicationEvent::CvSubmitted,
            Utc::now(),
            Some(upload.file_name.clone()),
        )?;
        application.cv = Some(CvPayload::Uploaded(upload.reference()));
        self.applications.save_application(application.clone())?;
        debug!(
            application_id = %id,
            file_name = %upload.file_name,
            size = upload.size(),
            "cv submitted for digitization"
        );

        match self.digitizer.digitize(&upload).await {
            Ok(cv) => {
                application.cv = Some(CvPayload::Digitized(cv));
                application.transition(ApplicationEvent::DigitizationSucceeded, Utc::now(), None)?;
                self.applications.save_application(application.clone())?;
                info!(application_id = %id, "cv digitized");
                Ok(application)
            }
            Err(remark) => {
                warn!(application_id = %id, remark = %remark, "cv digitization failed");
                application.cv = previous_cv;
                application.transition(
                    ApplicationEvent::DigitizationFailed,
                    Utc::now(),
                    Some(remark.remark.clone()),
                )?;
                self.applications.save_application(application)?;
                Err(PipelineError::DigitizationFailure {
                    remark: remark.remark,
                })
            }
        }
    }

    /// Reuse a CV already on file, skipping digitization.
    pub fn reuse_cv(
        &self,
        id: &ApplicationId,
        cv: StructuredCv,
    ) -> Result<Application, PipelineError> {
        let mut application = self.load(id)?;
        application.transition(
            ApplicationEvent::CvReused,
            Utc::now(),
            Some("existing cv reused".to_string()),
        )?;
        application.cv = Some(CvPayload::Digitized(cv));
        self.applications.save_application(application.clone())?;
        info!(application_id = %id, "existing cv reused");
        Ok(application)
    }

    /// Replace the digitized CV with the candidate's corrections. Whole-payload replace.
    pub fn edit_cv(
        &self,
        id: &ApplicationId,
        cv: StructuredCv,
    ) -> Result<Application, PipelineError> {
        let mut application = self.load(id)?;
        ensure_state(&application, ApplicationState::AwaitingPreScreening, "edit_cv")?;
        application.cv = Some(CvPayload::Digitized(cv));
        application.updated_at = Utc::now();
        self.applications.save_application(application.clone())?;
        debug!(application_id = %id, "cv edited");
        Ok(application)
    }

    /// Normalize and store answers without advancing.
    pub fn save_answers(
        &self,
        id: &ApplicationId,
        submission: &AnswerSubmission,
    ) -> Result<AnswerProgress, PipelineError> {
        let mut application = self.load(id)?;
        ensure_state(&application, ApplicationState::AwaitingPreScreening, "save_answers")?;
        let set = self.question_set(&application.posting_id)?;

        application.answers = answers::to_canonical(&set, submission);
        application.updated_at = Utc::now();
        self.applications.save_application(application.clone())?;

        let completeness = answers::validate(&set, &application.answers);
        debug!(
            application_id = %id,
            missing = completeness.missing_question_ids.len(),
            "answers saved"
        );
        Ok(AnswerProgress {
            application,
            completeness,
        })
    }

    /// Submit pre-screening answers and hand the application to the scoring service.
    ///
    /// Answers are saved before completeness is checked, so an incomplete submission keeps
    /// the candidate's progress. The stored record stays `AwaitingPreScreening` until the
    /// scoring call returns; a failed call leaves it there with a recorded attempt.
    pub async fn advance(
        &self,
        id: &ApplicationId,
        submission: Option<AnswerSubmission>,
    ) -> Result<Application, PipelineError> {
        let mut application = self.load(id)?;
        ensure_state(&application, ApplicationState::AwaitingPreScreening, "advance")?;
        let set = self.question_set(&application.posting_id)?;

        let submission =
            submission.unwrap_or_else(|| AnswerSubmission::Canonical(application.answers.clone()));
        application.answers = answers::to_canonical(&set, &submission);
        application.updated_at = Utc::now();
        self.applications.save_application(application.clone())?;

        let report = answers::validate(&set, &application.answers);
        let verified = match report.verify() {
            Ok(verified) => verified,
            Err(missing) => {
                info!(
                    application_id = %id,
                    first_missing = %missing.first_missing,
                    missing = missing.missing.len(),
                    "answers incomplete"
                );
                return Err(missing.into());
            }
        };

        application.transition(ApplicationEvent::AnswersComplete(verified), Utc::now(), None)?;
        info!(application_id = %id, "application sent for scoring");

        match self.scorer.score(id).await {
            Ok(response) => {
                let outcome = response.routing_outcome();
                application.transition(
                    ApplicationEvent::ScoringSucceeded(outcome),
                    Utc::now(),
                    None,
                )?;
                self.applications.save_application(application.clone())?;
                info!(application_id = %id, outcome = %outcome, "application routed");
                Ok(application)
            }
            Err(error) => {
                warn!(application_id = %id, error = %error, "scoring call failed");
                application.transition(
                    ApplicationEvent::ScoringFailed,
                    Utc::now(),
                    Some(error.to_string()),
                )?;
                self.applications.save_application(application)?;
                Err(PipelineError::ScoringCallFailure(error))
            }
        }
    }

    fn load(&self, id: &ApplicationId) -> Result<Application, PipelineError> {
        self.applications
            .load_application(id)?
            .ok_or(PipelineError::Repository(RepositoryError::NotFound))
    }

    /// Published set for the posting. A posting without one has no questions to answer.
    fn question_set(&self, posting_id: &PostingId) -> Result<QuestionSet, PipelineError> {
        Ok(self
            .postings
            .load_question_set(posting_id)?
            .unwrap_or_default())
    }
}

fn ensure_state(
    application: &Application,
    expected: ApplicationState,
    action: &'static str,
) -> Result<(), PipelineError> {
    match application.state {
        ApplicationState::Routed(outcome) => {
            Err(PipelineError::ApplicationAlreadyProcessed(outcome))
        }
        state if state == expected => Ok(()),
        state => Err(PipelineError::InvalidTransition {
            state: state.label(),
            action,
        }),
    }
}

/// Error raised by the screening pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("answers incomplete: question {first_missing} is unanswered")]
    IncompleteAnswers {
        first_missing: QuestionId,
        missing: Vec<QuestionId>,
    },
    #[error("cv digitization failed: {remark}")]
    DigitizationFailure { remark: String },
    #[error(transparent)]
    ScoringCallFailure(ScoringError),
    #[error("application already processed with outcome {0}")]
    ApplicationAlreadyProcessed(RoutingOutcome),
    #[error("{action} is not allowed while the application is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<MissingAnswers> for PipelineError {
    fn from(missing: MissingAnswers) -> Self {
        PipelineError::IncompleteAnswers {
            first_missing: missing.first_missing,
            missing: missing.missing,
        }
    }
}

impl From<TransitionError> for PipelineError {
    fn from(error: TransitionError) -> Self {
        match error {
            TransitionError::AlreadyProcessed(outcome) => {
                PipelineError::ApplicationAlreadyProcessed(outcome)
            }
            TransitionError::NotAllowed { state, event } => PipelineError::InvalidTransition {
                state,
                action: event,
            },
        }
    }
}
