//! Candidate applications: CV intake, pre-screening answers and scoring hand-off.

pub mod answers;
pub mod collaborators;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod state;

#[cfg(test)]
mod tests;

pub use answers::{
    AnswerSubmission, AnswerValue, CanonicalAnswer, CompletenessReport, MissingAnswers,
    RangeAnswer,
};
pub use collaborators::{
    CvDigitizer, DigitizationRemark, ReviewStatus, ScoreResponse, ScoredStatus, ScoringError,
    ScoringService,
};
pub use domain::{
    Application, ApplicationId, ApplicationStatusView, CandidateId, CvPayload, CvSection,
    CvUpload, FileReference, StructuredCv, TransitionRecord,
};
pub use repository::ApplicationStore;
pub use router::application_router;
pub use service::{AnswerProgress, PipelineError, ScreeningPipeline};
pub use state::{ApplicationEvent, ApplicationState, RoutingOutcome, TransitionError};
