//! Application lifecycle as a pure state machine.
//!
//! ```text
//! AwaitingCv --CvSubmitted--> DigitizingCv --DigitizationSucceeded--> AwaitingPreScreening
//!      |                          |  ^  |
//!      |                          |  +--+ CvSubmitted (resubmission replaces the pending file)
//!      |                          +--DigitizationFailed--> AwaitingCv
//!      +--CvReused--> AwaitingPreScreening --AnswersComplete--> Screening
//! Screening --ScoringSucceeded--> Routed(outcome)
//! Screening --ScoringFailed--> AwaitingPreScreening
//! ```
//!
//! `Routed` is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::answers::CompleteAnswers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingOutcome {
    Dropped,
    ForInterview,
    ForManualReview,
}

impl RoutingOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            RoutingOutcome::Dropped => "dropped",
            RoutingOutcome::ForInterview => "for_interview",
            RoutingOutcome::ForManualReview => "for_manual_review",
        }
    }
}

impl fmt::Display for RoutingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum ApplicationState {
    AwaitingCv,
    DigitizingCv,
    AwaitingPreScreening,
    Screening,
    Routed(RoutingOutcome),
}

impl ApplicationState {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationState::AwaitingCv => "awaiting_cv",
            ApplicationState::DigitizingCv => "digitizing_cv",
            ApplicationState::AwaitingPreScreening => "awaiting_pre_screening",
            ApplicationState::Screening => "screening",
            ApplicationState::Routed(_) => "routed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationState::Routed(_))
    }

    /// Next state for `event`, or the reason it is not allowed from here.
    pub fn apply(self, event: ApplicationEvent) -> Result<ApplicationState, TransitionError> {
        use ApplicationEvent as E;
        use ApplicationState as S;

        match (self, event) {
            (S::Routed(outcome), _) => Err(TransitionError::AlreadyProcessed(outcome)),
            (S::AwaitingCv | S::DigitizingCv, E::CvSubmitted) => Ok(S::DigitizingCv),
            (S::DigitizingCv, E::DigitizationSucceeded) => Ok(S::AwaitingPreScreening),
            (S::DigitizingCv, E::DigitizationFailed) => Ok(S::AwaitingCv),
            (S::AwaitingCv, E::CvReused) => Ok(S::AwaitingPreScreening),
            (S::AwaitingPreScreening, E::AnswersComplete(_)) => Ok(S::Screening),
            (S::Screening, E::ScoringSucceeded(outcome)) => Ok(S::Routed(outcome)),
            (S::Screening, E::ScoringFailed) => Ok(S::AwaitingPreScreening),
            (state, event) => Err(TransitionError::NotAllowed {
                state: state.label(),
                event: event.label(),
            }),
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationState::Routed(outcome) => write!(f, "routed ({outcome})"),
            state => f.write_str(state.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationEvent {
    CvSubmitted,
    DigitizationSucceeded,
    DigitizationFailed,
    CvReused,
    /// Only constructible from a complete answer check.
    AnswersComplete(CompleteAnswers),
    ScoringSucceeded(RoutingOutcome),
    ScoringFailed,
}

impl ApplicationEvent {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationEvent::CvSubmitted => "cv_submitted",
            ApplicationEvent::DigitizationSucceeded => "digitization_succeeded",
            ApplicationEvent::DigitizationFailed => "digitization_failed",
            ApplicationEvent::CvReused => "cv_reused",
            ApplicationEvent::AnswersComplete(_) => "answers_complete",
            ApplicationEvent::ScoringSucceeded(_) => "scoring_succeeded",
            ApplicationEvent::ScoringFailed => "scoring_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application already processed with outcome {0}")]
    AlreadyProcessed(RoutingOutcome),
    #[error("{event} is not allowed while the application is {state}")]
    NotAllowed {
        state: &'static str,
        event: &'static str,
    },
}
