//! Outbound services the screening pipeline depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, CvUpload, StructuredCv};
use super::state::RoutingOutcome;

/// Turns an uploaded CV file into structured data.
#[async_trait]
pub trait CvDigitizer: Send + Sync {
    async fn digitize(&self, upload: &CvUpload) -> Result<StructuredCv, DigitizationRemark>;
}

/// Human-readable reason a CV could not be digitized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{remark}")]
pub struct DigitizationRemark {
    pub remark: String,
}

impl DigitizationRemark {
    pub fn new(remark: impl Into<String>) -> Self {
        Self {
            remark: remark.into(),
        }
    }
}

/// Scores a pre-screened application and decides where it goes next.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score(&self, application_id: &ApplicationId) -> Result<ScoreResponse, ScoringError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoredStatus {
    Dropped,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    ForInterview,
    ForManualReview,
}

/// Scoring verdict as returned over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub application_status: ScoredStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
}

impl ScoreResponse {
    pub const fn dropped() -> Self {
        Self {
            application_status: ScoredStatus::Dropped,
            status: None,
        }
    }

    pub const fn active(status: ReviewStatus) -> Self {
        Self {
            application_status: ScoredStatus::Active,
            status: Some(status),
        }
    }

    /// `Active` without a review status is treated as needing manual review.
    pub const fn routing_outcome(&self) -> RoutingOutcome {
        match (self.application_status, self.status) {
            (ScoredStatus::Dropped, _) => RoutingOutcome::Dropped,
            (ScoredStatus::Active, Some(ReviewStatus::ForInterview)) => {
                RoutingOutcome::ForInterview
            }
            (ScoredStatus::Active, Some(ReviewStatus::ForManualReview) | None) => {
                RoutingOutcome::ForManualReview
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring service unreachable: {0}")]
    Transport(String),
    #[error("scoring service returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("scoring response could not be read: {0}")]
    Malformed(String),
}
