use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::CanonicalAnswer;
use super::state::{ApplicationEvent, ApplicationState, RoutingOutcome, TransitionError};
use crate::workflows::postings::PostingId;

/// Candidate identifier supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One application per candidate per posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn for_candidate(posting_id: &PostingId, candidate_id: &CandidateId) -> Self {
        Self(format!("{posting_id}:{candidate_id}"))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured CV as produced by the digitizer or supplied for reuse/edit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredCv {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default)]
    pub sections: Vec<CvSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSection {
    pub title: String,
    #[serde(default)]
    pub entries: Vec<String>,
}

/// Raw CV file as received from the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CvUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn reference(&self) -> FileReference {
        FileReference {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size_bytes: self.size(),
        }
    }
}

/// Metadata kept for an uploaded file while digitization is outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
}

/// CV attached to an application. Each write replaces the previous payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CvPayload {
    Digitized(StructuredCv),
    Uploaded(FileReference),
}

impl CvPayload {
    pub const fn label(&self) -> &'static str {
        match self {
            CvPayload::Digitized(_) => "digitized",
            CvPayload::Uploaded(_) => "uploaded",
        }
    }

    pub fn structured(&self) -> Option<&StructuredCv> {
        match self {
            CvPayload::Digitized(cv) => Some(cv),
            CvPayload::Uploaded(_) => None,
        }
    }
}

/// Audit entry appended for every accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: ApplicationState,
    pub to: ApplicationState,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Stored application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub posting_id: PostingId,
    pub candidate_id: CandidateId,
    pub state: ApplicationState,
    pub cv: Option<CvPayload>,
    pub answers: Vec<CanonicalAnswer>,
    pub history: Vec<TransitionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(posting_id: PostingId, candidate_id: CandidateId, now: DateTime<Utc>) -> Self {
        Self {
            id: ApplicationId::for_candidate(&posting_id, &candidate_id),
            posting_id,
            candidate_id,
            state: ApplicationState::AwaitingCv,
            cv: None,
            answers: Vec::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply `event` and record the transition. The record is unchanged on error.
    pub fn transition(
        &mut self,
        event: ApplicationEvent,
        now: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<ApplicationState, TransitionError> {
        let from = self.state;
        let to = from.apply(event)?;
        self.state = to;
        self.updated_at = now;
        self.history.push(TransitionRecord {
            from,
            to,
            at: now,
            note,
        });
        Ok(to)
    }

    pub fn routing_outcome(&self) -> Option<RoutingOutcome> {
        match self.state {
            ApplicationState::Routed(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            posting_id: self.posting_id.clone(),
            candidate_id: self.candidate_id.clone(),
            state: self.state.label(),
            routing_outcome: self.routing_outcome().map(RoutingOutcome::label),
            cv: self.cv.as_ref().map(CvPayload::label),
            answers: self.answers.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Candidate-facing view of an application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub posting_id: PostingId,
    pub candidate_id: CandidateId,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_outcome: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<&'static str>,
    pub answers: Vec<CanonicalAnswer>,
    pub updated_at: DateTime<Utc>,
}
