use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::answers::AnswerSubmission;
use super::domain::{Application, ApplicationId, CandidateId, CvUpload, StructuredCv};
use super::repository::ApplicationStore;
use super::service::{PipelineError, ScreeningPipeline};
use crate::workflows::postings::{PostingId, PostingStore};
use crate::workflows::store::RepositoryError;

const DEFAULT_CV_FILE_NAME: &str = "cv";
const DEFAULT_CV_CONTENT_TYPE: &str = "application/octet-stream";

/// Router exposing candidate intake, CV handling, answers and advancement.
///
/// Request bodies above the configured CV limit are refused with 413 before reaching the
/// pipeline.
pub fn application_router<P, A>(pipeline: Arc<ScreeningPipeline<P, A>>) -> Router
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let body_limit = pipeline.max_cv_bytes();
    Router::new()
        .route(
            "/api/v1/postings/:posting_id/applications/:candidate_id",
            post(begin_handler::<P, A>).get(status_handler::<P, A>),
        )
        .route(
            "/api/v1/postings/:posting_id/applications/:candidate_id/cv",
            post(submit_cv_handler::<P, A>).put(edit_cv_handler::<P, A>),
        )
        .route(
            "/api/v1/postings/:posting_id/applications/:candidate_id/cv/reuse",
            post(reuse_cv_handler::<P, A>),
        )
        .route(
            "/api/v1/postings/:posting_id/applications/:candidate_id/answers",
            put(save_answers_handler::<P, A>),
        )
        .route(
            "/api/v1/postings/:posting_id/applications/:candidate_id/advance",
            post(advance_handler::<P, A>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(pipeline)
}

type Pipeline<P, A> = Arc<ScreeningPipeline<P, A>>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CvUploadQuery {
    pub(crate) file_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdvanceRequest {
    #[serde(default)]
    pub(crate) answers: Option<AnswerSubmission>,
}

fn application_id(posting_id: &str, candidate_id: &str) -> ApplicationId {
    ApplicationId::for_candidate(&PostingId::from(posting_id), &CandidateId::from(candidate_id))
}

pub(crate) async fn begin_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    match pipeline.begin(PostingId(posting_id), CandidateId(candidate_id)) {
        Ok(application) => (StatusCode::OK, Json(application.status_view())).into_response(),
        Err(error) => pipeline_error_response(error),
    }
}

pub(crate) async fn status_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let id = application_id(&posting_id, &candidate_id);
    let result = pipeline
        .get(&id)
        .and_then(|application| Ok((application, pipeline.completeness(&id)?)));
    match result {
        Ok((application, completeness)) => (
            StatusCode::OK,
            Json(json!({
                "application": application.status_view(),
                "completeness": completeness,
            })),
        )
            .into_response(),
        Err(error) => pipeline_error_response(error),
    }
}

pub(crate) async fn submit_cv_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
    Query(query): Query<CvUploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_CV_CONTENT_TYPE);
    let upload = CvUpload::new(
        query
            .file_name
            .unwrap_or_else(|| DEFAULT_CV_FILE_NAME.to_string()),
        content_type,
        body.to_vec(),
    );

    let id = application_id(&posting_id, &candidate_id);
    application_response(pipeline.submit_cv(&id, upload).await)
}

pub(crate) async fn reuse_cv_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
    Json(cv): Json<StructuredCv>,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let id = application_id(&posting_id, &candidate_id);
    application_response(pipeline.reuse_cv(&id, cv))
}

pub(crate) async fn edit_cv_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
    Json(cv): Json<StructuredCv>,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let id = application_id(&posting_id, &candidate_id);
    application_response(pipeline.edit_cv(&id, cv))
}

pub(crate) async fn save_answers_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
    Json(submission): Json<AnswerSubmission>,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let id = application_id(&posting_id, &candidate_id);
    match pipeline.save_answers(&id, &submission) {
        Ok(progress) => (
            StatusCode::OK,
            Json(json!({
                "application": progress.application.status_view(),
                "completeness": progress.completeness,
            })),
        )
            .into_response(),
        Err(error) => pipeline_error_response(error),
    }
}

/// An empty body advances with the answers already saved.
pub(crate) async fn advance_handler<P, A>(
    State(pipeline): State<Pipeline<P, A>>,
    Path((posting_id, candidate_id)): Path<(String, String)>,
    body: Bytes,
) -> Response
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        AdvanceRequest::default()
    } else {
        match serde_json::from_slice::<AdvanceRequest>(&body) {
            Ok(request) => request,
            Err(error) => {
                let payload = json!({ "error": format!("invalid advance request: {error}") });
                return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
            }
        }
    };

    let id = application_id(&posting_id, &candidate_id);
    application_response(pipeline.advance(&id, request.answers).await)
}

fn application_response(result: Result<Application, PipelineError>) -> Response {
    match result {
        Ok(application) => (StatusCode::OK, Json(application.status_view())).into_response(),
        Err(error) => pipeline_error_response(error),
    }
}

pub(crate) fn pipeline_error_response(error: PipelineError) -> Response {
    let status = match &error {
        PipelineError::Validation(_)
        | PipelineError::IncompleteAnswers { .. }
        | PipelineError::DigitizationFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::ApplicationAlreadyProcessed(_) | PipelineError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        PipelineError::ScoringCallFailure(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PipelineError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &error {
        PipelineError::Validation(issue) => json!({
            "error": error.to_string(),
            "issues": [issue],
        }),
        PipelineError::IncompleteAnswers {
            first_missing,
            missing,
        } => json!({
            "error": error.to_string(),
            "firstMissingQuestionId": first_missing,
            "missingQuestionIds": missing,
        }),
        PipelineError::DigitizationFailure { remark } => json!({
            "error": error.to_string(),
            "remark": remark,
        }),
        PipelineError::ApplicationAlreadyProcessed(outcome) => json!({
            "error": error.to_string(),
            "routingOutcome": outcome.label(),
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, Json(payload)).into_response()
}
