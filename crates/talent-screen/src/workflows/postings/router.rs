use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::{self, CatalogEntry};
use super::editor::{EditorError, QuestionPatch, SuggestedOutcome};
use super::question::{OptionId, QuestionId};
use super::question_set::QuestionSet;
use super::repository::{PostingId, PostingStore};
use super::service::{DraftView, PostingEditorService, PostingError};
use crate::workflows::store::RepositoryError;

/// Router exposing the suggested catalog, publishing, and draft editing.
pub fn posting_router<P>(service: Arc<PostingEditorService<P>>) -> Router
where
    P: PostingStore + 'static,
{
    Router::new()
        .route("/api/v1/screening/catalog", get(catalog_handler))
        .route(
            "/api/v1/postings/:posting_id/questions",
            get(published_handler::<P>).put(publish_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft",
            get(draft_handler::<P>).put(save_draft_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/publish",
            post(publish_draft_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions",
            post(add_custom_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions/suggested/:catalog_id",
            post(add_suggested_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions/:question_id",
            patch(update_question_handler::<P>).delete(remove_question_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions/:question_id/move",
            post(move_question_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions/:question_id/options",
            post(add_option_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions/:question_id/options/:option_id",
            patch(update_option_handler::<P>).delete(remove_option_handler::<P>),
        )
        .route(
            "/api/v1/postings/:posting_id/draft/questions/:question_id/options/:option_id/move",
            post(move_option_handler::<P>),
        )
        .with_state(service)
}

type Service<P> = Arc<PostingEditorService<P>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoveRequest {
    pub(crate) target_index: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OptionValueRequest {
    pub(crate) value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestedResponse {
    question_id: QuestionId,
    already_added: bool,
    draft: DraftView,
}

pub(crate) async fn catalog_handler() -> Json<&'static [CatalogEntry]> {
    Json(catalog::entries())
}

pub(crate) async fn published_handler<P>(
    State(service): State<Service<P>>,
    Path(posting_id): Path<String>,
) -> Response
where
    P: PostingStore + 'static,
{
    match service.published(&PostingId(posting_id)) {
        Ok(set) => (StatusCode::OK, Json(set)).into_response(),
        Err(error) => posting_error_response(error),
    }
}

pub(crate) async fn publish_handler<P>(
    State(service): State<Service<P>>,
    Path(posting_id): Path<String>,
    Json(set): Json<QuestionSet>,
) -> Response
where
    P: PostingStore + 'static,
{
    match service.publish(&PostingId(posting_id), set) {
        Ok(set) => (StatusCode::OK, Json(set)).into_response(),
        Err(error) => posting_error_response(error),
    }
}

pub(crate) async fn draft_handler<P>(
    State(service): State<Service<P>>,
    Path(posting_id): Path<String>,
) -> Response
where
    P: PostingStore + 'static,
{
    draft_response(service.draft(&PostingId(posting_id)))
}

pub(crate) async fn save_draft_handler<P>(
    State(service): State<Service<P>>,
    Path(posting_id): Path<String>,
    Json(set): Json<QuestionSet>,
) -> Response
where
    P: PostingStore + 'static,
{
    draft_response(service.save_draft(&PostingId(posting_id), set))
}

pub(crate) async fn publish_draft_handler<P>(
    State(service): State<Service<P>>,
    Path(posting_id): Path<String>,
) -> Response
where
    P: PostingStore + 'static,
{
    match service.publish_draft(&PostingId(posting_id)) {
        Ok(set) => (StatusCode::OK, Json(set)).into_response(),
        Err(error) => posting_error_response(error),
    }
}

pub(crate) async fn add_custom_handler<P>(
    State(service): State<Service<P>>,
    Path(posting_id): Path<String>,
) -> Response
where
    P: PostingStore + 'static,
{
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor.add_custom();
        Ok(())
    });
    match result {
        Ok((draft, ())) => (StatusCode::CREATED, Json(draft)).into_response(),
        Err(error) => posting_error_response(error),
    }
}

pub(crate) async fn add_suggested_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, catalog_id)): Path<(String, String)>,
) -> Response
where
    P: PostingStore + 'static,
{
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor.add_suggested(&catalog_id)
    });
    match result {
        Ok((draft, outcome)) => {
            let (status, question_id, already_added) = match outcome {
                SuggestedOutcome::Added(id) => (StatusCode::CREATED, id, false),
                SuggestedOutcome::AlreadyAdded(id) => (StatusCode::OK, id, true),
            };
            let body = SuggestedResponse {
                question_id,
                already_added,
                draft,
            };
            (status, Json(body)).into_response()
        }
        Err(error) => posting_error_response(error),
    }
}

pub(crate) async fn update_question_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id)): Path<(String, String)>,
    Json(patch): Json<QuestionPatch>,
) -> Response
where
    P: PostingStore + 'static,
{
    let question_id = QuestionId(question_id);
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor.update(&question_id, patch).map(|_| ())
    });
    draft_response(result.map(|(draft, ())| draft))
}

pub(crate) async fn remove_question_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id)): Path<(String, String)>,
) -> Response
where
    P: PostingStore + 'static,
{
    let question_id = QuestionId(question_id);
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor.remove(&question_id).map(|_| ())
    });
    draft_response(result.map(|(draft, ())| draft))
}

pub(crate) async fn move_question_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id)): Path<(String, String)>,
    Json(request): Json<MoveRequest>,
) -> Response
where
    P: PostingStore + 'static,
{
    let question_id = QuestionId(question_id);
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor
            .reorder(&question_id, request.target_index)
            .map(|_| ())
    });
    draft_response(result.map(|(draft, ())| draft))
}

pub(crate) async fn add_option_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id)): Path<(String, String)>,
) -> Response
where
    P: PostingStore + 'static,
{
    let question_id = QuestionId(question_id);
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor.add_option(&question_id)
    });
    match result {
        Ok((draft, option_id)) => (
            StatusCode::CREATED,
            Json(json!({ "optionId": option_id, "draft": draft })),
        )
            .into_response(),
        Err(error) => posting_error_response(error),
    }
}

pub(crate) async fn update_option_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id, option_id)): Path<(String, String, String)>,
    Json(request): Json<OptionValueRequest>,
) -> Response
where
    P: PostingStore + 'static,
{
    let (question_id, option_id) = (QuestionId(question_id), OptionId(option_id));
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor
            .update_option(&question_id, &option_id, request.value)
            .map(|_| ())
    });
    draft_response(result.map(|(draft, ())| draft))
}

pub(crate) async fn remove_option_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id, option_id)): Path<(String, String, String)>,
) -> Response
where
    P: PostingStore + 'static,
{
    let (question_id, option_id) = (QuestionId(question_id), OptionId(option_id));
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor.remove_option(&question_id, &option_id).map(|_| ())
    });
    draft_response(result.map(|(draft, ())| draft))
}

pub(crate) async fn move_option_handler<P>(
    State(service): State<Service<P>>,
    Path((posting_id, question_id, option_id)): Path<(String, String, String)>,
    Json(request): Json<MoveRequest>,
) -> Response
where
    P: PostingStore + 'static,
{
    let (question_id, option_id) = (QuestionId(question_id), OptionId(option_id));
    let result = service.edit(&PostingId(posting_id), |editor| {
        editor
            .reorder_option(&question_id, &option_id, request.target_index)
            .map(|_| ())
    });
    draft_response(result.map(|(draft, ())| draft))
}

fn draft_response(result: Result<DraftView, PostingError>) -> Response {
    match result {
        Ok(draft) => (StatusCode::OK, Json(draft)).into_response(),
        Err(error) => posting_error_response(error),
    }
}

pub(crate) fn posting_error_response(error: PostingError) -> Response {
    let status = match &error {
        PostingError::Editor(
            EditorError::QuestionNotFound(_)
            | EditorError::OptionNotFound { .. }
            | EditorError::UnknownCatalogEntry(_),
        )
        | PostingError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PostingError::Editor(_) | PostingError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PostingError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &error {
        PostingError::Invalid(issues) => json!({
            "error": error.to_string(),
            "issues": issues,
        }),
        PostingError::Editor(EditorError::Invalid(issue)) => json!({
            "error": error.to_string(),
            "issues": [issue],
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, Json(payload)).into_response()
}
