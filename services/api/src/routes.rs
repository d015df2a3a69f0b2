use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use talent_screen::workflows::applications::{
    application_router, ApplicationStore, ScreeningPipeline,
};
use talent_screen::workflows::postings::{posting_router, PostingEditorService, PostingStore};

pub(crate) fn with_screening_routes<P, A>(
    editor: Arc<PostingEditorService<P>>,
    pipeline: Arc<ScreeningPipeline<P, A>>,
) -> axum::Router
where
    P: PostingStore + 'static,
    A: ApplicationStore + 'static,
{
    posting_router(editor)
        .merge(application_router(pipeline))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        InMemoryApplicationStore, InMemoryPostingStore, ManualReviewScorer, PlainTextDigitizer,
    };
    use axum::body::Body;
    use axum::http::Request;
    use talent_screen::config::ScreeningConfig;
    use talent_screen::workflows::postings::Currency;
    use tower::ServiceExt;

    fn router() -> axum::Router {
        let postings = Arc::new(InMemoryPostingStore::default());
        let editor = Arc::new(PostingEditorService::new(postings.clone(), Currency::Php));
        let pipeline = Arc::new(ScreeningPipeline::new(
            postings,
            Arc::new(InMemoryApplicationStore::default()),
            Arc::new(PlainTextDigitizer),
            Arc::new(ManualReviewScorer),
            &ScreeningConfig::default(),
        ));
        with_screening_routes(editor, pipeline)
    }

    async fn call(router: axum::Router, method: &str, uri: &str, body: Body) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "text/plain")
                    .body(body)
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json payload"))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn offline_stack_routes_to_manual_review() {
        let router = router();
        let base = "/api/v1/postings/p-1/applications/c-1";

        let (status, _) = call(router.clone(), "POST", base, Body::empty()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, cv) = call(
            router.clone(),
            "POST",
            &format!("{base}/cv?fileName=cv.txt"),
            Body::from("Sam Cruz\nsam@example.test"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cv["state"], "awaiting_pre_screening");

        let (status, routed) = call(
            router,
            "POST",
            &format!("{base}/advance"),
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(routed["routingOutcome"], "for_manual_review");
    }

    #[tokio::test]
    async fn offline_digitizer_remark_reaches_candidate() {
        let router = router();
        let base = "/api/v1/postings/p-1/applications/c-2";
        call(router.clone(), "POST", base, Body::empty()).await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("{base}/cv?fileName=cv.pdf"))
                    .header(header::CONTENT_TYPE, "application/pdf")
                    .body(Body::from(b"%PDF-1.7".to_vec()))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
