//! Recruiter-side scenarios: building a question set through the draft routes and publishing it.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::response::Response;
    use serde_json::Value;

    use talent_screen::workflows::postings::{
        posting_router, Currency, PostingEditorService, PostingId, PostingStore, QuestionSet,
    };
    use talent_screen::workflows::RepositoryError;

    #[derive(Default)]
    pub(super) struct MemoryPostings {
        published: Mutex<HashMap<PostingId, QuestionSet>>,
        drafts: Mutex<HashMap<PostingId, QuestionSet>>,
    }

    impl MemoryPostings {
        pub(super) fn published(&self, id: &str) -> Option<QuestionSet> {
            self.published
                .lock()
                .expect("posting mutex poisoned")
                .get(&PostingId::from(id))
                .cloned()
        }
    }

    impl PostingStore for MemoryPostings {
        fn load_question_set(
            &self,
            id: &PostingId,
        ) -> Result<Option<QuestionSet>, RepositoryError> {
            Ok(self
                .published
                .lock()
                .expect("posting mutex poisoned")
                .get(id)
                .cloned())
        }

        fn save_question_set(
            &self,
            id: &PostingId,
            set: QuestionSet,
        ) -> Result<(), RepositoryError> {
            self.published
                .lock()
                .expect("posting mutex poisoned")
                .insert(id.clone(), set);
            Ok(())
        }

        fn load_draft(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
            Ok(self
                .drafts
                .lock()
                .expect("draft mutex poisoned")
                .get(id)
                .cloned())
        }

        fn save_draft(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError> {
            self.drafts
                .lock()
                .expect("draft mutex poisoned")
                .insert(id.clone(), set);
            Ok(())
        }
    }

    pub(super) fn router() -> (axum::Router, Arc<MemoryPostings>) {
        let store = Arc::new(MemoryPostings::default());
        let service = Arc::new(PostingEditorService::new(store.clone(), Currency::Php));
        (posting_router(service), store)
    }

    pub(super) fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("json body")))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    pub(super) async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{read_json_body, request, router};

const DRAFT: &str = "/api/v1/postings/p-1/draft";

#[tokio::test]
async fn catalog_lists_suggested_questions() {
    let (router, _) = router();
    let response = router
        .oneshot(request("GET", "/api/v1/screening/catalog", None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload.as_array().expect("array");
    assert!(entries
        .iter()
        .any(|entry| entry["catalogId"] == "notice-period"
            && entry["options"] == json!(["Immediately", "<30 days", ">30 days"])));
}

#[tokio::test]
async fn suggested_question_is_added_once() {
    let (router, _) = router();
    let first = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("{DRAFT}/questions/suggested/notice-period"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = read_json_body(first).await;

    let second = router
        .oneshot(request(
            "POST",
            &format!("{DRAFT}/questions/suggested/notice-period"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::OK);
    let second = read_json_body(second).await;

    assert_eq!(second["alreadyAdded"], true);
    assert_eq!(second["questionId"], first["questionId"]);
    assert_eq!(
        second["draft"]["questions"].as_array().map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn unknown_catalog_entry_is_not_found() {
    let (router, _) = router();
    let response = router
        .oneshot(request(
            "POST",
            &format!("{DRAFT}/questions/suggested/shoe-size"),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_question_starts_incomplete_and_can_be_filled() {
    let (router, _) = router();
    let created = router
        .clone()
        .oneshot(request("POST", &format!("{DRAFT}/questions"), None))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = read_json_body(created).await;

    let question = &created["draft"]["questions"][0];
    let question_id = question["id"].as_str().expect("id").to_string();
    assert_eq!(question["variant"], "dropdown");
    assert_eq!(question["options"].as_array().map(Vec::len), Some(1));
    assert_eq!(created["draft"]["incompleteQuestionIds"], json!([question_id]));

    let updated = router
        .oneshot(request(
            "PATCH",
            &format!("{DRAFT}/questions/{question_id}"),
            Some(json!({ "text": "Preferred shift", "variant": "short-answer" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = read_json_body(updated).await;

    let question = &updated["questions"][0];
    assert_eq!(question["text"], "Preferred shift");
    assert_eq!(question["variant"], "short-answer");
    assert!(question.get("options").is_none());
    assert_eq!(updated["incompleteQuestionIds"], json!([]));
}

#[tokio::test]
async fn switching_to_range_uses_posting_currency() {
    let (router, _) = router();
    let created = router
        .clone()
        .oneshot(request("POST", &format!("{DRAFT}/questions"), None))
        .await
        .expect("route executes");
    let created = read_json_body(created).await;
    let question_id = created["draft"]["questions"][0]["id"]
        .as_str()
        .expect("id")
        .to_string();

    let updated = router
        .oneshot(request(
            "PATCH",
            &format!("{DRAFT}/questions/{question_id}"),
            Some(json!({ "variant": "range", "rangeType": "currency" })),
        ))
        .await
        .expect("route executes");
    let updated = read_json_body(updated).await;
    let question = &updated["questions"][0];
    assert_eq!(question["variant"], "range");
    assert_eq!(question["rangeType"], "currency");
    assert_eq!(question["currency"], "PHP");
}

#[tokio::test]
async fn publishing_rejects_blank_options() {
    let (router, store) = router();
    let response = router
        .oneshot(request(
            "PUT",
            "/api/v1/postings/p-1/questions",
            Some(json!([
                {
                    "id": "q1",
                    "text": "Notice period",
                    "variant": "dropdown",
                    "origin": "custom",
                    "options": [{ "id": "o1", "value": " " }],
                }
            ])),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["issues"][0]["code"], "blank_option");
    assert_eq!(payload["issues"][0]["questionId"], "q1");
    assert!(store.published("p-1").is_none());
}

#[tokio::test]
async fn publish_draft_makes_questions_answerable() {
    let (router, store) = router();
    router
        .clone()
        .oneshot(request(
            "POST",
            &format!("{DRAFT}/questions/suggested/years-experience"),
            None,
        ))
        .await
        .expect("route executes");

    let response = router
        .clone()
        .oneshot(request("POST", &format!("{DRAFT}/publish"), None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let published = store.published("p-1").expect("published");
    assert_eq!(published.len(), 1);

    let fetched = router
        .oneshot(request("GET", "/api/v1/postings/p-1/questions", None))
        .await
        .expect("route executes");
    let payload = read_json_body(fetched).await;
    assert_eq!(payload[0]["catalogId"], "years-experience");
    assert_eq!(payload[0]["origin"], "suggested");
}

#[tokio::test]
async fn unpublished_posting_is_not_found() {
    let (router, _) = router();
    let response = router
        .oneshot(request("GET", "/api/v1/postings/nope/questions", None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
