use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use axum::http::{header, StatusCode};
use tower::ServiceExt;

use super::common::*;
use crate::forms::{
    form_router, read_back, FormCatalog, FormFillService, InMemoryTemplateStore, TemplateError,
    TemplateStore, UnknownFieldPolicy,
};

/// Records which thread each template load happens on.
struct ThreadRecordingStore {
    inner: InMemoryTemplateStore,
    threads: Mutex<Vec<ThreadId>>,
}

impl TemplateStore for ThreadRecordingStore {
    fn load(&self, form_id: &str) -> Result<Arc<[u8]>, TemplateError> {
        self.threads
            .lock()
            .expect("thread log lock")
            .push(thread::current().id());
        self.inner.load(form_id)
    }
}

#[tokio::test]
async fn fill_route_returns_pdf_attachment() {
    let router = form_router(n400_service());

    let response = router
        .oneshot(fill_request(
            "/fill/n-400",
            r#"{"lastName":" smith ","alienNumber":"123456789"}"#,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/pdf"[..])
    );
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.as_bytes()),
        Some(&b"attachment; filename=\"N-400.pdf\""[..])
    );

    let values = read_back(&read_body(response).await).expect("pdf body");
    assert_eq!(values.get(SURNAME_FIELD).map(String::as_str), Some("SMITH"));
}

#[tokio::test]
async fn fill_route_accepts_empty_body_without_content_type() {
    let router = form_router(n400_service());
    let request = axum::http::Request::post("/fill/n-400")
        .body(axum::body::Body::empty())
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_form_returns_not_found() {
    let router = form_router(n400_service());
    let response = router
        .oneshot(fill_request("/fill/i-130", "{}"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "template_not_found");
}

#[tokio::test]
async fn malformed_body_returns_bad_request() {
    let router = form_router(n400_service());
    let response = router
        .oneshot(fill_request("/fill/n-400", r#"{"lastName":"#))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "invalid_payload");
    assert!(payload["error"].as_str().is_some());
}

#[tokio::test]
async fn fill_work_runs_off_the_request_thread() {
    let store = Arc::new(ThreadRecordingStore {
        inner: n400_store(),
        threads: Mutex::new(Vec::new()),
    });
    let service = Arc::new(FormFillService::new(
        FormCatalog::standard(),
        Arc::clone(&store),
        UnknownFieldPolicy::Ignore,
    ));

    let response = form_router(service)
        .oneshot(fill_request("/fill/n-400", "{}"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let threads = store.threads.lock().expect("thread log lock").clone();
    assert!(!threads.is_empty());
    assert!(threads.iter().all(|id| *id != thread::current().id()));
}
