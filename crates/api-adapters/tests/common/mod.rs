//! Router test utilities built on mocked ports.

use std::sync::Arc;

use api_adapters::{create_router, AppState};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use domains::{MockAdminGuard, MockEventRepository, MockImageStore};
use services::{EventService, ImageService};
use tower::ServiceExt;

pub const TOKEN: &str = "good-token";

/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub fn router(repo: MockEventRepository, store: MockImageStore) -> Router {
    let mut guard = MockAdminGuard::new();
    guard.expect_authorize().returning(|token| token == TOKEN);

    let state = AppState::new(
        EventService::new(Arc::new(repo)),
        ImageService::new(Arc::new(store)),
        Arc::new(guard),
    );
    create_router(state, 1024 * 1024)
}

#[allow(dead_code)]
pub async fn send(router: &Router, method: Method, uri: &str, body: Vec<u8>) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/octet-stream")
        .body(Body::from(body))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}
