//! End-to-end harness: the real router over an in-memory SQLite database,
//! a temporary image directory and the shared-secret admin guard.

use std::sync::Arc;

use api_adapters::{create_router, AppState};
use auth_adapters::{admin_hash, AdminTokenGuard};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use domains::timeline::parse_storage;
use domains::{Event, EventRepository};
use secrecy::SecretString;
use services::{EventService, ImageService};
use storage_adapters::{LocalImageStore, SqliteEventRepo};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_SECRET: &str = "correct horse battery staple";

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<SqliteEventRepo>,
    pub images: Arc<LocalImageStore>,
    pub token: String,
    _image_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let image_dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(SqliteEventRepo::in_memory().await.unwrap());
        let images = Arc::new(LocalImageStore::open(image_dir.path()).await.unwrap());
        let guard = AdminTokenGuard::from_secret(&SecretString::from(ADMIN_SECRET.to_string()));

        let state = AppState::new(
            EventService::new(repo.clone()),
            ImageService::new(images.clone()),
            Arc::new(guard),
        );

        Self {
            router: create_router(state, 1024 * 1024),
            repo,
            images,
            token: admin_hash(ADMIN_SECRET),
            _image_dir: image_dir,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Vec<u8>) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/octet-stream")
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    /// Everything stored, newest first, bypassing the listing window.
    pub async fn all_events(&self) -> Vec<Event> {
        let from = parse_storage("1000-01-01 00:00:00").unwrap();
        let until = parse_storage("9999-12-31 23:59:59").unwrap();
        self.repo.list_between(from, until).await.unwrap()
    }
}
