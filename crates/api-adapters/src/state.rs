//! Application state shared across handlers.

use std::sync::Arc;

use domains::AdminGuard;
use services::{EventService, ImageService};

use crate::error::ApiError;

/// Shared application state. Built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub images: ImageService,
    pub guard: Arc<dyn AdminGuard>,
}

impl AppState {
    pub fn new(events: EventService, images: ImageService, guard: Arc<dyn AdminGuard>) -> Self {
        Self { events, images, guard }
    }

    /// Rejects the request unless `token` is the admin hash.
    pub fn authorize(&self, token: &str) -> Result<(), ApiError> {
        if self.guard.authorize(token) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}
