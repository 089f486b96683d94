//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;

use crate::errors::Result;
use crate::models::{Event, EventId, EventPatch, ImageName, StorageInfo};

/// Persistence contract for timeline events.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events with `from <= time < until`, newest first.
    async fn list_between(&self, from: NaiveDateTime, until: NaiveDateTime) -> Result<Vec<Event>>;

    async fn insert_many(&self, events: &[Event]) -> Result<()>;

    /// Applies the present fields of `patch`. Returns the number of rows
    /// touched, which is zero for an unknown uuid.
    async fn update(&self, uuid: &EventId, patch: &EventPatch) -> Result<u64>;

    /// Returns the number of rows removed; unknown ids are skipped.
    async fn delete_many(&self, uuids: &[EventId]) -> Result<u64>;
}

/// Content-addressed blob storage for images.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Fails with `NotFound` if the blob is absent.
    async fn get(&self, name: &ImageName) -> Result<Bytes>;

    /// Writes only if `name` is absent. Returns whether a new blob was created.
    async fn put(&self, name: &ImageName, data: Bytes) -> Result<bool>;

    /// Fails with `NotFound` if the blob is absent.
    async fn delete(&self, name: &ImageName) -> Result<()>;

    async fn stats(&self) -> Result<StorageInfo>;
}

/// Gate for privileged operations.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AdminGuard: Send + Sync {
    /// True when `token` equals the configured admin hash.
    fn authorize(&self, token: &str) -> bool;
}
