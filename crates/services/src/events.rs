//! Timeline operations on top of an [`EventRepository`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use domains::timeline;
use domains::{DomainError, Event, EventId, EventPatch, EventRepository, Result};

#[derive(Clone)]
pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    /// One page of the timeline: events in the six months before `before`
    /// (or before now), newest first.
    ///
    /// Clients page backwards by passing the oldest `time` they received.
    pub async fn list(&self, before: Option<NaiveDateTime>) -> Result<Vec<Event>> {
        let (from, until) = timeline::window_before(before.unwrap_or_else(timeline::now));
        let events = self.repo.list_between(from, until).await?;
        tracing::debug!(%from, %until, count = events.len(), "listed events");
        Ok(events)
    }

    /// Inserts a batch of caller-identified events. Returns the batch size.
    pub async fn create(&self, events: Vec<Event>) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if event.title.is_empty() {
                return Err(DomainError::Validation(format!(
                    "event {} has an empty title",
                    event.uuid
                )));
            }
            if !seen.insert(&event.uuid) {
                return Err(DomainError::Validation(format!(
                    "event {} appears twice in one batch",
                    event.uuid
                )));
            }
        }

        self.repo.insert_many(&events).await?;
        tracing::info!(count = events.len(), "events created");
        Ok(events.len())
    }

    /// Applies `patch` to one event. An empty patch or an unknown uuid
    /// changes nothing and is not an error.
    pub async fn update(&self, uuid: &EventId, patch: &EventPatch) -> Result<u64> {
        if patch.is_empty() {
            tracing::debug!(uuid = %uuid, "empty event update ignored");
            return Ok(0);
        }

        let affected = self.repo.update(uuid, patch).await?;
        if affected == 0 {
            tracing::debug!(uuid = %uuid, "event update matched no rows");
        } else {
            tracing::info!(uuid = %uuid, "event updated");
        }
        Ok(affected)
    }

    /// Removes every listed event that exists; the rest are skipped.
    pub async fn delete(&self, uuids: Vec<EventId>) -> Result<u64> {
        let mut seen = HashSet::with_capacity(uuids.len());
        let uuids: Vec<EventId> = uuids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        if uuids.is_empty() {
            return Ok(0);
        }

        let removed = self.repo.delete_many(&uuids).await?;
        tracing::info!(requested = uuids.len(), removed, "events deleted");
        Ok(removed)
    }
}
