//! # Wire messages
//!
//! Protobuf shapes of every request and response body, plus their mapping
//! onto domain types. Optional fields are carried by presence, so an unset
//! field and an empty string stay distinguishable.

use bytes::Bytes;
use domains::timeline;
use domains::{DomainError, EventId, EventPatch, ImageName};

#[derive(Clone, PartialEq, prost::Message)]
pub struct Event {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, optional, tag = "2")]
    pub title: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub href: Option<String>,
    /// `YYYY/MM/DD` on list and create; update also takes `YYYY-MM-DD HH:MM:SS`.
    #[prost(string, optional, tag = "5")]
    pub time: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub image_hash: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventList {
    #[prost(message, repeated, tag = "1")]
    pub events: Vec<Event>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventPost {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(message, repeated, tag = "2")]
    pub events: Vec<Event>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventUpdate {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(message, optional, tag = "2")]
    pub event: Option<Event>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EventDelete {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(string, repeated, tag = "2")]
    pub uuids: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ImageUpload {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(string, tag = "2")]
    pub filename: String,
    #[prost(bytes = "bytes", tag = "3")]
    pub image: Bytes,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ImageDelete {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(string, tag = "2")]
    pub filename: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AdminToken {
    #[prost(string, tag = "1")]
    pub token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StorageInfo {
    #[prost(uint64, tag = "1")]
    pub size: u64,
    #[prost(uint64, tag = "2")]
    pub count: u64,
    #[prost(string, repeated, tag = "3")]
    pub files: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StateResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

impl StateResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&domains::Event> for Event {
    fn from(event: &domains::Event) -> Self {
        Self {
            uuid: event.uuid.to_string(),
            title: Some(event.title.clone()),
            description: Some(event.description.clone()),
            href: event.href.clone(),
            time: Some(timeline::format_wire_day(&event.time)),
            image_hash: event.image_hash.as_ref().map(ToString::to_string),
        }
    }
}

impl From<domains::StorageInfo> for StorageInfo {
    fn from(info: domains::StorageInfo) -> Self {
        Self {
            size: info.size,
            count: info.count,
            files: info.files,
        }
    }
}

/// Time and image fields cannot hold an empty value, so an empty string is
/// read as "not sent".
fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

impl Event {
    /// A complete event for insertion. `title` and `time` are required;
    /// a missing description is stored as empty.
    pub fn into_new_event(self) -> Result<domains::Event, DomainError> {
        let uuid = EventId::parse(&self.uuid)?;
        let title = self
            .title
            .ok_or_else(|| DomainError::Validation(format!("event {uuid} has no title")))?;
        let time = non_empty(self.time)
            .ok_or_else(|| DomainError::Validation(format!("event {uuid} has no time")))?;

        Ok(domains::Event {
            time: timeline::parse_wire_day(&time)?,
            title,
            href: non_empty(self.href),
            description: self.description.unwrap_or_default(),
            image_hash: non_empty(self.image_hash).as_deref().map(ImageName::parse).transpose()?,
            uuid,
        })
    }

    /// The target uuid and the fields the caller actually sent.
    pub fn into_patch(self) -> Result<(EventId, EventPatch), DomainError> {
        let uuid = EventId::parse(&self.uuid)?;
        let patch = EventPatch {
            time: non_empty(self.time).as_deref().map(timeline::parse_any).transpose()?,
            title: self.title,
            href: self.href,
            description: self.description,
            image_hash: non_empty(self.image_hash).as_deref().map(ImageName::parse).transpose()?,
        };
        Ok((uuid, patch))
    }
}
