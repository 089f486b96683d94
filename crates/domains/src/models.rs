//! # Domain Models
//!
//! These structs represent the entities of the homepage timeline: events and
//! the content-addressed images they may point to.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Caller-assigned identifier of an [`Event`].
///
/// Always held in canonical hyphenated lowercase form, whatever form the
/// client sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| DomainError::Validation(format!("malformed event uuid {raw:?}")))?;
        Ok(Self(id.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for EventId {
    fn from(id: Uuid) -> Self {
        Self(id.hyphenated().to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored name of an image blob: `<sha256 hex>.<extension>`.
///
/// The hash is computed by the uploader and is not re-verified; only the
/// shape is checked, which also guarantees the name is a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageName {
    name: String,
    ext_at: usize,
}

impl TryFrom<String> for ImageName {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<ImageName> for String {
    fn from(name: ImageName) -> Self {
        name.name
    }
}

/// Length of a hex-encoded SHA-256 digest.
const HASH_HEX_LEN: usize = 64;

impl ImageName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::Validation(format!("malformed image name {raw:?}"));

        let (hash, ext) = raw.split_once('.').ok_or_else(invalid)?;
        if hash.len() != HASH_HEX_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        if ext.is_empty() || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        let ext = ext.to_ascii_lowercase();
        if image_mime(&ext).is_none() {
            return Err(invalid());
        }

        Ok(Self::from_parts(&hash.to_ascii_lowercase(), &ext))
    }

    /// Joins an already-computed digest and an extension. Callers are
    /// expected to pass a lowercase hex digest.
    pub fn from_parts(hash: &str, ext: &str) -> Self {
        Self {
            name: format!("{hash}.{ext}"),
            ext_at: hash.len() + 1,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &str {
        &self.name[..self.ext_at - 1]
    }

    pub fn extension(&self) -> &str {
        &self.name[self.ext_at..]
    }

    /// Response content-type derived from the extension.
    pub fn content_type(&self) -> mime::Mime {
        image_mime(self.extension()).unwrap_or(mime::APPLICATION_OCTET_STREAM)
    }
}

fn image_mime(ext: &str) -> Option<mime::Mime> {
    mime_guess::from_ext(ext)
        .iter()
        .find(|m| m.type_() == mime::IMAGE)
}

impl FromStr for ImageName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A single entry on the homepage timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub uuid: EventId,
    /// Ordering and pagination key, second precision.
    pub time: NaiveDateTime,
    pub title: String,
    pub href: Option<String>,
    pub description: String,
    /// Soft reference; the image may have been deleted since.
    pub image_hash: Option<ImageName>,
}

/// Column changes for an existing event. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub time: Option<NaiveDateTime>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub description: Option<String>,
    pub image_hash: Option<ImageName>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.title.is_none()
            && self.href.is_none()
            && self.description.is_none()
            && self.image_hash.is_none()
    }
}

/// Aggregate view over the blob directory, computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Total size in bytes.
    pub size: u64,
    pub count: u64,
    /// File names, sorted.
    pub files: Vec<String>,
}
