//! # Local image store
//!
//! Flat directory of content-addressed blobs named `<sha256>.<ext>`.
//! Names are validated `ImageName`s, so joining one onto the root can never
//! leave the directory.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use domains::{DomainError, ImageName, ImageStore, Result, StorageInfo};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct LocalImageStore {
    /// Root directory for all uploads (e.g., "./images")
    root: PathBuf,
}

impl LocalImageStore {
    /// Opens the store, creating the directory if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| DomainError::backend(&format!("cannot create {}", root.display()), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &ImageName) -> PathBuf {
        self.root.join(name.as_str())
    }
}

fn not_found(name: &ImageName) -> DomainError {
    DomainError::NotFound(format!("image {name}"))
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn get(&self, name: &ImageName) -> Result<Bytes> {
        match fs::read(self.path_of(name)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(name)),
            Err(e) => Err(DomainError::backend(&format!("cannot read image {name}"), e)),
        }
    }

    /// The blob is written to a hidden temp file and then linked into place
    /// without clobbering, so its final name only ever holds complete bytes.
    /// Losing that race to an equal upload reports `false`.
    async fn put(&self, name: &ImageName, data: Bytes) -> Result<bool> {
        let root = self.root.clone();
        let path = self.path_of(name);
        tokio::task::spawn_blocking(move || publish(&root, &path, &data))
            .await
            .map_err(|e| DomainError::backend("image write task failed", e))?
            .map_err(|e| DomainError::backend(&format!("cannot store image {name}"), e))
    }

    async fn delete(&self, name: &ImageName) -> Result<()> {
        match fs::remove_file(self.path_of(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(name)),
            Err(e) => Err(DomainError::backend(&format!("cannot delete image {name}"), e)),
        }
    }

    async fn stats(&self) -> Result<StorageInfo> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || scan(&root))
            .await
            .map_err(|e| DomainError::backend("storage scan task failed", e))?
    }
}

/// Prefix of in-flight uploads. `ImageName`s never start with a dot, so
/// these can't collide with a blob or be served.
const PARTIAL_PREFIX: &str = ".partial-";

fn publish(root: &Path, path: &Path, data: &[u8]) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let mut partial = tempfile::Builder::new().prefix(PARTIAL_PREFIX).tempfile_in(root)?;
    partial.write_all(data)?;
    partial.as_file().sync_all()?;

    match partial.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

/// Sums the sizes of the published blobs directly under `root`.
fn scan(root: &Path) -> Result<StorageInfo> {
    let read_err = |e: std::io::Error| DomainError::backend(&format!("cannot list {}", root.display()), e);

    let mut info = StorageInfo::default();
    for entry in std::fs::read_dir(root).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let meta = entry.metadata().map_err(read_err)?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !meta.is_file() || file_name.starts_with(PARTIAL_PREFIX) {
            continue;
        }
        info.size += meta.len();
        info.files.push(file_name);
    }
    info.files.sort();
    info.count = info.files.len() as u64;
    Ok(info)
}
