//! Upload, fetch and housekeeping of content-addressed images.

use std::sync::Arc;

use bytes::Bytes;
use domains::{DomainError, ImageName, ImageStore, Result, StorageInfo};
use sha2::{Digest, Sha256};

/// Name a client computes for `data` before uploading it.
///
/// The server never calls this on the upload path; the caller-supplied name
/// is trusted as long as it is well formed.
pub fn content_name(data: &[u8], ext: &str) -> ImageName {
    let hash = hex::encode(Sha256::digest(data));
    ImageName::from_parts(&hash, &ext.to_ascii_lowercase())
}

#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn ImageStore>,
}

impl ImageService {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Stores `data` under `name` unless a blob with that name exists.
    /// Either way the stored name is returned.
    pub async fn upload(&self, name: ImageName, data: Bytes) -> Result<ImageName> {
        if data.is_empty() {
            return Err(DomainError::Validation(format!("image {name} has no content")));
        }

        let size = data.len();
        let created = self.store.put(&name, data).await?;
        if created {
            tracing::info!(image = %name, size, "image stored");
        } else {
            tracing::debug!(image = %name, "image already present, upload skipped");
        }
        Ok(name)
    }

    /// Blob bytes together with the content-type implied by the extension.
    pub async fn fetch(&self, name: &ImageName) -> Result<(Bytes, mime::Mime)> {
        let data = self.store.get(name).await?;
        Ok((data, name.content_type()))
    }

    pub async fn delete(&self, name: &ImageName) -> Result<()> {
        self.store.delete(name).await?;
        tracing::info!(image = %name, "image deleted");
        Ok(())
    }

    pub async fn info(&self) -> Result<StorageInfo> {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockImageStore;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn content_name_is_sha256_of_bytes() {
        let name = content_name(b"PNGDATA", "PNG");
        assert_eq!(name.extension(), "png");
        assert_eq!(name.hash().len(), 64);
        assert_eq!(name, content_name(b"PNGDATA", "png"));
        assert_ne!(name, content_name(b"PNGDATA2", "png"));
        // sha256("") is a well-known constant
        assert_eq!(
            content_name(b"", "gif").hash(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn repeated_upload_reports_same_name() {
        let mut store = MockImageStore::new();
        let mut first = true;
        store.expect_put().times(2).returning(move |_, _| {
            let created = first;
            first = false;
            Ok(created)
        });

        let service = ImageService::new(Arc::new(store));
        let name = content_name(b"PNGDATA", "png");
        let a = assert_ok!(service.upload(name.clone(), Bytes::from_static(b"PNGDATA")).await);
        let b = assert_ok!(service.upload(name.clone(), Bytes::from_static(b"PNGDATA")).await);
        assert_eq!(a, name);
        assert_eq!(b, name);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_before_storage() {
        let mut store = MockImageStore::new();
        store.expect_put().never();

        let service = ImageService::new(Arc::new(store));
        let err = assert_err!(service.upload(content_name(b"", "png"), Bytes::new()).await);
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn fetch_derives_content_type() {
        let mut store = MockImageStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Bytes::from_static(b"GIF89a")));

        let service = ImageService::new(Arc::new(store));
        let (data, mime) = assert_ok!(service.fetch(&content_name(b"GIF89a", "gif")).await);
        assert_eq!(&data[..], b"GIF89a");
        assert_eq!(mime.essence_str(), "image/gif");
    }

    #[tokio::test]
    async fn delete_surfaces_not_found() {
        let mut store = MockImageStore::new();
        store
            .expect_delete()
            .returning(|name| Err(DomainError::NotFound(format!("image {name}"))));

        let service = ImageService::new(Arc::new(store));
        let err = assert_err!(service.delete(&content_name(b"x", "png")).await);
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
