use crate::domain::pipeline::error::StorageError;
use async_trait::async_trait;

/// Repository for durable, publicly readable audio objects.
///
/// Uploading the same key twice overwrites the object; the pipeline may
/// upload audio for a URL that ends up losing the dedup race.
#[async_trait]
pub trait AudioStorageRepository: Send + Sync {
    /// Store `data` under `key` and return the URL it can be fetched from
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}
