use super::error::ContentServiceError;
use super::model::ContentRecord;
use crate::domain::pipeline::submission::canonicalize_url;
use crate::infrastructure::repositories::ContentRepository;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct ContentService {
    content_repo: Arc<dyn ContentRepository>,
    cache: Option<Cache<Uuid, ContentRecord>>,
}

impl ContentService {
    pub fn new(content_repo: Arc<dyn ContentRepository>, cache_enabled: bool) -> Self {
        // Records never change once stored, so entries only leave on capacity or idleness
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(1_000)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            content_repo,
            cache,
        }
    }

    async fn remember(&self, record: &ContentRecord) {
        if let Some(cache) = &self.cache {
            cache.insert(record.id, record.clone()).await;
        }
    }
}

#[async_trait]
pub trait ContentServiceApi: Send + Sync {
    /// Get a content record by id
    async fn get_by_id(&self, id: Uuid) -> Result<ContentRecord, ContentServiceError>;

    /// Get the content record for a URL, canonicalizing it first so any
    /// spelling of a submitted URL finds its record
    async fn get_by_url(&self, url: &str) -> Result<ContentRecord, ContentServiceError>;
}

#[async_trait]
impl ContentServiceApi for ContentService {
    async fn get_by_id(&self, id: Uuid) -> Result<ContentRecord, ContentServiceError> {
        if let Some(cache) = &self.cache {
            if let Some(record) = cache.get(&id).await {
                tracing::debug!(content_id = %id, "Content cache hit");
                return Ok(record);
            }
        }

        let record = self
            .content_repo
            .find_by_id(id)
            .await?
            .ok_or(ContentServiceError::NotFound)?;

        self.remember(&record).await;
        Ok(record)
    }

    async fn get_by_url(&self, url: &str) -> Result<ContentRecord, ContentServiceError> {
        let canonical_url = canonicalize_url(url)
            .ok_or_else(|| ContentServiceError::Invalid(format!("Invalid URL: {}", url)))?;

        let record = self
            .content_repo
            .find_by_url(&canonical_url)
            .await?
            .ok_or(ContentServiceError::NotFound)?;

        self.remember(&record).await;
        Ok(record)
    }
}
