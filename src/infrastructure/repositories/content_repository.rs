use crate::domain::content::ContentRecord;
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::{check_connection, DbPool};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Result of `create_if_absent`: either the candidate became the stored
/// record, or another record already owned the URL and the candidate was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(ContentRecord),
    Existing(ContentRecord),
}

impl CreateOutcome {
    pub fn was_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }

    pub fn record(&self) -> &ContentRecord {
        match self {
            CreateOutcome::Created(record) | CreateOutcome::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> ContentRecord {
        match self {
            CreateOutcome::Created(record) | CreateOutcome::Existing(record) => record,
        }
    }
}

/// Store of content records, keyed by canonical URL.
///
/// At most one record exists per canonical URL for the lifetime of the store.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn find_by_url(&self, canonical_url: &str) -> AppResult<Option<ContentRecord>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ContentRecord>>;

    /// Persist `candidate` unless a record with the same canonical URL exists.
    ///
    /// Atomic with respect to the URL: of any number of concurrent calls for
    /// one URL exactly one returns `Created`, and every other caller gets
    /// `Existing` with that same record.
    async fn create_if_absent(&self, candidate: ContentRecord) -> AppResult<CreateOutcome>;

    async fn check_health(&self) -> AppResult<()>;
}

pub struct PgContentRepository {
    pool: Arc<DbPool>,
}

impl PgContentRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn find_by_url(&self, canonical_url: &str) -> AppResult<Option<ContentRecord>> {
        let pool = self.pool.as_ref();
        let record = sqlx::query_as::<_, ContentRecord>(
            r#"
            SELECT id, canonical_url, title, description, body_text, audio_url, audio_byte_length, created_at
            FROM contents
            WHERE canonical_url = $1
            "#,
        )
        .bind(canonical_url)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ContentRecord>> {
        let pool = self.pool.as_ref();
        let record = sqlx::query_as::<_, ContentRecord>(
            r#"
            SELECT id, canonical_url, title, description, body_text, audio_url, audio_byte_length, created_at
            FROM contents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    async fn create_if_absent(&self, candidate: ContentRecord) -> AppResult<CreateOutcome> {
        let pool = self.pool.as_ref();

        // The unique constraint on canonical_url decides the winner; a losing
        // insert blocks until the winner commits, then returns no row.
        let inserted = sqlx::query_as::<_, ContentRecord>(
            r#"
            INSERT INTO contents (id, canonical_url, title, description, body_text, audio_url, audio_byte_length, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (canonical_url) DO NOTHING
            RETURNING id, canonical_url, title, description, body_text, audio_url, audio_byte_length, created_at
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.canonical_url)
        .bind(&candidate.title)
        .bind(&candidate.description)
        .bind(&candidate.body_text)
        .bind(&candidate.audio_url)
        .bind(candidate.audio_byte_length)
        .bind(candidate.created_at)
        .fetch_optional(pool)
        .await?;

        if let Some(record) = inserted {
            return Ok(CreateOutcome::Created(record));
        }

        self.find_by_url(&candidate.canonical_url)
            .await?
            .map(CreateOutcome::Existing)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "content for {} conflicted but could not be read back",
                    candidate.canonical_url
                ))
            })
    }

    async fn check_health(&self) -> AppResult<()> {
        check_connection(&self.pool).await?;
        Ok(())
    }
}
