use crate::domain::content::ContentRecord;
use crate::domain::delivery::{DeliveryRequest, ResolvedDelivery};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

/// Store of delivery requests. Lookups always come back with the referenced
/// content record attached.
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// Persist a request. Fails with `NotFound` when `content_id` does not
    /// reference an existing content record.
    async fn create(&self, request: DeliveryRequest) -> AppResult<DeliveryRequest>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResolvedDelivery>>;

    /// All requests for a phone number, oldest first
    async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<ResolvedDelivery>>;
}

/// Row shape of a request joined with its content
#[derive(Debug, FromRow)]
struct ResolvedRow {
    request_id: Uuid,
    phone: String,
    request_created_at: DateTime<Utc>,
    content_id: Uuid,
    canonical_url: String,
    title: String,
    description: Option<String>,
    body_text: String,
    audio_url: String,
    audio_byte_length: i64,
    content_created_at: DateTime<Utc>,
}

impl From<ResolvedRow> for ResolvedDelivery {
    fn from(row: ResolvedRow) -> Self {
        Self {
            request: DeliveryRequest {
                id: row.request_id,
                content_id: row.content_id,
                phone: row.phone,
                created_at: row.request_created_at,
            },
            content: ContentRecord {
                id: row.content_id,
                canonical_url: row.canonical_url,
                title: row.title,
                description: row.description,
                body_text: row.body_text,
                audio_url: row.audio_url,
                audio_byte_length: row.audio_byte_length,
                created_at: row.content_created_at,
            },
        }
    }
}

const RESOLVED_SELECT: &str = r#"
    SELECT r.id AS request_id, r.phone, r.created_at AS request_created_at,
           c.id AS content_id, c.canonical_url, c.title, c.description, c.body_text,
           c.audio_url, c.audio_byte_length, c.created_at AS content_created_at
    FROM delivery_requests r
    JOIN contents c ON c.id = r.content_id
"#;

pub struct PgDeliveryRepository {
    pool: Arc<DbPool>,
}

impl PgDeliveryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryRepository for PgDeliveryRepository {
    async fn create(&self, request: DeliveryRequest) -> AppResult<DeliveryRequest> {
        let pool = self.pool.as_ref();

        let created = sqlx::query_as::<_, DeliveryRequest>(
            r#"
            INSERT INTO delivery_requests (id, content_id, phone, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, content_id, phone, created_at
            "#,
        )
        .bind(request.id)
        .bind(request.content_id)
        .bind(&request.phone)
        .bind(request.created_at)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound(format!("Content {}", request.content_id));
                }
            }
            AppError::Database(e)
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResolvedDelivery>> {
        let pool = self.pool.as_ref();
        let query = format!("{} WHERE r.id = $1", RESOLVED_SELECT);

        let row = sqlx::query_as::<_, ResolvedRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(ResolvedDelivery::from))
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<ResolvedDelivery>> {
        let pool = self.pool.as_ref();
        let query = format!(
            "{} WHERE r.phone = $1 ORDER BY r.created_at ASC, r.id ASC",
            RESOLVED_SELECT
        );

        let rows = sqlx::query_as::<_, ResolvedRow>(&query)
            .bind(phone)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(ResolvedDelivery::from).collect())
    }
}
