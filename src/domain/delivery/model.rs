use crate::domain::content::{ContentRecord, ContentResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One notification to one recipient about one content record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeliveryRequest {
    pub id: Uuid,
    pub content_id: Uuid,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRequest {
    pub fn new(content_id: Uuid, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content_id,
            phone: phone.into(),
            created_at: Utc::now(),
        }
    }
}

/// A delivery request with its content record dereferenced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDelivery {
    pub request: DeliveryRequest,
    pub content: ContentRecord,
}

/// Response for GET /requests/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub content: ContentResponse,
}

impl From<ResolvedDelivery> for DeliveryResponse {
    fn from(resolved: ResolvedDelivery) -> Self {
        Self {
            id: resolved.request.id,
            phone: resolved.request.phone,
            created_at: resolved.request.created_at,
            content: ContentResponse::from(resolved.content),
        }
    }
}

/// Response for GET /feeds/{phone}
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub phone: String,
    pub items: Vec<FeedItem>,
}

/// One episode in a recipient's feed
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedItem {
    pub request_id: Uuid,
    pub content_id: Uuid,
    pub title: String,
    pub link: String,
    pub description: String,
    pub audio_url: String,
    pub audio_length: i64,
    pub audio_type: String,
    pub published_at: DateTime<Utc>,
}

impl From<ResolvedDelivery> for FeedItem {
    fn from(resolved: ResolvedDelivery) -> Self {
        let description = resolved.content.short_description();
        Self {
            request_id: resolved.request.id,
            content_id: resolved.content.id,
            title: resolved.content.title,
            link: resolved.content.canonical_url,
            description,
            audio_url: resolved.content.audio_url,
            audio_length: resolved.content.audio_byte_length,
            audio_type: "audio/mpeg".to_string(),
            published_at: resolved.request.created_at,
        }
    }
}
