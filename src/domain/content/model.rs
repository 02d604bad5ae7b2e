use crate::domain::shared::text::smart_truncate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const SHORT_DESCRIPTION_CHARS: usize = 140;

/// One distinct source URL rendered to audio. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContentRecord {
    pub id: Uuid,
    pub canonical_url: String,
    pub title: String,
    pub description: Option<String>,
    pub body_text: String,
    pub audio_url: String,
    pub audio_byte_length: i64,
    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Description for feed entries: the extracted description when there is
    /// one, otherwise the start of the body text.
    pub fn short_description(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => description.to_string(),
            _ => smart_truncate(&self.body_text, SHORT_DESCRIPTION_CHARS, "..."),
        }
    }
}

/// Output of a content extractor for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub description: Option<String>,
    pub body_text: String,
}

/// Response for content lookups
#[derive(Debug, Serialize, Deserialize)]
pub struct ContentResponse {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub short_description: String,
    pub body_text: String,
    pub audio_url: String,
    pub audio_length: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ContentRecord> for ContentResponse {
    fn from(record: ContentRecord) -> Self {
        let short_description = record.short_description();
        Self {
            id: record.id,
            url: record.canonical_url,
            title: record.title,
            description: record.description,
            short_description,
            body_text: record.body_text,
            audio_url: record.audio_url,
            audio_length: record.audio_byte_length,
            created_at: record.created_at,
        }
    }
}
