use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rttm_backend::domain::content::ContentRecord;
use rttm_backend::domain::delivery::DeliveryRequest;
use rttm_backend::infrastructure::repositories::{
    ContentRepository, DeliveryRepository, InMemoryRepository,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct TestFixtures {
    store: Arc<InMemoryRepository>,
}

impl TestFixtures {
    pub fn new(store: Arc<InMemoryRepository>) -> Self {
        Self { store }
    }

    pub async fn create_content(&self, url: &str, title: &str) -> Result<ContentRecord> {
        let record = ContentRecord {
            id: Uuid::new_v4(),
            canonical_url: url.to_string(),
            title: title.to_string(),
            description: None,
            body_text: format!("{} is an article worth listening to on the way home.", title),
            audio_url: format!("https://audio.test/audio/{}.mp3", Uuid::new_v4()),
            audio_byte_length: 1024,
            created_at: Utc::now(),
        };

        Ok(self.store.create_if_absent(record).await?.into_record())
    }

    pub async fn create_request(
        &self,
        content: &ContentRecord,
        phone: &str,
        created_at: DateTime<Utc>,
    ) -> Result<DeliveryRequest> {
        let mut request = DeliveryRequest::new(content.id, phone);
        request.created_at = created_at;
        Ok(self.store.create(request).await?)
    }

    pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Utc::now() - Duration::minutes(minutes)
    }
}
