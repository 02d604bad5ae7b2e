use super::error::DeliveryServiceError;
use super::model::ResolvedDelivery;
use crate::domain::pipeline::submission::normalize_phone;
use crate::infrastructure::repositories::DeliveryRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct DeliveryService {
    delivery_repo: Arc<dyn DeliveryRepository>,
}

impl DeliveryService {
    pub fn new(delivery_repo: Arc<dyn DeliveryRepository>) -> Self {
        Self { delivery_repo }
    }
}

#[async_trait]
pub trait DeliveryServiceApi: Send + Sync {
    /// Get one delivery request with its content
    async fn get_request(&self, id: Uuid) -> Result<ResolvedDelivery, DeliveryServiceError>;

    /// Get the feed for a phone number.
    ///
    /// Requests come back oldest first, one entry per content: when the same
    /// article was requested several times only the first request is kept.
    /// Returns the normalized phone along with the entries.
    async fn get_feed(
        &self,
        phone: &str,
    ) -> Result<(String, Vec<ResolvedDelivery>), DeliveryServiceError>;
}

#[async_trait]
impl DeliveryServiceApi for DeliveryService {
    async fn get_request(&self, id: Uuid) -> Result<ResolvedDelivery, DeliveryServiceError> {
        self.delivery_repo
            .find_by_id(id)
            .await?
            .ok_or(DeliveryServiceError::NotFound)
    }

    async fn get_feed(
        &self,
        phone: &str,
    ) -> Result<(String, Vec<ResolvedDelivery>), DeliveryServiceError> {
        let phone = normalize_phone(phone)
            .ok_or_else(|| DeliveryServiceError::Invalid("Invalid phone number".to_string()))?;

        let requests = self.delivery_repo.find_by_phone(&phone).await?;
        let total = requests.len();

        let mut seen = HashSet::new();
        let entries: Vec<ResolvedDelivery> = requests
            .into_iter()
            .filter(|resolved| seen.insert(resolved.content.id))
            .collect();

        tracing::debug!(
            phone = %phone,
            requests = total,
            entries = entries.len(),
            "Feed resolved"
        );

        Ok((phone, entries))
    }
}
