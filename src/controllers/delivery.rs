use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::delivery::{
        DeliveryResponse, DeliveryService, DeliveryServiceApi, DeliveryServiceError, FeedItem,
        FeedResponse,
    },
    error::AppResult,
};

pub struct DeliveryController {
    delivery_service: Arc<DeliveryService>,
}

impl DeliveryController {
    pub fn new(delivery_service: Arc<DeliveryService>) -> Self {
        Self { delivery_service }
    }

    /// GET /requests/{id} - One delivery request with its content
    pub async fn get_request(
        State(controller): State<Arc<DeliveryController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<DeliveryResponse>> {
        // A malformed id cannot name a request
        let id = Uuid::parse_str(&id).map_err(|_| DeliveryServiceError::NotFound)?;

        let resolved = controller.delivery_service.get_request(id).await?;
        Ok(Json(DeliveryResponse::from(resolved)))
    }

    /// GET /feeds/{phone} - Episodes delivered to a phone, oldest first
    pub async fn get_feed(
        State(controller): State<Arc<DeliveryController>>,
        Path(phone): Path<String>,
    ) -> AppResult<Json<FeedResponse>> {
        let (phone, entries) = controller.delivery_service.get_feed(&phone).await?;

        Ok(Json(FeedResponse {
            phone,
            items: entries.into_iter().map(FeedItem::from).collect(),
        }))
    }
}
