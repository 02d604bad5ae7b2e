use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::content::{ContentResponse, ContentService, ContentServiceApi, ContentServiceError},
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub url: Option<String>,
}

pub struct ContentController {
    content_service: Arc<ContentService>,
}

impl ContentController {
    pub fn new(content_service: Arc<ContentService>) -> Self {
        Self { content_service }
    }

    /// GET /content?url= - Content rendered for a URL
    pub async fn get_by_url(
        State(controller): State<Arc<ContentController>>,
        Query(query): Query<ContentQuery>,
    ) -> AppResult<Json<ContentResponse>> {
        let url = query
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("url is required".to_string()))?;

        let record = controller.content_service.get_by_url(&url).await?;
        Ok(Json(ContentResponse::from(record)))
    }

    /// GET /content/{id} - Content by id
    pub async fn get_by_id(
        State(controller): State<Arc<ContentController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<ContentResponse>> {
        let id = Uuid::parse_str(&id).map_err(|_| ContentServiceError::NotFound)?;

        let record = controller.content_service.get_by_id(id).await?;
        Ok(Json(ContentResponse::from(record)))
    }
}
