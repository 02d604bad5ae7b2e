use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{
    content::ContentController, delivery::DeliveryController, health,
    submission::SubmissionController,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;
use crate::infrastructure::repositories::ContentRepository;

/// Everything the routes need, built once at startup
#[derive(Clone)]
pub struct AppControllers {
    pub content_repo: Arc<dyn ContentRepository>,
    pub submission_controller: Arc<SubmissionController>,
    pub delivery_controller: Arc<DeliveryController>,
    pub content_controller: Arc<ContentController>,
}

/// Build the application router with all routes and layers
pub fn build_router(controllers: AppControllers) -> Router {
    let submission_routes = Router::new()
        .route("/submit", post(SubmissionController::submit))
        .route("/twilio/callback", post(SubmissionController::twilio_callback))
        .with_state(controllers.submission_controller);

    let delivery_routes = Router::new()
        .route("/requests/:id", get(DeliveryController::get_request))
        .route("/feeds/:phone", get(DeliveryController::get_feed))
        .with_state(controllers.delivery_controller);

    let content_routes = Router::new()
        .route("/content", get(ContentController::get_by_url))
        .route("/content/:id", get(ContentController::get_by_id))
        .with_state(controllers.content_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(controllers.content_repo)
        .merge(submission_routes)
        .merge(delivery_routes)
        .merge(content_routes)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    controllers: AppControllers,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(controllers);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
