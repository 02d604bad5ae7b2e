use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::pipeline::{submission::find_url_in_text, PipelineDispatcher},
    error::{AppError, AppResult},
};

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// Request for POST /submit
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub phone: String,
}

/// Response for an accepted submission
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub run_id: Uuid,
    pub status: String,
}

/// Inbound message webhook form posted by Twilio
#[derive(Debug, Deserialize)]
pub struct TwilioInboundMessage {
    #[serde(rename = "To", default)]
    pub to: String,
    #[serde(rename = "AccountSid", default)]
    pub account_sid: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Twilio identity inbound webhooks must match
#[derive(Debug, Clone)]
pub struct TwilioWebhookConfig {
    pub account_sid: String,
    pub number: String,
}

pub struct SubmissionController {
    dispatcher: Arc<PipelineDispatcher>,
    twilio: TwilioWebhookConfig,
}

impl SubmissionController {
    pub fn new(dispatcher: Arc<PipelineDispatcher>, twilio: TwilioWebhookConfig) -> Self {
        Self { dispatcher, twilio }
    }

    /// POST /submit - Queue an article for delivery to a phone
    pub async fn submit(
        State(controller): State<Arc<SubmissionController>>,
        Json(request): Json<SubmitRequest>,
    ) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
        let task = controller.dispatcher.submit(&request.url, &request.phone)?;

        Ok((
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                run_id: task.run_id,
                status: "accepted".to_string(),
            }),
        ))
    }

    /// POST /twilio/callback - Queue the last link found in an inbound SMS,
    /// delivering to the sender
    pub async fn twilio_callback(
        State(controller): State<Arc<SubmissionController>>,
        Form(message): Form<TwilioInboundMessage>,
    ) -> AppResult<impl IntoResponse> {
        if message.to != controller.twilio.number
            || message.account_sid != controller.twilio.account_sid
        {
            tracing::warn!(
                to = %message.to,
                account_sid = %message.account_sid,
                "Inbound message not addressed to this service"
            );
            return Err(AppError::Forbidden("Unknown recipient".to_string()));
        }

        let url = find_url_in_text(&message.body)
            .ok_or_else(|| AppError::BadRequest("No URL found in message".to_string()))?;

        let task = controller.dispatcher.submit(url, &message.from)?;
        tracing::info!(run_id = %task.run_id, from = %message.from, "Inbound message accepted");

        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/xml")],
            EMPTY_TWIML,
        ))
    }
}
