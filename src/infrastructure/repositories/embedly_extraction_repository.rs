use super::extraction_repository::{non_empty, title_or_url, ExtractionRepository};
use crate::domain::content::ExtractedContent;
use crate::domain::pipeline::error::ExtractionError;
use crate::domain::shared::text::html_to_plain_text;
use async_trait::async_trait;
use serde::Deserialize;

const EMBEDLY_EXTRACT_URL: &str = "https://api.embedly.com/1/extract";

/// Subset of Embedly's extract response we rely on
#[derive(Debug, Deserialize)]
struct EmbedlyExtract {
    title: Option<String>,
    description: Option<String>,
    /// Article HTML
    content: Option<String>,
    error_code: Option<u16>,
    error_message: Option<String>,
}

/// Extracts articles through Embedly's extract API
pub struct EmbedlyExtractionRepository {
    api_key: String,
    http_client: reqwest::Client,
}

impl EmbedlyExtractionRepository {
    pub fn new(api_key: String, http_client: reqwest::Client) -> Self {
        Self {
            api_key,
            http_client,
        }
    }
}

#[async_trait]
impl ExtractionRepository for EmbedlyExtractionRepository {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        let response = self
            .http_client
            .get(EMBEDLY_EXTRACT_URL)
            .query(&[("key", self.api_key.as_str()), ("url", url)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %url, "Embedly request failed");
                ExtractionError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), error = %error_text, url = %url, "Embedly rejected URL");
            return Err(ExtractionError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::Unreachable(format!("failed to read body: {}", e)))?;

        let extracted = parse_embedly_response(&body, url)?;
        tracing::debug!(
            url = %url,
            title = %extracted.title,
            body_length = extracted.body_text.chars().count(),
            "Extracted article via Embedly"
        );

        Ok(extracted)
    }

    fn provider(&self) -> &'static str {
        "embedly"
    }
}

fn parse_embedly_response(body: &str, url: &str) -> Result<ExtractedContent, ExtractionError> {
    let extract: EmbedlyExtract = serde_json::from_str(body)
        .map_err(|e| ExtractionError::Malformed(format!("invalid Embedly response: {}", e)))?;

    // Embedly reports upstream failures in-band
    if let Some(code) = extract.error_code {
        tracing::warn!(
            code,
            message = extract.error_message.as_deref().unwrap_or_default(),
            "Embedly could not fetch source"
        );
        return Err(ExtractionError::Status(code));
    }

    let body_text = extract
        .content
        .as_deref()
        .map(html_to_plain_text)
        .unwrap_or_default();
    if body_text.is_empty() {
        return Err(ExtractionError::EmptyBody);
    }

    Ok(ExtractedContent {
        title: title_or_url(extract.title, url),
        description: non_empty(extract.description),
        body_text,
    })
}
