use crate::domain::content::ExtractedContent;
use crate::domain::pipeline::error::ExtractionError;
use async_trait::async_trait;

/// Repository turning a source URL into article metadata and readable text.
/// Abstracts the extraction provider (direct HTML fetch, Embedly, ...).
#[async_trait]
pub trait ExtractionRepository: Send + Sync {
    /// Fetch and extract `url`
    ///
    /// # Errors
    /// Fails when the source is unreachable, answers with a non-2xx status,
    /// is not HTML, or yields no body text.
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractionError>;

    /// Provider name for logs
    fn provider(&self) -> &'static str;
}

/// Title to fall back on when the source has none
pub(crate) fn title_or_url(title: Option<String>, url: &str) -> String {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string())
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
