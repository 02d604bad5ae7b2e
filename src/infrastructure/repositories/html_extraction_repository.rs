use super::extraction_repository::{non_empty, title_or_url, ExtractionRepository};
use crate::domain::content::ExtractedContent;
use crate::domain::pipeline::error::ExtractionError;
use crate::domain::shared::text::html_to_plain_text;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

const USER_AGENT: &str = "rttm-backend/0.1 (+https://github.com/rttm)";

static META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").unwrap());
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\b(property|name|content)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").unwrap());
static ARTICLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*)</article>").unwrap());
static NON_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<head\b.*?</head>|<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<nav\b.*?</nav>|<footer\b.*?</footer>",
    )
    .unwrap()
});

/// Extracts articles by fetching the page directly and reading its HTML
pub struct HtmlExtractionRepository {
    http_client: reqwest::Client,
}

impl HtmlExtractionRepository {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl Default for HtmlExtractionRepository {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl ExtractionRepository for HtmlExtractionRepository {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        let response = self
            .http_client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %url, "Source fetch failed");
                ExtractionError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status(status.as_u16()));
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html_content_type(content_type) {
                return Err(ExtractionError::NotHtml(content_type.to_string()));
            }
        }

        let html = response
            .text()
            .await
            .map_err(|e| ExtractionError::Unreachable(format!("failed to read body: {}", e)))?;

        let extracted = parse_html(&html, url)?;
        tracing::debug!(
            url = %url,
            title = %extracted.title,
            body_length = extracted.body_text.chars().count(),
            "Extracted article from HTML"
        );

        Ok(extracted)
    }

    fn provider(&self) -> &'static str {
        "html"
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Value of the first `<meta>` tag whose `property` or `name` is one of `keys`,
/// tried in the order of `keys`
fn meta_content(html: &str, keys: &[&str]) -> Option<String> {
    let tags: Vec<(String, String)> = META_TAG
        .find_iter(html)
        .filter_map(|tag| {
            let mut key = None;
            let mut content = None;
            for attr in ATTRIBUTE.captures_iter(tag.as_str()) {
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                match attr[1].to_ascii_lowercase().as_str() {
                    "content" => content = Some(value),
                    _ => key = Some(value.to_ascii_lowercase()),
                }
            }
            Some((key?, content?))
        })
        .collect();

    keys.iter().find_map(|wanted| {
        tags.iter()
            .find(|(key, _)| key == wanted)
            .map(|(_, content)| html_to_plain_text(content))
    })
}

/// Pull title, description and readable body text out of a page.
/// The body prefers the `<article>` element when the page has one.
pub fn parse_html(html: &str, url: &str) -> Result<ExtractedContent, ExtractionError> {
    let title = meta_content(html, &["og:title", "twitter:title"]).or_else(|| {
        TITLE_TAG
            .captures(html)
            .map(|caps| html_to_plain_text(&caps[1]))
    });
    let description = meta_content(html, &["og:description", "description"]);

    let content = NON_CONTENT.replace_all(html, " ");
    let main = ARTICLE_TAG
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| content.to_string());

    let body_text = html_to_plain_text(&main);
    if body_text.is_empty() {
        return Err(ExtractionError::EmptyBody);
    }

    Ok(ExtractedContent {
        title: title_or_url(title, url),
        description: non_empty(description),
        body_text,
    })
}
