use html2text::{from_read_with_decorator, render::text_renderer::TrivialDecorator};
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").unwrap());
static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Convert an HTML fragment to speakable plain text: markup and bare URLs
/// removed, entities decoded, whitespace collapsed to single spaces.
pub fn html_to_plain_text(html: &str) -> String {
    let plain_text = from_read_with_decorator(html.as_bytes(), usize::MAX, TrivialDecorator::new());
    let without_urls = URL_PATTERN.replace_all(&plain_text, "");
    WHITESPACE_PATTERN
        .replace_all(&without_urls, " ")
        .trim()
        .to_string()
}

/// Shorten `text` to at most `length` characters plus `suffix`, cutting on the
/// last word boundary that fits. Text already within `length` is returned as is.
pub fn smart_truncate(text: &str, length: usize, suffix: &str) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }

    // One extra character so a word ending exactly at `length` survives
    let window: String = text.chars().take(length + 1).collect();
    let kept = match window.rfind(' ') {
        Some(idx) => &window[..idx],
        None => {
            let end = window
                .char_indices()
                .nth(length)
                .map(|(idx, _)| idx)
                .unwrap_or(window.len());
            &window[..end]
        }
    };

    format!("{}{}", kept.trim_end(), suffix)
}
