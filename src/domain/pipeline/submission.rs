use crate::error::AppError;
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;

const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// Field-level rejection of a submission, reported back to the caller synchronously
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: BTreeMap<&'static str, String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid submission")?;
        for (i, (field, message)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} {}", sep, field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.fields)
    }
}

/// A (url, phone) pair that passed validation and normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub canonical_url: String,
    pub phone: String,
}

impl Submission {
    /// Validate raw input, normalizing the URL into its canonical form and the
    /// phone number into E.164.
    pub fn parse(url: &str, phone: &str) -> Result<Self, ValidationError> {
        let mut fields = BTreeMap::new();

        let canonical_url = if url.trim().is_empty() {
            fields.insert("url", "Required".to_string());
            None
        } else {
            match canonicalize_url(url) {
                Some(url) => Some(url),
                None => {
                    fields.insert("url", "Invalid URL".to_string());
                    None
                }
            }
        };

        let phone = if phone.trim().is_empty() {
            fields.insert("phone", "Required".to_string());
            None
        } else {
            match normalize_phone(phone) {
                Some(phone) => Some(phone),
                None => {
                    fields.insert("phone", "Invalid phone number".to_string());
                    None
                }
            }
        };

        match (canonical_url, phone) {
            (Some(canonical_url), Some(phone)) if fields.is_empty() => Ok(Self {
                canonical_url,
                phone,
            }),
            _ => Err(ValidationError { fields }),
        }
    }
}

/// Normalize an absolute http(s) URL into the form used as the dedup key.
///
/// Scheme and host are lowercased, default ports and fragments dropped, an
/// empty query removed and an empty path turned into `/`. Returns `None` for
/// anything that is not an absolute http(s) URL with a host.
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return None,
    }

    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }

    Some(url.to_string())
}

/// True when `raw` parses as an absolute http(s) URL with a host
pub fn is_valid_url(raw: &str) -> bool {
    canonicalize_url(raw).is_some()
}

/// Normalize a phone number into E.164 (`+` followed by 8 to 15 digits).
///
/// Spaces, dashes, dots and parentheses are ignored and a leading `00` is read
/// as the international prefix. Without `+` or `00` the country code is
/// unknown, so national-format numbers are rejected.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let digits = compact
        .strip_prefix('+')
        .or_else(|| compact.strip_prefix("00"))?;

    let valid = (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    valid.then(|| format!("+{}", digits))
}

/// Pick the URL out of a free-form text message. When several words are URLs,
/// the last one wins.
pub fn find_url_in_text(text: &str) -> Option<&str> {
    text.split_whitespace().filter(|word| is_valid_url(word)).last()
}
