use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};

/// Detection only looks at the head of an article; the rest rarely changes the verdict.
const DETECTION_SAMPLE_CHARS: usize = 2000;

/// ISO 639-1 language codes the synthesizers have voices for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
}

impl LanguageCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Picks the language of extracted article text so the synthesizer can choose a voice.
pub struct LanguageGuesser {
    detector: LanguageDetector,
}

impl LanguageGuesser {
    pub fn new() -> Self {
        // Only the languages enabled in Cargo.toml are compiled in
        Self {
            detector: LanguageDetectorBuilder::from_all_languages().build(),
        }
    }

    /// Detect the language of `text`, falling back to English
    pub fn detect(&self, text: &str) -> LanguageCode {
        let sample: String = text.chars().take(DETECTION_SAMPLE_CHARS).collect();
        match self.detector.detect_language_of(&sample) {
            Some(language) => LanguageCode::from_lingua(language),
            None => {
                tracing::warn!("Could not detect language, falling back to English");
                LanguageCode::English
            }
        }
    }
}

impl Default for LanguageGuesser {
    fn default() -> Self {
        Self::new()
    }
}
