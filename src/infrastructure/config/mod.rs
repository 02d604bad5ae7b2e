use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Absent means process-local stores, for development only
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Speech synthesis
    pub tts_provider: TtsProvider,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_tts_voice: String,
    // Article extraction
    pub extractor_provider: ExtractorProvider,
    pub embedly_api_key: Option<String>,
    // Audio storage
    pub s3_bucket_name: String,
    pub s3_public_base_url: Option<String>,
    // Twilio
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_number: String,
    // Pipeline
    pub adapter_timeout_secs: u64,
    pub max_in_flight_pipelines: usize,
    pub synthesis_concurrency: usize,
    pub content_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Polly,
    OpenAi,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorProvider {
    Html,
    Embedly,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl TtsProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "polly" => Ok(Self::Polly),
            "openai" => Ok(Self::OpenAi),
            _ => Err(ConfigError::Invalid {
                key: "TTS_PROVIDER",
                value: value.to_string(),
            }),
        }
    }
}

impl ExtractorProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "embedly" => Ok(Self::Embedly),
            _ => Err(ConfigError::Invalid {
                key: "EXTRACTOR_PROVIDER",
                value: value.to_string(),
            }),
        }
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let tts_provider = TtsProvider::parse(
            &env::var("TTS_PROVIDER").unwrap_or_else(|_| "polly".to_string()),
        )?;
        let openai_api_key = optional("OPENAI_API_KEY");
        if tts_provider == TtsProvider::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }

        let extractor_provider = ExtractorProvider::parse(
            &env::var("EXTRACTOR_PROVIDER").unwrap_or_else(|_| "html".to_string()),
        )?;
        let embedly_api_key = optional("EMBEDLY_API_KEY");
        if extractor_provider == ExtractorProvider::Embedly && embedly_api_key.is_none() {
            return Err(ConfigError::Missing("EMBEDLY_API_KEY"));
        }

        let config = Config {
            database_url: optional("DATABASE_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", "8080")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            environment: match env::var("ENVIRONMENT").unwrap_or_default().as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").unwrap_or_default().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            tts_provider,
            openai_api_key,
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            openai_tts_voice: env::var("OPENAI_TTS_VOICE").unwrap_or_default(),
            extractor_provider,
            embedly_api_key,
            s3_bucket_name: required("AWS_S3_BUCKET_NAME")?,
            s3_public_base_url: optional("S3_PUBLIC_BASE_URL"),
            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_number: required("TWILIO_NUMBER")?,
            adapter_timeout_secs: parsed("ADAPTER_TIMEOUT_SECS", "60")?,
            max_in_flight_pipelines: parsed("MAX_IN_FLIGHT_PIPELINES", "16")?,
            synthesis_concurrency: parsed("SYNTHESIS_CONCURRENCY", "1")?,
            content_cache_enabled: flag(
                &env::var("CONTENT_CACHE_ENABLED").unwrap_or_else(|_| "true".to_string()),
            ),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }
}
