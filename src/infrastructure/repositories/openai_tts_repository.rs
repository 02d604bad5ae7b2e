use super::tts_repository::{ensure_segment_fits, TtsRepository};
use crate::domain::pipeline::error::SynthesisError;
use crate::domain::pipeline::language::LanguageCode;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_SEGMENT_CHARS: usize = 4096;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    default_voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, default_voice: String) -> Self {
        Self {
            client,
            model,
            default_voice,
        }
    }

    /// Voice per language, used when no default voice is configured
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "alloy",
            LanguageCode::Spanish => "echo",
            LanguageCode::French => "nova",
            LanguageCode::German => "onyx",
            LanguageCode::Italian => "fable",
            LanguageCode::Portuguese => "shimmer",
        }
    }

    fn voice_for(&self, language: LanguageCode) -> String {
        if self.default_voice.is_empty() {
            Self::get_voice_for_language(language).to_string()
        } else {
            self.default_voice.clone()
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn parse_voice(voice: &str) -> Voice {
        match voice.to_lowercase().as_str() {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        }
    }

    fn classify_error(err: OpenAIError) -> SynthesisError {
        match err {
            OpenAIError::ApiError(api_err) => {
                let message = api_err.message.to_lowercase();
                if message.contains("quota") || message.contains("rate limit") {
                    SynthesisError::Quota(api_err.message)
                } else {
                    SynthesisError::Rejected(api_err.message)
                }
            }
            OpenAIError::Reqwest(e) => SynthesisError::Transport(e.to_string()),
            other => SynthesisError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    fn max_segment_chars(&self) -> usize {
        MAX_SEGMENT_CHARS
    }

    fn provider(&self) -> &'static str {
        "openai"
    }

    async fn synthesize(
        &self,
        segment: &str,
        language: LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError> {
        ensure_segment_fits(segment, MAX_SEGMENT_CHARS)?;

        let voice = self.voice_for(language);
        let start_time = std::time::Instant::now();

        tracing::debug!(
            model = %self.model,
            voice = %voice,
            segment_length = segment.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: segment.to_string(),
            voice: Self::parse_voice(&voice),
            // Fixed format so segments can be concatenated
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: None,
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %voice,
                segment_length = segment.len(),
                "OpenAI TTS API call failed"
            );
            Self::classify_error(e)
        })?;

        let audio_bytes = response.bytes.to_vec();
        tracing::debug!(
            provider = "openai",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size = audio_bytes.len(),
            "Segment synthesized"
        );

        Ok(audio_bytes)
    }
}
