use super::tts_repository::{ensure_segment_fits, TtsRepository};
use crate::domain::pipeline::error::SynthesisError;
use crate::domain::pipeline::language::LanguageCode;
use async_trait::async_trait;
use aws_sdk_polly::{
    error::SdkError,
    operation::synthesize_speech::SynthesizeSpeechError,
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
const MAX_SEGMENT_CHARS: usize = 3000;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Select the appropriate neural Polly voice for a language
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "Joanna",
            LanguageCode::Spanish => "Lupe",
            LanguageCode::French => "Lea",
            LanguageCode::German => "Vicki",
            LanguageCode::Italian => "Bianca",
            LanguageCode::Portuguese => "Ines",
        }
    }

    fn classify_error(err: SdkError<SynthesizeSpeechError>) -> SynthesisError {
        match &err {
            SdkError::ServiceError(service_err) => match service_err.err() {
                SynthesizeSpeechError::TextLengthExceededException(e) => {
                    SynthesisError::Rejected(e.to_string())
                }
                SynthesizeSpeechError::InvalidSsmlException(e) => {
                    SynthesisError::Rejected(e.to_string())
                }
                SynthesizeSpeechError::ServiceFailureException(e) => {
                    SynthesisError::Transport(e.to_string())
                }
                other if other.meta().code() == Some("ThrottlingException") => {
                    SynthesisError::Quota(other.to_string())
                }
                other => SynthesisError::Rejected(other.to_string()),
            },
            _ => SynthesisError::Transport(format!("{:?}", err)),
        }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    fn max_segment_chars(&self) -> usize {
        MAX_SEGMENT_CHARS
    }

    fn provider(&self) -> &'static str {
        "polly"
    }

    async fn synthesize(
        &self,
        segment: &str,
        language: LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError> {
        ensure_segment_fits(segment, MAX_SEGMENT_CHARS)?;

        let voice_name = Self::get_voice_for_language(language);
        let voice_id = VoiceId::from(voice_name);
        let engine = Engine::Neural;
        let start_time = std::time::Instant::now();

        tracing::debug!(
            language = %language,
            voice = voice_name,
            engine = ?engine,
            segment_length = segment.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(segment)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    language = %language,
                    voice = voice_name,
                    segment_length = segment.len(),
                    "AWS Polly synthesize_speech failed"
                );
                Self::classify_error(e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Transport(format!("failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::debug!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size = audio_bytes.len(),
            "Segment synthesized"
        );

        Ok(audio_bytes)
    }
}
