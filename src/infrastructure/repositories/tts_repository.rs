use crate::domain::pipeline::error::SynthesisError;
use crate::domain::pipeline::language::LanguageCode;
use async_trait::async_trait;

/// Repository for TTS synthesis of a single text segment.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, ...).
///
/// Splitting long text and merging the resulting audio happen in the pipeline;
/// implementations only ever see one segment per call. Every implementation
/// returns MP3 at a fixed bitrate so segment outputs can be concatenated.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Largest segment, in characters, the provider accepts per request
    fn max_segment_chars(&self) -> usize;

    /// Provider name for logs
    fn provider(&self) -> &'static str;

    /// Synthesize one segment to MP3 bytes
    ///
    /// # Errors
    /// Returns `SegmentTooLong` without calling the provider when `segment`
    /// exceeds `max_segment_chars`, otherwise the provider's failure.
    async fn synthesize(
        &self,
        segment: &str,
        language: LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError>;
}

/// Guard shared by implementations: reject segments over the provider limit
pub fn ensure_segment_fits(segment: &str, limit: usize) -> Result<(), SynthesisError> {
    let len = segment.chars().count();
    if len > limit {
        return Err(SynthesisError::SegmentTooLong { len, limit });
    }
    Ok(())
}
