use super::assembler::assemble;
use super::chunker::chunk;
use super::error::{
    ExtractionError, NotifyError, PersistenceError, PipelineError, PipelineStage, StorageError,
    SynthesisError,
};
use super::language::{LanguageCode, LanguageGuesser};
use super::submission::Submission;
use crate::domain::content::{ContentRecord, ExtractedContent};
use crate::domain::delivery::DeliveryRequest;
use crate::infrastructure::repositories::{
    AudioStorageRepository, ContentRepository, DeliveryRepository, ExtractionRepository,
    SmsRepository, TtsRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Upper bound for any single adapter call and for the content lookup.
    /// Store writes are left to the pool's own timeouts: abandoning a write
    /// could hide a row that was committed anyway.
    pub adapter_timeout: Duration,
    /// Segments synthesized at once; results are still assembled in order
    pub synthesis_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(60),
            synthesis_concurrency: 1,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub request: DeliveryRequest,
    pub content: ContentRecord,
    /// The content already existed, nothing was extracted or synthesized
    pub cache_hit: bool,
    pub notified: bool,
}

/// Terminal state of one run
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(PipelineReport),
    Failed(PipelineError),
}

impl PipelineOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed(_))
    }

    /// `Done` for a completed run, otherwise the stage that failed
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineOutcome::Completed(_) => PipelineStage::Done,
            PipelineOutcome::Failed(err) => err.stage,
        }
    }

    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineOutcome::Failed(err) => Some(err.stage),
            PipelineOutcome::Completed(_) => None,
        }
    }
}

pub struct PipelineService {
    content_repo: Arc<dyn ContentRepository>,
    delivery_repo: Arc<dyn DeliveryRepository>,
    extraction_repo: Arc<dyn ExtractionRepository>,
    tts_repo: Arc<dyn TtsRepository>,
    storage_repo: Arc<dyn AudioStorageRepository>,
    sms_repo: Arc<dyn SmsRepository>,
    language_guesser: LanguageGuesser,
    settings: PipelineSettings,
}

impl PipelineService {
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        delivery_repo: Arc<dyn DeliveryRepository>,
        extraction_repo: Arc<dyn ExtractionRepository>,
        tts_repo: Arc<dyn TtsRepository>,
        storage_repo: Arc<dyn AudioStorageRepository>,
        sms_repo: Arc<dyn SmsRepository>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            content_repo,
            delivery_repo,
            extraction_repo,
            tts_repo,
            storage_repo,
            sms_repo,
            language_guesser: LanguageGuesser::new(),
            settings,
        }
    }
}

#[async_trait]
pub trait PipelineServiceApi: Send + Sync {
    /// Turn a validated submission into a delivered audio notification.
    ///
    /// This operation:
    /// - Reuses the stored content for the URL when there is one
    /// - Otherwise extracts, synthesizes, assembles and uploads the audio,
    ///   then stores the content (a concurrent run may win the store)
    /// - Records a delivery request for the phone
    /// - Sends the SMS notification, best effort
    ///
    /// Never retries. A failure at any stage ends the run with nothing
    /// persisted by that stage.
    async fn run(&self, run_id: Uuid, submission: Submission) -> PipelineOutcome;
}

#[async_trait]
impl PipelineServiceApi for PipelineService {
    async fn run(&self, run_id: Uuid, submission: Submission) -> PipelineOutcome {
        let start_time = std::time::Instant::now();
        let url = submission.canonical_url.clone();
        let phone = submission.phone.clone();

        match self.execute(run_id, submission).await {
            Ok(report) => {
                tracing::info!(
                    run_id = %run_id,
                    stage = %PipelineStage::Done,
                    url = %url,
                    phone = %phone,
                    content_id = %report.content.id,
                    request_id = %report.request.id,
                    cache_hit = report.cache_hit,
                    notified = report.notified,
                    latency_ms = start_time.elapsed().as_millis(),
                    "Pipeline run completed"
                );
                PipelineOutcome::Completed(report)
            }
            Err(err) => {
                tracing::error!(
                    run_id = %run_id,
                    url = %url,
                    phone = %phone,
                    stage = %err.stage,
                    error = %err.source,
                    latency_ms = start_time.elapsed().as_millis(),
                    "Pipeline run failed"
                );
                PipelineOutcome::Failed(err)
            }
        }
    }
}

impl PipelineService {
    async fn execute(
        &self,
        run_id: Uuid,
        submission: Submission,
    ) -> Result<PipelineReport, PipelineError> {
        let Submission {
            canonical_url,
            phone,
        } = submission;

        tracing::debug!(run_id = %run_id, stage = %PipelineStage::Resolving, url = %canonical_url);
        let existing = self
            .bounded(
                async {
                    self.content_repo
                        .find_by_url(&canonical_url)
                        .await
                        .map_err(PersistenceError::read)
                },
                PersistenceError::Timeout,
            )
            .await
            .map_err(|e| PipelineError::new(PipelineStage::Resolving, e))?;

        let (content, cache_hit) = match existing {
            Some(record) => {
                tracing::info!(run_id = %run_id, content_id = %record.id, "Content already rendered, skipping synthesis");
                (record, true)
            }
            None => (self.render(run_id, &canonical_url).await?, false),
        };

        tracing::debug!(run_id = %run_id, stage = %PipelineStage::PersistingRequest, content_id = %content.id);
        let request = self
            .delivery_repo
            .create(DeliveryRequest::new(content.id, phone.as_str()))
            .await
            .map_err(|e| {
                PipelineError::new(PipelineStage::PersistingRequest, PersistenceError::write(e))
            })?;

        let notified = self.notify(run_id, &request.phone, &content).await;

        Ok(PipelineReport {
            request,
            content,
            cache_hit,
            notified,
        })
    }

    /// Produce and store the content record for a URL nobody has rendered yet.
    /// Returns whichever record the store kept.
    async fn render(&self, run_id: Uuid, canonical_url: &str) -> Result<ContentRecord, PipelineError> {
        tracing::debug!(run_id = %run_id, stage = %PipelineStage::ExtractingContent, provider = self.extraction_repo.provider());
        let extracted = self
            .bounded(self.extraction_repo.extract(canonical_url), ExtractionError::Timeout)
            .await
            .and_then(|extracted| {
                let body_text = extracted.body_text.trim();
                if body_text.is_empty() {
                    return Err(ExtractionError::EmptyBody);
                }
                Ok(ExtractedContent {
                    body_text: body_text.to_string(),
                    ..extracted
                })
            })
            .map_err(|e| PipelineError::new(PipelineStage::ExtractingContent, e))?;

        let buffers = self
            .synthesize_all(run_id, &extracted.body_text)
            .await
            .map_err(|e| PipelineError::new(PipelineStage::Synthesizing, e))?;

        tracing::debug!(run_id = %run_id, stage = %PipelineStage::Assembling, segments = buffers.len());
        let audio = assemble(buffers);

        let content_id = Uuid::new_v4();
        let key = format!("audio/{}.mp3", content_id);
        tracing::debug!(run_id = %run_id, stage = %PipelineStage::Uploading, key = %key, size = audio.byte_length);
        let audio_url = self
            .bounded(
                self.storage_repo.upload(&key, audio.bytes, AUDIO_CONTENT_TYPE),
                StorageError::Timeout,
            )
            .await
            .map_err(|e| PipelineError::new(PipelineStage::Uploading, e))?;

        let candidate = ContentRecord {
            id: content_id,
            canonical_url: canonical_url.to_string(),
            title: extracted.title,
            description: extracted.description,
            body_text: extracted.body_text,
            audio_url,
            audio_byte_length: audio.byte_length as i64,
            created_at: Utc::now(),
        };

        tracing::debug!(run_id = %run_id, stage = %PipelineStage::PersistingContent, content_id = %content_id);
        let outcome = self
            .content_repo
            .create_if_absent(candidate)
            .await
            .map_err(|e| {
                PipelineError::new(PipelineStage::PersistingContent, PersistenceError::write(e))
            })?;

        if !outcome.was_created() {
            tracing::info!(
                run_id = %run_id,
                url = %canonical_url,
                discarded_content_id = %content_id,
                content_id = %outcome.record().id,
                "Concurrent run stored this URL first, using its content"
            );
        }

        Ok(outcome.into_record())
    }

    /// Synthesize every segment of `body_text`, returning the buffers in
    /// segment order whatever order they complete in
    async fn synthesize_all(&self, run_id: Uuid, body_text: &str) -> Result<Vec<Vec<u8>>, SynthesisError> {
        let language = self.language_guesser.detect(body_text);
        let segments = chunk(body_text, self.tts_repo.max_segment_chars());
        let total = segments.len();

        tracing::debug!(
            run_id = %run_id,
            stage = %PipelineStage::Synthesizing,
            provider = self.tts_repo.provider(),
            language = %language,
            segments = total,
            "Synthesizing article"
        );

        let segments: Vec<String> = segments.into_iter().map(str::to_string).collect();
        stream::iter(segments.into_iter().enumerate())
            .map(|(index, segment)| self.synthesize_segment(run_id, index, total, segment, language))
            .buffered(self.settings.synthesis_concurrency.max(1))
            .try_collect()
            .await
    }

    async fn synthesize_segment(
        &self,
        run_id: Uuid,
        index: usize,
        total: usize,
        segment: String,
        language: LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError> {
        let audio = self
            .bounded(self.tts_repo.synthesize(&segment, language), SynthesisError::Timeout)
            .await
            .map_err(|e| {
                tracing::warn!(
                    run_id = %run_id,
                    segment_index = index,
                    segments = total,
                    error = %e,
                    "Segment synthesis failed"
                );
                e
            })?;

        tracing::debug!(
            run_id = %run_id,
            segment_index = index,
            segments = total,
            audio_size = audio.len(),
            "Segment synthesized"
        );
        Ok(audio)
    }

    /// Send the notification; failures are logged and never undo the run
    async fn notify(&self, run_id: Uuid, phone: &str, content: &ContentRecord) -> bool {
        let message = format!("{}\n{}", content.title, content.audio_url);

        match self
            .bounded(self.sms_repo.send(phone, &message), NotifyError::Timeout)
            .await
        {
            Ok(ack) => {
                tracing::debug!(run_id = %run_id, stage = %PipelineStage::Notifying, ack = %ack, "Notification sent");
                true
            }
            Err(e) => {
                tracing::warn!(
                    run_id = %run_id,
                    stage = %PipelineStage::Notifying,
                    phone = %phone,
                    content_id = %content.id,
                    error = %e,
                    "Notification failed, delivery stays recorded"
                );
                false
            }
        }
    }

    /// Run an adapter call under the configured timeout, reporting expiry as
    /// the adapter's own `Timeout` error
    async fn bounded<T, E, F>(&self, call: F, on_timeout: E) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.settings.adapter_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout),
        }
    }
}
