//! Scripted adapter doubles for pipeline tests.

use crate::domain::content::{ContentRecord, ExtractedContent};
use crate::domain::delivery::{DeliveryRequest, ResolvedDelivery};
use crate::domain::pipeline::error::{ExtractionError, NotifyError, StorageError, SynthesisError};
use crate::domain::pipeline::language::LanguageCode;
use crate::domain::pipeline::service::{PipelineService, PipelineSettings};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    AudioStorageRepository, ContentRepository, CreateOutcome, DeliveryRepository,
    ExtractionRepository, InMemoryRepository, SmsRepository, TtsRepository,
};
use async_trait::async_trait;
use uuid::Uuid;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct ScriptedExtractor {
    pub result: Result<ExtractedContent, ExtractionError>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn returning(title: &str, body_text: String) -> Self {
        Self {
            result: Ok(ExtractedContent {
                title: title.to_string(),
                description: None,
                body_text,
            }),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: ExtractionError) -> Self {
        Self {
            result: Err(err),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionRepository for ScriptedExtractor {
    async fn extract(&self, _url: &str) -> Result<ExtractedContent, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    fn provider(&self) -> &'static str {
        "scripted"
    }
}

/// Synthesizer whose "audio" for a segment is the segment's own bytes, so an
/// assembled stream can be compared with the source text.
pub struct EchoSynthesizer {
    pub limit: usize,
    /// Zero-based call index that fails with `Transport`
    pub fail_on_call: Option<usize>,
    /// Sleep for call `i` is `delays[i]`; lets later segments finish first
    pub delays: Vec<Duration>,
    pub calls: AtomicUsize,
    pub segments: Mutex<Vec<String>>,
}

impl EchoSynthesizer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            fail_on_call: None,
            delays: Vec::new(),
            calls: AtomicUsize::new(0),
            segments: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.delays = delays;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn segment_lengths(&self) -> Vec<usize> {
        self.segments
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.chars().count())
            .collect()
    }
}

#[async_trait]
impl TtsRepository for EchoSynthesizer {
    fn max_segment_chars(&self) -> usize {
        self.limit
    }

    fn provider(&self) -> &'static str {
        "echo"
    }

    async fn synthesize(
        &self,
        segment: &str,
        _language: LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.segments.lock().unwrap().push(segment.to_string());

        if let Some(delay) = self.delays.get(call) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(SynthesisError::Transport("connection reset".to_string()));
        }
        Ok(segment.as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct RecordingStorage {
    pub fail: Option<StorageError>,
    pub attempts: AtomicUsize,
    pub uploads: Mutex<Vec<(String, usize, String)>>,
}

impl RecordingStorage {
    pub fn failing(err: StorageError) -> Self {
        Self {
            fail: Some(err),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Uploads that succeeded
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioStorageRepository for RecordingStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), data.len(), content_type.to_string()));
        Ok(format!("https://cdn.test/{}", key))
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub fail: bool,
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsRepository for RecordingSms {
    async fn send(&self, phone: &str, message: &str) -> Result<String, NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((phone.to_string(), message.to_string()));
        if self.fail {
            return Err(NotifyError::Gateway("carrier unavailable".to_string()));
        }
        Ok(format!("SM{}", self.messages.lock().unwrap().len()))
    }
}

/// Store failures to inject; each flag breaks one call
#[derive(Debug, Clone, Default)]
pub struct StoreFaults {
    pub find_by_url: bool,
    pub create_content: bool,
    pub create_request: bool,
    /// Added before a request write reaches the store
    pub request_write_delay: Duration,
}

/// In-memory store that fails or stalls on command
pub struct FaultyStore {
    pub inner: Arc<InMemoryRepository>,
    pub faults: StoreFaults,
}

fn unavailable() -> AppError {
    AppError::StoreUnavailable("connection refused".to_string())
}

#[async_trait]
impl ContentRepository for FaultyStore {
    async fn find_by_url(&self, canonical_url: &str) -> AppResult<Option<ContentRecord>> {
        if self.faults.find_by_url {
            return Err(unavailable());
        }
        self.inner.find_by_url(canonical_url).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ContentRecord>> {
        ContentRepository::find_by_id(self.inner.as_ref(), id).await
    }

    async fn create_if_absent(&self, candidate: ContentRecord) -> AppResult<CreateOutcome> {
        if self.faults.create_content {
            return Err(unavailable());
        }
        self.inner.create_if_absent(candidate).await
    }

    async fn check_health(&self) -> AppResult<()> {
        self.inner.check_health().await
    }
}

#[async_trait]
impl DeliveryRepository for FaultyStore {
    async fn create(&self, request: DeliveryRequest) -> AppResult<DeliveryRequest> {
        if self.faults.create_request {
            return Err(unavailable());
        }
        if !self.faults.request_write_delay.is_zero() {
            tokio::time::sleep(self.faults.request_write_delay).await;
        }
        self.inner.create(request).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResolvedDelivery>> {
        DeliveryRepository::find_by_id(self.inner.as_ref(), id).await
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<ResolvedDelivery>> {
        self.inner.find_by_phone(phone).await
    }
}

/// Everything a pipeline test wires together, kept so assertions can reach
/// the doubles after a run
pub struct Harness {
    pub store: Arc<InMemoryRepository>,
    pub extractor: Arc<ScriptedExtractor>,
    pub synthesizer: Arc<EchoSynthesizer>,
    pub storage: Arc<RecordingStorage>,
    pub sms: Arc<RecordingSms>,
    pub service: Arc<PipelineService>,
}

impl Harness {
    pub fn new(extractor: ScriptedExtractor, synthesizer: EchoSynthesizer) -> Self {
        Self::with(
            extractor,
            synthesizer,
            RecordingSms::default(),
            PipelineSettings::default(),
        )
    }

    pub fn with(
        extractor: ScriptedExtractor,
        synthesizer: EchoSynthesizer,
        sms: RecordingSms,
        settings: PipelineSettings,
    ) -> Self {
        Self::build(
            extractor,
            synthesizer,
            RecordingStorage::default(),
            sms,
            StoreFaults::default(),
            settings,
        )
    }

    pub fn build(
        extractor: ScriptedExtractor,
        synthesizer: EchoSynthesizer,
        storage: RecordingStorage,
        sms: RecordingSms,
        faults: StoreFaults,
        settings: PipelineSettings,
    ) -> Self {
        let store = Arc::new(InMemoryRepository::new());
        let faulty = Arc::new(FaultyStore {
            inner: store.clone(),
            faults,
        });
        let extractor = Arc::new(extractor);
        let synthesizer = Arc::new(synthesizer);
        let storage = Arc::new(storage);
        let sms = Arc::new(sms);

        let service = Arc::new(PipelineService::new(
            faulty.clone(),
            faulty,
            extractor.clone(),
            synthesizer.clone(),
            storage.clone(),
            sms.clone(),
            settings,
        ));

        Self {
            store,
            extractor,
            synthesizer,
            storage,
            sms,
            service,
        }
    }
}
