use async_trait::async_trait;
use rttm_backend::domain::content::ExtractedContent;
use rttm_backend::domain::pipeline::error::{
    ExtractionError, NotifyError, StorageError, SynthesisError,
};
use rttm_backend::domain::pipeline::language::LanguageCode;
use rttm_backend::infrastructure::repositories::{
    AudioStorageRepository, ExtractionRepository, SmsRepository, TtsRepository,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Extractor serving canned pages by URL
#[derive(Default)]
pub struct FakeExtractor {
    pages: Mutex<HashMap<String, Result<ExtractedContent, ExtractionError>>>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn serve(&self, url: &str, title: &str, body_text: &str) {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            Ok(ExtractedContent {
                title: title.to_string(),
                description: Some(format!("About {}", title)),
                body_text: body_text.to_string(),
            }),
        );
    }

    pub fn fail(&self, url: &str, err: ExtractionError) {
        self.pages.lock().unwrap().insert(url.to_string(), Err(err));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionRepository for FakeExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(ExtractionError::Status(404)))
    }

    fn provider(&self) -> &'static str {
        "fake"
    }
}

/// Synthesizer producing a marker per segment: `[<chars>]`
pub struct FakeSynthesizer {
    limit: usize,
    calls: AtomicUsize,
}

impl FakeSynthesizer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsRepository for FakeSynthesizer {
    fn max_segment_chars(&self) -> usize {
        self.limit
    }

    fn provider(&self) -> &'static str {
        "fake"
    }

    async fn synthesize(
        &self,
        segment: &str,
        _language: LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}]", segment.chars().count()).into_bytes())
    }
}

#[derive(Default)]
pub struct FakeStorage {
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeStorage {
    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioStorageRepository for FakeStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push((key.to_string(), data));
        Ok(format!("https://audio.test/{}", key))
    }
}

#[derive(Default)]
pub struct FakeSms {
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsRepository for FakeSms {
    async fn send(&self, phone: &str, message: &str) -> Result<String, NotifyError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((phone.to_string(), message.to_string()));
        Ok(format!("SM{}", sent.len()))
    }
}
