pub mod content_repository;
pub mod delivery_repository;
pub mod embedly_extraction_repository;
pub mod extraction_repository;
pub mod html_extraction_repository;
pub mod memory_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod s3_storage_repository;
pub mod sms_repository;
pub mod storage_repository;
pub mod tts_repository;
pub mod twilio_sms_repository;

pub use content_repository::{ContentRepository, CreateOutcome, PgContentRepository};
pub use delivery_repository::{DeliveryRepository, PgDeliveryRepository};
pub use embedly_extraction_repository::EmbedlyExtractionRepository;
pub use extraction_repository::ExtractionRepository;
pub use html_extraction_repository::HtmlExtractionRepository;
pub use memory_repository::InMemoryRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use s3_storage_repository::S3StorageRepository;
pub use sms_repository::SmsRepository;
pub use storage_repository::AudioStorageRepository;
pub use tts_repository::TtsRepository;
pub use twilio_sms_repository::TwilioSmsRepository;
