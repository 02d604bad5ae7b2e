pub mod error;
pub mod model;
pub mod service;

pub use error::ContentServiceError;
pub use model::{ContentRecord, ContentResponse, ExtractedContent};
pub use service::{ContentService, ContentServiceApi};
