use crate::domain::pipeline::error::NotifyError;
use async_trait::async_trait;

/// Repository for outbound text messages
#[async_trait]
pub trait SmsRepository: Send + Sync {
    /// Send `message` to an E.164 `phone` number, returning the provider's
    /// acknowledgement id
    async fn send(&self, phone: &str, message: &str) -> Result<String, NotifyError>;
}
