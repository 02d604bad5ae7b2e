use super::sms_repository::SmsRepository;
use crate::domain::pipeline::error::NotifyError;
use async_trait::async_trait;
use serde::Deserialize;

const TWILIO_API_URL: &str = "https://api.twilio.com/2010-04-01";

/// Twilio error codes meaning the recipient cannot receive the message
const RECIPIENT_ERROR_CODES: &[u32] = &[21211, 21408, 21610, 21612, 21614];

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    code: Option<u32>,
    message: Option<String>,
}

/// Twilio Programmable Messaging implementation of SMS repository
pub struct TwilioSmsRepository {
    account_sid: String,
    auth_token: String,
    from_number: String,
    http_client: reqwest::Client,
}

impl TwilioSmsRepository {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            account_sid,
            auth_token,
            from_number,
            http_client,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", TWILIO_API_URL, self.account_sid)
    }
}

fn classify_failure(status: u16, body: &str) -> NotifyError {
    let parsed = serde_json::from_str::<TwilioError>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.code);
    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("status {}", status));

    match code {
        Some(code) if RECIPIENT_ERROR_CODES.contains(&code) => NotifyError::InvalidRecipient(message),
        _ => NotifyError::Gateway(message),
    }
}

#[async_trait]
impl SmsRepository for TwilioSmsRepository {
    async fn send(&self, phone: &str, message: &str) -> Result<String, NotifyError> {
        let params = [
            ("To", phone),
            ("From", self.from_number.as_str()),
            ("Body", message),
        ];

        let response = self
            .http_client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| NotifyError::Gateway(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_failure(status.as_u16(), &error_text));
        }

        let sent = response
            .json::<TwilioMessage>()
            .await
            .map_err(|e| NotifyError::Gateway(format!("Failed to parse Twilio response: {}", e)))?;

        tracing::debug!(message_sid = %sent.sid, "SMS accepted by Twilio");
        Ok(sent.sid)
    }
}
