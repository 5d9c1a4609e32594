/// SMS delivery channel
///
/// One synchronous attempt per message, no retries and no idempotency key.
/// Any failure (transport error, non-2xx response) is reported as
/// `DeliveryFailed`; the caller decides what to roll back.
use crate::config::SmsSettings;
use crate::error::{IdentityError, Result};
use crate::validators::mask_phone;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsChannel: Send + Sync {
    async fn send(&self, to: &str, from: &str, body: &str) -> Result<()>;
}

/// Twilio Messages API client
#[derive(Clone)]
pub struct TwilioSmsChannel {
    client: Client,
    account_sid: String,
    auth_token: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl TwilioSmsChannel {
    pub fn new(settings: &SmsSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            account_sid: settings.account_sid.clone(),
            auth_token: settings.auth_token.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait]
impl SmsChannel for TwilioSmsChannel {
    async fn send(&self, to: &str, from: &str, body: &str) -> Result<()> {
        let form = [("To", to), ("From", from), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %mask_phone(to), "Twilio request failed");
                IdentityError::DeliveryFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                to = %mask_phone(to),
                response = %body,
                "Twilio rejected message"
            );
            return Err(IdentityError::DeliveryFailed(format!(
                "Twilio returned {status}"
            )));
        }

        match response.json::<MessageResponse>().await {
            Ok(message) => info!(sid = %message.sid, to = %mask_phone(to), "SMS queued"),
            Err(e) => info!(error = %e, to = %mask_phone(to), "SMS accepted, response body unreadable"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_base: &str) -> SmsSettings {
        SmsSettings {
            account_sid: "AC0123".to_string(),
            auth_token: "secret".to_string(),
            from_phone: "+15550001111".to_string(),
            api_base: api_base.to_string(),
        }
    }

    #[test]
    fn test_messages_url() {
        let channel = TwilioSmsChannel::new(&settings("https://api.twilio.com/")).unwrap();
        assert_eq!(
            channel.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC0123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_delivery_failure() {
        // Nothing listens on port 1
        let channel = TwilioSmsChannel::new(&settings("http://127.0.0.1:1")).unwrap();
        let result = channel
            .send("+15551234567", "+15550001111", "Your verification code is: 123456")
            .await;
        assert!(matches!(result, Err(IdentityError::DeliveryFailed(_))));
    }
}
