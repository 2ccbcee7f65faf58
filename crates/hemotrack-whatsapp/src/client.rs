//! WhatsApp Cloud API sender.

use hemotrack_core::notify::{MessageSender, SendError};

use crate::config::WhatsAppConfig;
use crate::payload;

/// [`MessageSender`] backed by the WhatsApp Cloud API.
///
/// Without the `cloud-api` feature the sender refuses every send with a
/// provider error rather than pretending to deliver; the core's simulated
/// sender is the right tool for offline use.
pub struct WhatsAppSender {
    config: WhatsAppConfig,
    #[cfg(feature = "cloud-api")]
    client: reqwest::blocking::Client,
}

impl WhatsAppSender {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            #[cfg(feature = "cloud-api")]
            client: reqwest::blocking::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &WhatsAppConfig {
        &self.config
    }
}

impl MessageSender for WhatsAppSender {
    #[cfg(feature = "cloud-api")]
    fn send(&self, recipient: &str, body: &str, message_ref: &str) -> Result<(), SendError> {
        let payload = payload::text_message(recipient, body, message_ref);
        let response = self
            .client
            .post(self.config.messages_endpoint())
            .bearer_auth(self.config.access_token())
            .timeout(self.config.timeout())
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout(self.config.timeout())
                } else {
                    SendError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            tracing::warn!(
                "cloud api rejected message {}: {} {}",
                message_ref,
                status,
                detail
            );
            return Err(SendError::Provider(format!(
                "cloud api returned {status}: {detail}"
            )));
        }

        match response.json::<payload::SendResponse>() {
            Ok(parsed) => tracing::debug!(
                "cloud api accepted message {} as {:?}",
                message_ref,
                parsed.message_id()
            ),
            Err(e) => tracing::warn!("could not parse cloud api response: {}", e),
        }
        Ok(())
    }

    #[cfg(not(feature = "cloud-api"))]
    fn send(&self, _recipient: &str, _body: &str, _message_ref: &str) -> Result<(), SendError> {
        Err(SendError::Provider(
            "hemotrack-whatsapp was built without the cloud-api feature".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sender() -> WhatsAppSender {
        WhatsAppSender::new(WhatsAppConfig::new("token-abc".into(), "10000001".into()).unwrap())
    }

    #[test]
    fn test_sender_keeps_its_config() {
        let sender = make_sender();
        assert_eq!(
            sender.config().messages_endpoint(),
            "https://graph.facebook.com/v19.0/10000001/messages"
        );
    }

    #[cfg(not(feature = "cloud-api"))]
    #[test]
    fn test_send_refused_without_feature() {
        let sender = make_sender();
        let err = sender.send("555-0100", "hello", "ref-1").unwrap_err();
        assert!(matches!(err, SendError::Provider(_)));
    }
}
