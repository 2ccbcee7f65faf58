//! Provider configuration.
//!
//! Resolved once at process startup and passed into the sender, so request
//! handling never reads process-wide environment state.

use std::time::Duration;

use thiserror::Error;

/// Default Cloud API base URL.
pub const DEFAULT_API_URL: &str = "https://graph.facebook.com/v19.0";

/// Default bound on a single send. Expiry is reported as a failed dispatch,
/// never as a transition.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Cloud API connection settings.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    api_url: String,
    access_token: String,
    /// Phone-number ID the messages are sent from
    sender_id: String,
    timeout: Duration,
}

impl WhatsAppConfig {
    /// Create a config for the given business phone-number ID.
    pub fn new(access_token: String, sender_id: String) -> Result<Self, ConfigError> {
        if access_token.trim().is_empty() {
            return Err(ConfigError::Invalid("access_token cannot be empty".into()));
        }
        if sender_id.trim().is_empty() {
            return Err(ConfigError::Invalid("sender_id cannot be empty".into()));
        }
        Ok(Self {
            api_url: DEFAULT_API_URL.into(),
            access_token,
            sender_id,
            timeout: DEFAULT_SEND_TIMEOUT,
        })
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the send timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Messages endpoint for the configured sender number.
    pub fn messages_endpoint(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_url.trim_end_matches('/'),
            self.sender_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = WhatsAppConfig::new("token-abc".into(), "10000001".into()).unwrap();
        assert_eq!(config.timeout(), DEFAULT_SEND_TIMEOUT);
        assert_eq!(
            config.messages_endpoint(),
            "https://graph.facebook.com/v19.0/10000001/messages"
        );
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert!(WhatsAppConfig::new("".into(), "10000001".into()).is_err());
        assert!(WhatsAppConfig::new("token-abc".into(), "  ".into()).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = WhatsAppConfig::new("token-abc".into(), "10000001".into())
            .unwrap()
            .with_api_url("http://localhost:9000/")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(
            config.messages_endpoint(),
            "http://localhost:9000/10000001/messages"
        );
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}
