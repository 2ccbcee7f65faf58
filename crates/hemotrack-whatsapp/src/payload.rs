//! Cloud API message payloads and responses.

use serde::Deserialize;
use serde_json::{json, Value};

/// Build the JSON body for a text message.
///
/// `message_ref` travels as `biz_opaque_callback_data`, the Cloud API's
/// opaque per-message field, so delivery callbacks can be correlated with
/// the dispatch attempt that produced them.
pub fn text_message(recipient: &str, body: &str, message_ref: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": recipient,
        "type": "text",
        "text": {
            "preview_url": false,
            "body": body,
        },
        "biz_opaque_callback_data": message_ref,
    })
}

/// Successful send response from the Cloud API.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessageId>,
}

/// Provider-assigned message identifier.
#[derive(Debug, Deserialize)]
pub struct SentMessageId {
    pub id: String,
}

impl SendResponse {
    /// ID of the first accepted message, when the provider returned one.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_shape() {
        let payload = text_message("555-0100", "Your results are ready", "ref-123");

        assert_eq!(payload["messaging_product"], "whatsapp");
        assert_eq!(payload["to"], "555-0100");
        assert_eq!(payload["type"], "text");
        assert_eq!(payload["text"]["body"], "Your results are ready");
        assert_eq!(payload["biz_opaque_callback_data"], "ref-123");
    }

    #[test]
    fn test_body_is_passed_through_verbatim() {
        let body = "Line one\nLine two: WBC 6.2, RBC 4.7";
        let payload = text_message("555-0100", body, "ref-123");
        assert_eq!(payload["text"]["body"], body);
    }

    #[test]
    fn test_parse_send_response() {
        let raw = r#"{
            "messaging_product": "whatsapp",
            "contacts": [{"input": "555-0100", "wa_id": "15550100"}],
            "messages": [{"id": "wamid.HBgL"}]
        }"#;
        let response: SendResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.message_id(), Some("wamid.HBgL"));
    }

    #[test]
    fn test_parse_response_without_messages() {
        let response: SendResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.message_id(), None);
    }
}
