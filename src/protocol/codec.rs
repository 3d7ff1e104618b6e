//! JSON wire codec
//!
//! Translates between protocol events and WebSocket text messages. Both
//! directions go through `serde_json`; non-text frames are handled by the
//! connection layer, never here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;

/// Encode an event as a WebSocket text message
pub fn encode<T: Serialize>(value: &T) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(value)?))
}

/// Decode an event from the text payload of a WebSocket message
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ClientEvent, ServerEvent};

    #[test]
    fn test_round_trip() {
        let event = ClientEvent::StartQuiz {
            room_code: "12345678".into(),
        };

        let message = encode(&event).unwrap();
        let Message::Text(text) = message else {
            panic!("expected a text frame");
        };
        let decoded: ClientEvent = decode(&text).unwrap();

        assert_eq!(decoded, event);
    }

    #[test]
    fn test_decode_rejects_malformed_frame() {
        assert!(decode::<ServerEvent>("not json").is_err());
        assert!(decode::<ServerEvent>(r#"{"event":"noSuchEvent","data":{}}"#).is_err());
    }
}
