//! Inbound gateway events and the broadcast channel that carries them

use serde_json::Value;
use tokio::sync::broadcast;

/// Default buffer size for the inbound event broadcast channel
pub const EVENT_CHANNEL_SIZE: usize = 256;

/// Sender half of the event channel (owned by a gateway client)
pub type EventSender = broadcast::Sender<GatewayEvent>;

/// Receiver half of the event channel (one per subscriber)
pub type EventReceiver = broadcast::Receiver<GatewayEvent>;

/// Events pushed by the gateway after the stream is started
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Agent activity meant for display; the text lives at `payload.message`
    Ui(Value),

    /// Transport or stream failure
    Error(String),
}

impl GatewayEvent {
    /// Displayable text of a `Ui` event, if the payload carries one
    ///
    /// Returns `None` for error events and for payloads without a string
    /// `payload.message` field.
    pub fn ui_text(&self) -> Option<&str> {
        match self {
            GatewayEvent::Ui(value) => ui_message_text(value),
            GatewayEvent::Error(_) => None,
        }
    }
}

/// Text carried at `payload.message` of a `ui` event body
pub fn ui_message_text(value: &Value) -> Option<&str> {
    value
        .get("payload")
        .and_then(|payload| payload.get("message"))
        .and_then(Value::as_str)
}

/// Create a new event broadcast channel
///
/// Returns the sender. Receivers are created by calling `sender.subscribe()`.
pub fn create_event_channel() -> EventSender {
    let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ui_text_extraction() {
        let event = GatewayEvent::Ui(json!({"payload": {"message": "2 + 2 = 4"}}));
        assert_eq!(event.ui_text(), Some("2 + 2 = 4"));
    }

    #[test]
    fn test_ui_text_missing_or_malformed() {
        assert_eq!(GatewayEvent::Ui(json!({})).ui_text(), None);
        assert_eq!(GatewayEvent::Ui(json!({"payload": null})).ui_text(), None);
        assert_eq!(GatewayEvent::Ui(json!({"payload": {"message": 42}})).ui_text(), None);
        assert_eq!(GatewayEvent::Ui(json!("just a string")).ui_text(), None);
        assert_eq!(GatewayEvent::Error("boom".into()).ui_text(), None);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber() {
        let tx = create_event_channel();
        let mut rx1 = tx.subscribe();
        let mut rx2 = tx.subscribe();

        tx.send(GatewayEvent::Error("lost".into())).unwrap();

        assert_eq!(rx1.recv().await.unwrap(), GatewayEvent::Error("lost".into()));
        assert_eq!(rx2.recv().await.unwrap(), GatewayEvent::Error("lost".into()));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_events() {
        let tx = create_event_channel();
        let mut early = tx.subscribe();

        tx.send(GatewayEvent::Ui(json!({"n": 1}))).unwrap();
        let mut late = tx.subscribe();
        tx.send(GatewayEvent::Ui(json!({"n": 2}))).unwrap();

        assert_eq!(early.recv().await.unwrap(), GatewayEvent::Ui(json!({"n": 1})));
        assert_eq!(early.recv().await.unwrap(), GatewayEvent::Ui(json!({"n": 2})));
        assert_eq!(late.recv().await.unwrap(), GatewayEvent::Ui(json!({"n": 2})));
    }
}
