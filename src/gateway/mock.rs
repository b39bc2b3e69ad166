//! In-memory gateway double for controller tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::json;
use tokio::sync::broadcast;

use crate::core::{ChatError, ChatResult};

use super::client::{GatewayClient, MessagePayload, SessionInfo};
use super::events::{create_event_channel, EventSender, GatewayEvent};

/// Gateway that answers immediately with scripted outcomes
pub struct MockGateway {
    handshake_result: Mutex<Result<SessionInfo, String>>,
    session: Mutex<Option<SessionInfo>>,
    fail_sends: AtomicBool,
    fail_stream_start: AtomicBool,
    sent: Mutex<Vec<(String, MessagePayload)>>,
    handshakes: AtomicUsize,
    stream_starts: AtomicUsize,
    stream_stops: AtomicUsize,
    streaming: AtomicBool,
    events: EventSender,
}

impl MockGateway {
    /// Gateway whose handshake succeeds with `session_id`
    pub fn accepting(session_id: &str) -> Self {
        Self::with_handshake(Ok(SessionInfo::new(session_id, "agents/adder.json")))
    }

    /// Gateway whose handshake fails
    pub fn rejecting() -> Self {
        Self::with_handshake(Err("handshake refused".to_string()))
    }

    fn with_handshake(result: Result<SessionInfo, String>) -> Self {
        Self {
            handshake_result: Mutex::new(result),
            session: Mutex::new(None),
            fail_sends: AtomicBool::new(false),
            fail_stream_start: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            handshakes: AtomicUsize::new(0),
            stream_starts: AtomicUsize::new(0),
            stream_stops: AtomicUsize::new(0),
            streaming: AtomicBool::new(false),
            events: create_event_channel(),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stream_start(&self, fail: bool) {
        self.fail_stream_start.store(fail, Ordering::SeqCst);
    }

    /// Push a `ui` event carrying `text` at `payload.message`
    pub fn emit_ui(&self, text: &str) {
        self.emit(GatewayEvent::Ui(json!({"payload": {"message": text}})));
    }

    pub fn emit(&self, event: GatewayEvent) {
        let _ = self.events.send(event);
    }

    pub fn sent(&self) -> Vec<(String, MessagePayload)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn stream_starts(&self) -> usize {
        self.stream_starts.load(Ordering::SeqCst)
    }

    pub fn stream_stops(&self) -> usize {
        self.stream_stops.load(Ordering::SeqCst)
    }

    /// Whether a started stream has not been stopped since
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GatewayClient for MockGateway {
    async fn handshake(&self) -> ChatResult<SessionInfo> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        let result = self.handshake_result.lock().unwrap().clone();
        match result {
            Ok(session) => {
                *self.session.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
            Err(msg) => Err(ChatError::other(msg)),
        }
    }

    async fn send_message(&self, message_type: &str, payload: MessagePayload) -> ChatResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((message_type.to_string(), payload));
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ChatError::Gateway {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        Ok(())
    }

    async fn start_event_stream(&self) -> ChatResult<()> {
        self.stream_starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_stream_start.load(Ordering::SeqCst) {
            return Err(ChatError::event_stream("refused"));
        }
        self.streaming.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_event_stream(&self) {
        self.stream_stops.fetch_add(1, Ordering::SeqCst);
        self.streaming.store(false, Ordering::SeqCst);
    }

    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    fn session_id(&self) -> Option<String> {
        self.session.lock().unwrap().as_ref().map(|s| s.session_id.clone())
    }

    fn agent_id(&self) -> Option<String> {
        self.session.lock().unwrap().as_ref().map(|s| s.agent_id.clone())
    }
}
