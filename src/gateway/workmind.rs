//! Workmind gateway client
//!
//! HTTP client for the Workmind agent gateway:
//! - `POST /handshake` opens a session for the configured agent
//! - `POST /sessions/{id}/messages` delivers typed messages
//! - `GET /sessions/{id}/events` is a server-sent event stream of `ui` and
//!   `error` events, forwarded to subscribers
//!
//! ```ignore
//! let client = WorkmindClient::new(GatewayConfig::default())?;
//! let mut events = client.subscribe();
//! let session = client.handshake().await?;
//! client.start_event_stream().await?;
//! client.send_message("user_message", MessagePayload::text("hello")).await?;
//! ```

use std::sync::{Mutex, PoisonError, RwLock};

use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::io::StreamReader;

use crate::core::{ChatError, ChatResult};

use super::client::{GatewayClient, MessagePayload, SessionInfo};
use super::config::GatewayConfig;
use super::events::{create_event_channel, EventSender, GatewayEvent};
use super::sse::{sse_events, SseEvent};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HandshakeRequest<'a> {
    agent_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandshakeResponse {
    session_id: String,
    #[serde(default)]
    agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'a str,
    payload: &'a MessagePayload,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP + SSE client for one Workmind gateway session
pub struct WorkmindClient {
    http: Client,
    config: GatewayConfig,
    /// Populated by a successful handshake
    session: RwLock<Option<SessionInfo>>,
    events: EventSender,
    stream: Mutex<StreamSlot>,
}

/// Event stream reader state
#[derive(Default)]
struct StreamSlot {
    /// Bumped by every stop; a start that began before a stop is discarded
    generation: u64,
    /// Session the reader belongs to, and the reader task
    task: Option<(String, JoinHandle<()>)>,
}

impl StreamSlot {
    fn running_for(&self, session_id: &str) -> bool {
        self.task
            .as_ref()
            .is_some_and(|(id, task)| id == session_id && !task.is_finished())
    }
}

impl WorkmindClient {
    /// Create a client for the given gateway configuration
    pub fn new(config: GatewayConfig) -> ChatResult<Self> {
        config.validate()?;

        tracing::info!("Creating Workmind client for {}", config.base_url);
        tracing::info!("Agent: {}", config.agent_id);

        Ok(Self {
            http: Client::builder().build()?,
            config,
            session: RwLock::new(None),
            events: create_event_channel(),
            stream: Mutex::new(StreamSlot::default()),
        })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Whether the event stream reader is currently running
    pub fn is_streaming(&self) -> bool {
        self.stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .task
            .as_ref()
            .is_some_and(|(_, task)| !task.is_finished())
    }

    fn current_session(&self) -> Option<SessionInfo> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_session_id(&self) -> ChatResult<String> {
        self.current_session()
            .map(|session| session.session_id)
            .ok_or(ChatError::NoSession)
    }

    /// Turn a non-success response into `ChatError::Gateway`
    async fn check_status(response: Response) -> ChatResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        tracing::error!("[Workmind] Gateway error: {} - {}", status, body);

        Err(ChatError::Gateway {
            status: status.as_u16(),
            body,
        })
    }
}

impl Drop for WorkmindClient {
    fn drop(&mut self) {
        if let Some((_, task)) = self
            .stream
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .task
            .take()
        {
            task.abort();
        }
    }
}

/// Map a decoded SSE event onto a gateway event
fn into_gateway_event(event: SseEvent) -> Option<GatewayEvent> {
    match event.event.as_str() {
        "ui" => match serde_json::from_str(&event.data) {
            Ok(value) => Some(GatewayEvent::Ui(value)),
            Err(e) => {
                tracing::warn!("[Workmind] Dropping unparseable ui event: {}", e);
                None
            }
        },
        "error" => Some(GatewayEvent::Error(event.data)),
        other => {
            tracing::debug!("[Workmind] Ignoring '{}' event", other);
            None
        }
    }
}

/// Read the event stream body until it ends, forwarding events
///
/// Runs until the body ends or the task is aborted by `stop_event_stream`.
/// Reaching the end on its own means the stream died, which is reported as
/// an error event.
async fn pump_events(response: Response, events: EventSender) {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(|e| std::io::Error::other(e.to_string())));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    let mut stream = Box::pin(sse_events(reader));

    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => {
                tracing::debug!("[Workmind] Event '{}': {}", event.event, event.data);
                if let Some(event) = into_gateway_event(event) {
                    // no subscribers is not an error for the reader
                    let _ = events.send(event);
                }
            }
            Err(e) => {
                tracing::error!("[Workmind] Event stream failed: {}", e);
                let _ = events.send(GatewayEvent::Error(e.to_string()));
                return;
            }
        }
    }

    tracing::warn!("[Workmind] Event stream closed by gateway");
    let _ = events.send(GatewayEvent::Error(
        ChatError::event_stream("closed by gateway").to_string(),
    ));
}

#[async_trait::async_trait]
impl GatewayClient for WorkmindClient {
    async fn handshake(&self) -> ChatResult<SessionInfo> {
        tracing::info!("[Workmind] Handshake for agent {}", self.config.agent_id);

        let response = self
            .http
            .post(self.config.endpoint("/handshake"))
            .json(&HandshakeRequest {
                agent_id: &self.config.agent_id,
            })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body: HandshakeResponse = response.json().await?;

        let session = SessionInfo {
            session_id: body.session_id,
            agent_id: body.agent_id.unwrap_or_else(|| self.config.agent_id.clone()),
        };
        tracing::info!("[Workmind] Session established: {}", session.session_id);

        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(session)
    }

    async fn send_message(&self, message_type: &str, payload: MessagePayload) -> ChatResult<()> {
        let session_id = self.require_session_id()?;
        tracing::debug!("[Workmind] Sending {} ({} chars)", message_type, payload.text.len());

        let response = self
            .http
            .post(self.config.session_endpoint(&session_id, "messages")?)
            .json(&OutgoingMessage {
                message_type,
                payload: &payload,
            })
            .send()
            .await?;
        Self::check_status(response).await?;

        tracing::debug!("[Workmind] Message acknowledged");
        Ok(())
    }

    async fn start_event_stream(&self) -> ChatResult<()> {
        let session_id = self.require_session_id()?;
        let generation = {
            let slot = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.running_for(&session_id) {
                tracing::debug!("[Workmind] Event stream already running");
                return Ok(());
            }
            slot.generation
        };

        let response = self
            .http
            .get(self.config.session_endpoint(&session_id, "events")?)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let mut slot = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            tracing::info!("[Workmind] Event stream stopped while opening; discarding it");
            return Ok(());
        }
        if slot.running_for(&session_id) {
            // a concurrent start won the race; drop this response
            return Ok(());
        }
        if let Some((previous, task)) = slot.task.take() {
            tracing::info!("[Workmind] Replacing event stream of session {}", previous);
            task.abort();
        }
        slot.task = Some((
            session_id,
            tokio::spawn(pump_events(response, self.events.clone())),
        ));

        tracing::info!("[Workmind] Event stream started");
        Ok(())
    }

    fn stop_event_stream(&self) {
        let task = {
            let mut slot = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.task.take()
        };
        if let Some((_, task)) = task {
            task.abort();
            tracing::info!("[Workmind] Event stream stopped");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    fn session_id(&self) -> Option<String> {
        self.current_session().map(|session| session.session_id)
    }

    fn agent_id(&self) -> Option<String> {
        self.current_session().map(|session| session.agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn connected_client(server: &MockServer) -> WorkmindClient {
        Mock::given(method("POST"))
            .and(path("/handshake"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"sessionId": "abc123"})),
            )
            .mount(server)
            .await;

        let client = WorkmindClient::new(GatewayConfig::new(server.uri(), "agents/adder.json"))
            .unwrap();
        client.handshake().await.unwrap();
        client
    }

    async fn recv_event(rx: &mut broadcast::Receiver<GatewayEvent>) -> GatewayEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = WorkmindClient::new(GatewayConfig::new("", "agents/adder.json"));
        assert!(matches!(result, Err(ChatError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_handshake_populates_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/handshake"))
            .and(body_json(json!({"agentId": "agents/adder.json"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"sessionId": "abc123", "agentId": "agents/adder.json"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkmindClient::new(GatewayConfig::new(server.uri(), "agents/adder.json"))
            .unwrap();
        assert_eq!(client.session_id(), None);

        let session = client.handshake().await.unwrap();
        assert_eq!(session, SessionInfo::new("abc123", "agents/adder.json"));
        assert_eq!(client.session_id().as_deref(), Some("abc123"));
        assert_eq!(client.agent_id().as_deref(), Some("agents/adder.json"));
    }

    #[tokio::test]
    async fn test_handshake_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/handshake"))
            .respond_with(ResponseTemplate::new(500).set_body_string("agent unavailable"))
            .mount(&server)
            .await;

        let client = WorkmindClient::new(GatewayConfig::new(server.uri(), "agents/adder.json"))
            .unwrap();
        let err = client.handshake().await.unwrap_err();

        match err {
            ChatError::Gateway { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "agent unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.session_id(), None);
    }

    #[tokio::test]
    async fn test_send_message_requires_session() {
        let server = MockServer::start().await;
        let client = WorkmindClient::new(GatewayConfig::new(server.uri(), "agents/adder.json"))
            .unwrap();

        let err = client
            .send_message("user_message", MessagePayload::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NoSession));
        assert!(matches!(
            client.start_event_stream().await,
            Err(ChatError::NoSession)
        ));
    }

    #[tokio::test]
    async fn test_send_message_posts_typed_payload() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/sessions/abc123/messages"))
            .and(body_json(json!({"type": "user_message", "payload": {"text": "hello"}})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        client
            .send_message("user_message", MessagePayload::text("hello"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_rejected() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/sessions/abc123/messages"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
            .mount(&server)
            .await;

        let err = client
            .send_message("user_message", MessagePayload::text("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Gateway { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_event_stream_forwards_events_then_reports_close() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        let body = concat!(
            ": keep-alive\n\n",
            "event: ui\n",
            "data: {\"payload\":{\"message\":\"4\"}}\n\n",
            "event: ui\n",
            "data: not json\n\n",
            "event: progress\n",
            "data: {}\n\n",
            "event: error\n",
            "data: worker crashed\n\n",
        );
        Mock::given(method("GET"))
            .and(path("/sessions/abc123/events"))
            .and(header("accept", "text/event-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let mut rx = client.subscribe();
        client.start_event_stream().await.unwrap();

        let first = recv_event(&mut rx).await;
        assert_eq!(first.ui_text(), Some("4"));
        assert_eq!(
            recv_event(&mut rx).await,
            GatewayEvent::Error("worker crashed".into())
        );
        assert!(matches!(recv_event(&mut rx).await, GatewayEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_event_stream_rejected() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/sessions/abc123/events"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client.start_event_stream().await.unwrap_err();
        assert!(matches!(err, ChatError::Gateway { status: 401, .. }));
        assert!(!client.is_streaming());
    }

    #[tokio::test]
    async fn test_stop_while_opening_discards_stream() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/sessions/abc123/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        "event: ui\ndata: {\"payload\":{\"message\":\"stale\"}}\n\n",
                        "text/event-stream",
                    )
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let mut rx = client.subscribe();
        let (started, ()) = tokio::join!(client.start_event_stream(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.stop_event_stream();
        });

        started.unwrap();
        assert!(!client.is_streaming());
        assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        client.stop_event_stream();
        client.stop_event_stream();
        assert!(!client.is_streaming());
    }
}
