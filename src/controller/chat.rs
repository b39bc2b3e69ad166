//! ChatController - view-model for one chat session
//!
//! Owns everything the chat screen shows: connection status, the transcript,
//! session identifiers and the composer draft. User actions are synchronous
//! methods; gateway calls run as tokio tasks whose results come back through
//! [`ChatController::next_event`] and are applied by
//! [`ChatController::handle_event`]. All state changes happen on the task
//! that owns the controller.
//!
//! # Example
//!
//! ```ignore
//! let mut controller = ChatController::new(Arc::new(WorkmindClient::new(config)?));
//! controller.request_connect();
//! while let Some(event) = controller.next_event().await {
//!     controller.handle_event(event);
//!     render(controller.transcript());
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::sync::mpsc;

use crate::core::{ChatResult, ConnectionStatus, Controls};
use crate::gateway::{
    ui_message_text, GatewayClient, GatewayEvent, MessagePayload, SessionInfo, USER_MESSAGE_TYPE,
};
use crate::scroll::{ScrollManager, ViewportMetrics};
use crate::transcript::{Message, Transcript};

use super::composer::{Composer, ComposerKey};

/// Buffer size for completed gateway calls waiting to be applied
pub const COMPLETION_CHANNEL_SIZE: usize = 32;

pub const CONNECTING_TEXT: &str = "Connecting...";
pub const CONNECTED_TEXT: &str = "Connected! Please give the bot some time to respond.";
pub const HANDSHAKE_FAILED_TEXT: &str = "Handshake failed. Check console.";
pub const SESSION_TERMINATED_TEXT: &str = "Session terminated.";
pub const SEND_FAILED_TEXT: &str = "Failed to send message.";
pub const CONNECTION_ERROR_TEXT: &str = "[connection error]";

/// Something that happened outside the controller and must be applied to it
#[derive(Debug)]
pub enum ControllerEvent {
    /// The handshake started by `request_connect` finished
    HandshakeFinished(ChatResult<SessionInfo>),

    /// A message started by `submit_message` was delivered or failed
    SendFinished(ChatResult<()>),

    /// The event stream opened after a handshake started or failed
    StreamStarted(ChatResult<()>),

    /// Inbound event from the gateway
    Gateway(GatewayEvent),
}

/// View-model for the chat screen
pub struct ChatController {
    client: Arc<dyn GatewayClient>,

    status: ConnectionStatus,
    transcript: Transcript,
    session_id: Option<String>,
    agent_id: Option<String>,
    composer: Composer,
    scroll: ScrollManager,

    completions_tx: mpsc::Sender<ControllerEvent>,
    completions_rx: mpsc::Receiver<ControllerEvent>,

    /// Subscription registered once, at construction
    gateway_rx: broadcast::Receiver<GatewayEvent>,
    gateway_open: bool,
}

impl ChatController {
    /// Create a controller driving `client`
    ///
    /// Subscribes to the client's events immediately. Must be used inside a
    /// tokio runtime: gateway calls are spawned as tasks.
    pub fn new(client: Arc<dyn GatewayClient>) -> Self {
        let gateway_rx = client.subscribe();
        let session_id = client.session_id();
        let agent_id = client.agent_id();
        let (completions_tx, completions_rx) = mpsc::channel(COMPLETION_CHANNEL_SIZE);

        Self {
            client,
            status: ConnectionStatus::Idle,
            transcript: Transcript::new(),
            session_id,
            agent_id,
            composer: Composer::new(),
            scroll: ScrollManager::new(),
            completions_tx,
            completions_rx,
            gateway_rx,
            gateway_open: true,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Enabled state of the connect/disconnect buttons, fields and composer
    pub fn controls(&self) -> Controls {
        self.status.controls()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Session ID resolved by the last successful handshake
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Agent ID resolved by the last successful handshake
    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    pub fn draft(&self) -> &str {
        self.composer.text()
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Start connecting. Ignored unless idle.
    ///
    /// Returns whether a handshake was started.
    pub fn request_connect(&mut self) -> bool {
        if !self.status.can_connect() {
            tracing::debug!("Ignoring connect request while {}", self.status);
            return false;
        }

        tracing::info!("Connecting to gateway");
        self.set_status(ConnectionStatus::Connecting);
        self.append_message(Message::status(CONNECTING_TEXT));

        let client = Arc::clone(&self.client);
        self.spawn_completion(async move {
            ControllerEvent::HandshakeFinished(client.handshake().await)
        });
        true
    }

    /// Stop the event stream and return to idle. Ignored unless connected.
    ///
    /// Identifiers and the transcript are kept. Gateway events still queued
    /// for the ended session are dropped; in-flight sends are not aborted.
    pub fn disconnect(&mut self) -> bool {
        if !self.status.can_disconnect() {
            tracing::debug!("Ignoring disconnect request while {}", self.status);
            return false;
        }

        tracing::info!("Disconnecting session {:?}", self.session_id);
        self.client.stop_event_stream();
        self.drain_gateway_events();
        self.append_message(Message::status(SESSION_TERMINATED_TEXT));
        self.set_status(ConnectionStatus::Idle);
        tracing::info!("Session disconnected");
        true
    }

    /// Submit `text` as a user message. Ignored unless connected and non-empty.
    ///
    /// The transcript shows `text` as typed; the gateway receives it trimmed.
    /// The message stays in the transcript even if sending fails.
    pub fn submit_message(&mut self, text: &str) -> bool {
        if !self.status.accepts_input() {
            tracing::debug!("Ignoring submit while {}", self.status);
            return false;
        }
        if text.is_empty() {
            return false;
        }
        if text.trim().is_empty() {
            tracing::warn!("Submitting whitespace-only message ({} chars)", text.len());
        }

        tracing::debug!("Submitting message in session {:?}", self.session_id);
        self.append_message(Message::user(text));
        let payload = MessagePayload::text(text.trim());
        self.composer.clear();

        let client = Arc::clone(&self.client);
        self.spawn_completion(async move {
            ControllerEvent::SendFinished(client.send_message(USER_MESSAGE_TYPE, payload).await)
        });
        true
    }

    /// Replace the composer draft
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.composer.set_text(text);
    }

    /// Append typed text to the composer draft
    pub fn append_draft(&mut self, text: &str) {
        self.composer.push_str(text);
    }

    /// Handle a composer key. Enter submits the draft, Shift+Enter adds a newline.
    ///
    /// Returns whether a message was submitted.
    pub fn handle_key(&mut self, key: ComposerKey) -> bool {
        match key {
            ComposerKey::ShiftEnter => {
                self.composer.insert_newline();
                false
            }
            ComposerKey::Enter => {
                let text = self.composer.text().to_string();
                self.submit_message(&text)
            }
        }
    }

    // =========================================================================
    // Inbound events
    // =========================================================================

    /// Apply a `ui` event body from the gateway
    ///
    /// Bodies without a `payload.message` string are ignored, as are events
    /// arriving while no session is live.
    pub fn on_agent_event(&mut self, payload: &Value) {
        if !self.status.can_disconnect() {
            tracing::debug!("Ignoring ui event while {}", self.status);
            return;
        }
        if self.status == ConnectionStatus::Degraded {
            tracing::info!("Event stream delivering again");
            self.set_status(ConnectionStatus::Connected);
        }

        match ui_message_text(payload) {
            Some(text) if !text.is_empty() => {
                self.append_message(Message::agent(text));
            }
            _ => tracing::trace!("Ignoring ui event without message text: {}", payload),
        }
    }

    /// Apply a transport or stream failure
    pub fn on_transport_error(&mut self, error: &str) {
        tracing::error!("Event stream error: {}", error);
        self.append_message(Message::agent(CONNECTION_ERROR_TEXT));

        if self.status == ConnectionStatus::Connected {
            self.set_status(ConnectionStatus::Degraded);
        }
    }

    /// Wait for the next completed call or gateway event
    ///
    /// Completed calls are delivered before pending gateway events.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        loop {
            tokio::select! {
                biased;

                Some(event) = self.completions_rx.recv() => return Some(event),

                received = self.gateway_rx.recv(), if self.gateway_open => match received {
                    Ok(event) => return Some(ControllerEvent::Gateway(event)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Controller fell behind; {} gateway events dropped", skipped);
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!("Gateway event channel closed");
                        self.gateway_open = false;
                    }
                },

                else => return None,
            }
        }
    }

    /// Apply one event to the controller state
    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::HandshakeFinished(result) => self.on_handshake_finished(result),
            ControllerEvent::SendFinished(Ok(())) => {
                tracing::debug!("Message delivered");
            }
            ControllerEvent::SendFinished(Err(e)) => {
                tracing::error!("Failed to send message: {}", e);
                self.append_message(Message::agent(SEND_FAILED_TEXT));
            }
            ControllerEvent::StreamStarted(result) => self.on_stream_started(result),
            ControllerEvent::Gateway(GatewayEvent::Ui(payload)) => self.on_agent_event(&payload),
            ControllerEvent::Gateway(GatewayEvent::Error(error)) => self.on_transport_error(&error),
        }
    }

    /// Wait for one event and apply it. Returns `false` once no more can arrive.
    pub async fn step(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Transcript and scrolling
    // =========================================================================

    /// Append a message and apply the auto-scroll policy
    ///
    /// Returns the index of the new entry.
    pub fn append_message(&mut self, message: Message) -> usize {
        self.scroll.on_append(message.kind);
        self.transcript.push(message)
    }

    /// Report the current viewport layout
    pub fn update_layout(&mut self, metrics: ViewportMetrics) {
        self.scroll.update_layout(metrics);
    }

    /// Post-layout hook: whether to smooth-scroll the end of the transcript into view
    pub fn apply_pending_scroll(&mut self) -> bool {
        self.scroll.apply_pending_scroll()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn on_handshake_finished(&mut self, result: ChatResult<SessionInfo>) {
        if self.status != ConnectionStatus::Connecting {
            tracing::warn!("Handshake finished while {}; ignoring", self.status);
            return;
        }

        match result {
            Ok(session) => {
                tracing::info!("Session: {}", session.session_id);
                self.append_message(Message::status(CONNECTED_TEXT));
                self.append_message(Message::status(format!(
                    "Session ID: {}",
                    session.session_id
                )));
                self.session_id = Some(session.session_id);
                self.agent_id = Some(session.agent_id);
                self.set_status(ConnectionStatus::Connected);

                let client = Arc::clone(&self.client);
                self.spawn_completion(async move {
                    ControllerEvent::StreamStarted(client.start_event_stream().await)
                });
            }
            Err(e) => {
                tracing::error!("Handshake failed: {}", e);
                self.append_message(Message::agent(HANDSHAKE_FAILED_TEXT));
                self.set_status(ConnectionStatus::Idle);
            }
        }
    }

    fn on_stream_started(&mut self, result: ChatResult<()>) {
        if !self.status.can_disconnect() {
            // session ended while the stream was opening
            tracing::info!("Event stream start finished while {}; stopping it", self.status);
            if let Err(e) = result {
                tracing::debug!("Late event stream failure: {}", e);
            }
            self.client.stop_event_stream();
            return;
        }

        match result {
            Ok(()) => tracing::info!("Event stream started"),
            Err(e) => self.on_transport_error(&e.to_string()),
        }
    }

    /// Discard gateway events that are already queued
    fn drain_gateway_events(&mut self) {
        let mut dropped = 0usize;
        loop {
            match self.gateway_rx.try_recv() {
                Ok(_) => dropped += 1,
                Err(TryRecvError::Lagged(skipped)) => dropped += skipped as usize,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    self.gateway_open = false;
                    break;
                }
            }
        }
        if dropped > 0 {
            tracing::debug!("Dropped {} queued gateway events", dropped);
        }
    }

    fn set_status(&mut self, next: ConnectionStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "invalid status transition {:?} -> {:?}",
            self.status,
            next
        );
        tracing::info!("Connection status: {} -> {}", self.status, next);
        self.status = next;
    }

    /// Run a gateway call on its own task and queue its result
    fn spawn_completion<F>(&self, call: F)
    where
        F: Future<Output = ControllerEvent> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let event = call.await;
            if tx.send(event).await.is_err() {
                tracing::debug!("Controller dropped before a gateway call completed");
            }
        });
    }
}
