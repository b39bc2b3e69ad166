//! Console Renderer - drives a `ChatController` from the terminal
//!
//! The `ConsoleRenderer` is an opt-in front-end that:
//! - Reads commands and message lines from stdin
//! - Applies gateway results and events as they arrive
//! - Prints each new transcript entry once, with avatar grouping
//! - Is completely decoupled from the controller logic
//!
//! This can be replaced with other front-ends (TUI, web UI, etc.)

use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::{ChatController, ComposerKey};
use crate::scroll::ViewportMetrics;

use super::console::Console;

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect,
    Disconnect,
    Status,
    Help,
    Quit,

    /// Composer text. `continued` lines ended with `\` and act as Shift+Enter.
    Compose { text: String, continued: bool },

    /// A `/command` that is not recognised
    Unknown(String),
}

/// Parse one input line
///
/// A line starting with `//` is composer text with the first `/` removed.
pub fn parse_input(line: &str) -> ConsoleCommand {
    let trimmed = line.trim();
    let mut text = if trimmed.starts_with("//") {
        line.replacen('/', "", 1)
    } else if trimmed.starts_with('/') {
        return match trimmed.to_ascii_lowercase().as_str() {
            "/connect" => ConsoleCommand::Connect,
            "/disconnect" => ConsoleCommand::Disconnect,
            "/status" => ConsoleCommand::Status,
            "/help" => ConsoleCommand::Help,
            "/quit" | "/exit" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Unknown(trimmed.to_string()),
        };
    } else {
        line.to_string()
    };

    let continued = text.ends_with('\\');
    if continued {
        text.pop();
    }
    ConsoleCommand::Compose { text, continued }
}

/// Console renderer that owns a controller and handles terminal I/O
///
/// # Example
///
/// ```ignore
/// let controller = ChatController::new(client);
/// let mut renderer = ConsoleRenderer::new(controller, config.gateway.agent_id.clone());
/// renderer.run().await?;
/// ```
pub struct ConsoleRenderer {
    controller: ChatController,
    console: Console,

    /// Number of transcript entries already printed
    rendered: usize,

    /// Agent ID shown until a handshake resolves one
    default_agent_id: String,
}

impl ConsoleRenderer {
    pub fn new(controller: ChatController, default_agent_id: impl Into<String>) -> Self {
        Self::with_console(controller, Console::new(), default_agent_id)
    }

    /// Create a renderer with a custom console
    pub fn with_console(
        controller: ChatController,
        console: Console,
        default_agent_id: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            console,
            rendered: 0,
            default_agent_id: default_agent_id.into(),
        }
    }

    /// Run the console loop
    ///
    /// Returns when the user quits or stdin closes. An open session is
    /// disconnected first.
    pub async fn run(&mut self) -> io::Result<()> {
        self.console
            .print_banner(self.controller.session_id(), self.agent_id());
        self.print_status();
        self.console.print_prompt(false)?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut events_open = true;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Input closed");
                        break;
                    };
                    if !self.handle_command(parse_input(&line)) {
                        break;
                    }
                    self.render_new();
                    self.console.print_prompt(!self.controller.draft().is_empty())?;
                }

                event = self.controller.next_event(), if events_open => {
                    let Some(event) = event else {
                        events_open = false;
                        continue;
                    };
                    let before = self.controller.status();
                    self.controller.handle_event(event);
                    if self.render_new() || self.controller.status() != before {
                        if self.controller.status() != before {
                            self.print_status();
                        }
                        self.console.print_prompt(!self.controller.draft().is_empty())?;
                    }
                }
            }
        }

        if self.controller.controls().disconnect_enabled {
            self.controller.disconnect();
            self.render_new();
        }
        self.console.print_system("Goodbye.");
        Ok(())
    }

    /// Apply one command. Returns `false` when the loop should stop.
    pub fn handle_command(&mut self, command: ConsoleCommand) -> bool {
        let controls = self.controller.controls();

        match command {
            ConsoleCommand::Connect => {
                if controls.connect_enabled {
                    self.controller.request_connect();
                    self.print_status();
                } else {
                    self.console.print_system("Connect is unavailable right now.");
                }
            }
            ConsoleCommand::Disconnect => {
                if controls.disconnect_enabled {
                    self.controller.disconnect();
                    self.render_new();
                    self.print_status();
                } else {
                    self.console.print_system("Not connected.");
                }
            }
            ConsoleCommand::Status => self.print_status(),
            ConsoleCommand::Help => self.console.print_help(),
            ConsoleCommand::Quit => return false,
            ConsoleCommand::Compose { text, continued } => {
                if !controls.composer_enabled {
                    if !text.trim().is_empty() {
                        self.console
                            .print_system("Not connected. Type /connect to start a session.");
                    }
                    return true;
                }
                self.controller.append_draft(&text);
                let key = if continued {
                    ComposerKey::ShiftEnter
                } else {
                    ComposerKey::Enter
                };
                self.controller.handle_key(key);
            }
            ConsoleCommand::Unknown(command) => {
                self.console
                    .print_error(&format!("Unknown command: {} (try /help)", command));
            }
        }
        true
    }

    /// Print transcript entries added since the last call
    ///
    /// Returns whether anything was printed.
    fn render_new(&mut self) -> bool {
        let transcript = self.controller.transcript();
        let total = transcript.len();
        if total == self.rendered {
            return false;
        }

        // Prompt line was already printed; start entries on a fresh line.
        println!();
        for index in self.rendered..total {
            if let Some(message) = transcript.get(index) {
                self.console
                    .print_message(message, transcript.avatar_slot(index));
            }
        }
        self.rendered = total;

        // A terminal always shows its tail, so report a viewport pinned to the end.
        self.controller.update_layout(ViewportMetrics::default());
        if self.controller.apply_pending_scroll() {
            tracing::trace!("Scrolled to newest entry");
        }
        true
    }

    fn print_status(&self) {
        self.console
            .print_status(self.controller.status(), self.controller.controls());
    }

    fn agent_id(&self) -> &str {
        self.controller
            .agent_id()
            .unwrap_or(self.default_agent_id.as_str())
    }

    /// Get the underlying controller
    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Get the underlying console
    pub fn console(&self) -> &Console {
        &self.console
    }
}
