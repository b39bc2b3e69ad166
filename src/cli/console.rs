use chrono::Local;
use colored::*;
use std::io::{self, Write};

use crate::core::{ConnectionStatus, Controls};
use crate::transcript::{AvatarSlot, Lane, Message};

const AGENT_AVATAR: &str = "(.ˍ.)";
const USER_AVATAR: &str = "(you)";

/// Console handles all terminal output with colored formatting
pub struct Console {
    user_color: Color,
    agent_color: Color,
    status_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            user_color: Color::Cyan,
            agent_color: Color::Green,
            status_color: Color::BrightBlack,
        }
    }

    /// Format one transcript entry
    ///
    /// Agent messages sit on the left and user messages are labelled on the
    /// right; only the first message of a run shows its avatar, later ones
    /// are indented by the avatar width. Status messages are dimmed and
    /// centered between separators. Every entry ends with its local `HH:MM`.
    pub fn format_message(&self, message: &Message, slot: AvatarSlot) -> String {
        let line = match message.kind.lane() {
            Lane::Left => {
                let avatar = avatar_column(AGENT_AVATAR, slot);
                let indent = " ".repeat(AGENT_AVATAR.chars().count() + 1);
                let body = indent_continuation(&message.text, &indent);
                format!(
                    "{} {}",
                    avatar.color(self.agent_color).bold(),
                    body.color(self.agent_color)
                )
            }
            Lane::Right => {
                let avatar = avatar_column(USER_AVATAR, slot);
                let indent = " ".repeat(AGENT_AVATAR.chars().count() + 1);
                let body = indent_continuation(&message.text, &indent);
                format!(
                    "{} {} {}",
                    " ".repeat(AGENT_AVATAR.chars().count()),
                    body,
                    avatar.color(self.user_color).bold()
                )
            }
            Lane::Center => format!("  ·· {} ··", message.text)
                .color(self.status_color)
                .to_string(),
        };
        format!("{} {}", line, time_label(message).dimmed())
    }

    /// Print one transcript entry
    pub fn print_message(&self, message: &Message, slot: AvatarSlot) {
        println!("{}", self.format_message(message, slot));
    }

    /// Print a local notice (command feedback, not part of the transcript)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print the input prompt
    ///
    /// A prompt of `…` means the composer holds an unfinished multi-line draft.
    pub fn print_prompt(&self, continuing: bool) -> io::Result<()> {
        let marker = if continuing { "…" } else { ">" };
        print!("{} ", marker.color(self.user_color).bold());
        io::stdout().flush()
    }

    /// Print a welcome banner with the identifier fields
    pub fn print_banner(&self, session_id: Option<&str>, agent_id: &str) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  Workmind Test Environment".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!(
            "{}",
            "This is a testing tool for Workmind agents and is not intended for production use."
                .red()
        );
        println!();
        println!("  Session ID: {}", session_id.unwrap_or("-"));
        println!("  Agent ID:   {}", agent_id);
        println!();
        self.print_help();
    }

    /// Print available commands
    pub fn print_help(&self) {
        println!("Commands: /connect  /disconnect  /status  /help  /quit");
        println!("Type a message and press Enter to send. End a line with '\\' to continue on the next line.");
        println!("Start a message with '//' to send text beginning with '/'.");
        println!();
    }

    /// Print the connection status and enabled controls
    pub fn print_status(&self, status: ConnectionStatus, controls: Controls) {
        let status_text = match status {
            ConnectionStatus::Connected => status.to_string().green(),
            ConnectionStatus::Connecting => status.to_string().yellow(),
            ConnectionStatus::Degraded => status.to_string().red(),
            ConnectionStatus::Idle => status.to_string().bright_black(),
        };
        println!(
            "{} {}  [connect: {}, disconnect: {}, send: {}]",
            "Status:".bold(),
            status_text,
            on_off(controls.connect_enabled),
            on_off(controls.disconnect_enabled),
            on_off(controls.composer_enabled)
        );
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn time_label(message: &Message) -> String {
    message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string()
}

fn avatar_column(avatar: &str, slot: AvatarSlot) -> String {
    match slot {
        AvatarSlot::Avatar => avatar.to_string(),
        AvatarSlot::Placeholder | AvatarSlot::None => " ".repeat(avatar.chars().count()),
    }
}

fn indent_continuation(text: &str, indent: &str) -> String {
    text.replace('\n', &format!("\n{}", indent))
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
