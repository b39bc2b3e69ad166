//! Terminal front-end
//!
//! `ConsoleRenderer` drives a `ChatController` from stdin and prints the
//! transcript with `Console`.

mod console;
mod renderer;

pub use console::Console;
pub use renderer::{parse_input, ConsoleCommand, ConsoleRenderer};
