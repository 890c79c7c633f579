//! Command handlers for the CLI application.
//!
//! - `daemon`: run the LED service in the foreground
//! - `client`: one-shot requests to a running daemon, plus the demo walk

pub mod client;
pub mod daemon;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;
