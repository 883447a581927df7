//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Palaver - chat with an OpenRouter-compatible model from the terminal
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model to use (e.g. openrouter/auto)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory holding the persisted session blob
    #[arg(long, hide = true)]
    pub data_dir: Option<PathBuf>,

    /// Message to send to the current session
    #[arg(trailing_var_arg = true)]
    pub message: Vec<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new chat session
    New {
        /// Optional first message to send
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// List sessions, most recent first
    List,

    /// Switch to another session
    Switch {
        /// Session ID (or unique prefix)
        id: String,
    },

    /// Delete a session
    Delete {
        /// Session ID (or unique prefix)
        id: String,
    },

    /// Print the current session transcript
    Show,

    /// Clear the current session's messages
    Clear,
}
