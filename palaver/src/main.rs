//! Palaver - chat with an OpenRouter-compatible model from the terminal.
//!
//! Conversations are kept as named sessions, persisted locally as a
//! single JSON blob and restored on startup.
//!
//! Architecture:
//! - The session store exclusively owns the session collection and the
//!   current-session pointer; every mutation is written straight back to
//!   disk
//! - The chat controller orchestrates one exchange at a time: append the
//!   user turn, call the endpoint, append the parsed reply or an inline
//!   error
//! - The reply parser normalizes whatever the model emits (structured
//!   JSON, error envelopes, plain prose) into one reply shape

mod chat;
mod cli;
mod models;
mod openrouter;
mod store;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    execute(cli).await
}
