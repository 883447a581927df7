//! OpenRouter-compatible completion endpoint integration.

mod client;
mod parse;

pub use client::{ApiError, Client, ClientConfig, CompletionBackend};
pub use parse::parse_reply;
