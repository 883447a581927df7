//! Data models for palaver.

mod message;
mod session;

pub use message::{ChatMessage, MessageBody, Reply};
pub use session::{Session, DEFAULT_TITLE, TITLE_MAX_CHARS};
