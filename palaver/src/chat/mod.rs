//! Conversation orchestration.
//!
//! One exchange: append the user's message, call the completion backend,
//! append the assistant's reply (or an error placeholder), and report the
//! in-flight state. The user's message is persisted before the network
//! call goes out, so a crash mid-flight loses at most the pending reply,
//! never the outgoing text.

use crate::models::{ChatMessage, Reply};
use crate::openrouter::CompletionBackend;
use crate::store::SessionStore;

/// Drives one conversation at a time against a completion backend.
///
/// The per-send state machine is `idle -> awaiting-response -> idle`,
/// with no cancellation path: a send cannot be aborted once started.
pub struct ChatController<B> {
    store: SessionStore,
    backend: B,
    awaiting_response: bool,
}

impl<B: CompletionBackend> ChatController<B> {
    /// Create a controller over a store and backend.
    pub const fn new(store: SessionStore, backend: B) -> Self {
        Self {
            store,
            backend,
            awaiting_response: false,
        }
    }

    /// Whether a send is currently in flight. The presentation layer is
    /// expected to disable new sends while this is true.
    pub const fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Read access to the session store.
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mutable access to the session store, for session management
    /// commands (create, switch, delete) outside a send.
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// Send one user message on the current session.
    ///
    /// A no-op when no session is selected. Never fails: every backend
    /// error is folded into a visible assistant error message.
    pub async fn send_message(&mut self, text: &str) {
        let Some(session) = self.store.current_session() else {
            return;
        };
        let session_id = session.id.clone();

        // Optimistic append, persisted before the request is issued.
        let mut messages = session.messages.clone();
        messages.push(ChatMessage::user(text));
        self.store.update_session(&session_id, messages.clone());

        self.awaiting_response = true;
        let reply = match self.backend.send_message(text).await {
            Ok(reply) => reply,
            Err(e) => Reply::Error {
                message: e.to_string(),
            },
        };
        self.awaiting_response = false;

        messages.push(ChatMessage::assistant(reply));
        self.store.update_session(&session_id, messages);
    }

    /// Clear the current session's transcript. The title reverts to the
    /// default once the list is empty.
    pub fn clear_messages(&mut self) {
        if let Some(id) = self.store.current_id().map(str::to_string) {
            self.store.update_session(&id, Vec::new());
        }
    }
}
