//! Session collection ownership and persistence.
//!
//! The store is the single owner of the session list and the
//! current-session pointer. All mutation funnels through its operations,
//! and every mutation writes the whole collection back to disk before the
//! call returns, so the persisted blob always matches memory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Session};

/// File name of the persisted session blob.
const STORAGE_FILE: &str = "sessions.json";

/// On-disk shape of the store.
#[derive(Debug, Default, Deserialize)]
struct StoredState {
    sessions: Vec<Session>,
    current_id: Option<String>,
}

/// Borrowing mirror of [`StoredState`] for serialization.
#[derive(Serialize)]
struct StoredStateRef<'a> {
    sessions: &'a [Session],
    current_id: Option<&'a str>,
}

/// Owns all sessions and the current-session pointer.
pub struct SessionStore {
    /// Sessions, most recent first.
    sessions: Vec<Session>,
    current_id: Option<String>,
    path: PathBuf,
}

impl SessionStore {
    /// Open the store at the default per-user data directory.
    pub fn open() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("Could not find a data directory")?
            .join("palaver");
        Self::open_at(&dir)
    }

    /// Open the store with its blob under the given directory.
    pub fn open_at(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(STORAGE_FILE);
        let state = Self::load(&path);
        let mut store = Self {
            sessions: state.sessions,
            current_id: state.current_id,
            path,
        };
        // A pointer to a session that no longer exists falls back to the
        // most recent one.
        if let Some(ref id) = store.current_id {
            if !store.contains(id) {
                store.current_id = None;
            }
        }
        if store.current_id.is_none() {
            store.current_id = store.sessions.first().map(|s| s.id.clone());
        }
        Ok(store)
    }

    /// Read the persisted blob, degrading to an empty collection when it
    /// is missing or corrupt.
    fn load(path: &Path) -> StoredState {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredState::default(),
            Err(e) => {
                log::warn!("Failed to read {}: {e}; starting empty", path.display());
                return StoredState::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                log::warn!(
                    "Corrupt session store at {}: {e}; starting empty",
                    path.display()
                );
                StoredState::default()
            }
        }
    }

    /// Write the collection back to disk. Save failures are logged, never
    /// surfaced to the caller.
    fn save(&self) {
        let state = StoredStateRef {
            sessions: &self.sessions,
            current_id: self.current_id.as_deref(),
        };
        let json = match serde_json::to_string_pretty(&state) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize sessions: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            log::warn!("Failed to save sessions to {}: {e}", self.path.display());
        }
    }

    /// Create a new empty session at the front of the collection, make it
    /// current, and return its id.
    pub fn create_session(&mut self) -> String {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.current_id = Some(id.clone());
        self.save();
        id
    }

    /// Replace a session's message list, re-deriving its title and
    /// refreshing its update timestamp. No-op for an unknown id.
    pub fn update_session(&mut self, id: &str, messages: Vec<ChatMessage>) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return;
        };
        session.title = Session::derive_title(&messages);
        session.messages = messages;
        session.updated_at = Utc::now();
        self.save();
    }

    /// Remove a session.
    ///
    /// When the removed session was current, the pointer falls to the
    /// next remaining session in collection order, or a fresh session is
    /// created when the collection empties. The store never ends up with
    /// zero sessions and no valid pointer, or with a dangling pointer.
    pub fn delete_session(&mut self, id: &str) {
        self.sessions.retain(|s| s.id != id);
        if self.current_id.as_deref() == Some(id) {
            match self.sessions.first() {
                Some(next) => self.current_id = Some(next.id.clone()),
                None => {
                    // create_session persists on its own.
                    self.create_session();
                    return;
                }
            }
        }
        self.save();
    }

    /// The current session, if one is selected.
    pub fn current_session(&self) -> Option<&Session> {
        self.current_id
            .as_ref()
            .and_then(|id| self.sessions.iter().find(|s| s.id == *id))
    }

    /// Set the current pointer unconditionally. Callers are expected to
    /// pass known ids.
    pub fn switch_session(&mut self, id: &str) {
        self.current_id = Some(id.to_string());
        self.save();
    }

    /// Id of the current session, if any.
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// All sessions, most recent first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    fn contains(&self, id: &str) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }
}
