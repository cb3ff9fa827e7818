//! Session persistence between turns.
//!
//! `FileSessionStore` keeps one JSON file per conversation under the session
//! directory (`session-{id}.json`); `MemorySessionStore` keeps them in a map
//! for tests and single-process use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::Result;
use crate::models::Session;

const SESSION_FILE_PREFIX: &str = "session-";

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a conversation's session. None if it was never saved.
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>>;
    async fn save(&self, session: &Session) -> Result<()>;
    /// Forget a conversation. Returns whether anything was removed.
    async fn clear(&self, conversation_id: &str) -> Result<bool>;
}

// ============================================================================
// FileSessionStore
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the session file path for a conversation ID.
    ///
    /// ASCII letters, digits and `-` are kept; every other byte becomes
    /// `_xx` (lowercase hex). The mapping is injective, so distinct IDs never
    /// share a file.
    pub fn session_path(&self, conversation_id: &str) -> PathBuf {
        let mut name = String::with_capacity(SESSION_FILE_PREFIX.len() + conversation_id.len() + 5);
        name.push_str(SESSION_FILE_PREFIX);
        for byte in conversation_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{:02x}", byte));
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>> {
        let path = self.session_path(conversation_id);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Session>(&content) {
            Ok(session) if session.conversation_id == conversation_id => Ok(Some(session)),
            Ok(session) => {
                // File copied or edited by hand
                warn!(
                    expected = conversation_id,
                    found = %session.conversation_id,
                    "session file belongs to another conversation, starting fresh"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable session file, starting fresh");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.session_path(&session.conversation_id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(session)?;

        // Write-then-rename so readers never see a half-written file
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn clear(&self, conversation_id: &str) -> Result<bool> {
        let path = self.session_path(conversation_id);
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

// ============================================================================
// MemorySessionStore
// ============================================================================

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(conversation_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.conversation_id.clone(), session.clone());
        Ok(())
    }

    async fn clear(&self, conversation_id: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(conversation_id).is_some())
    }
}
