//! Session Management
//!
//! Per-identity conversation history behind the [`SessionStore`] interface,
//! plus [`SessionLocks`], which serialises exchanges for one identity.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};

/// End-user identity owning one conversation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh identity for anonymous callers
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Owning identity
    pub id: SessionId,

    /// Conversation history
    pub conversation: Conversation,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session for an identity
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }
}

/// Conversation state store
///
/// The reasoning loop reads a snapshot with `get`, works on it, and commits
/// what it produced with a single `append`.
pub trait SessionStore: Send + Sync {
    /// Snapshot of the identity's history; empty for unknown identities
    fn get(&self, id: &SessionId) -> Result<Vec<Message>>;

    /// Append messages to the identity's history, preserving their order
    fn append(&self, id: &SessionId, messages: Vec<Message>) -> Result<()>;

    /// Clear the identity's history
    fn reset(&self, id: &SessionId) -> Result<()>;
}

/// In-memory session store (process lifetime)
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of a whole session, if it exists
    pub fn session(&self, id: &SessionId) -> Result<Option<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(id).cloned())
    }

    /// Number of known identities
    pub fn len(&self) -> Result<usize> {
        Ok(self.sessions.read().map_err(poisoned)?.len())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> AgentError {
    AgentError::Session("session store lock poisoned".into())
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &SessionId) -> Result<Vec<Message>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions
            .get(id)
            .map(|s| s.conversation.messages().to_vec())
            .unwrap_or_default())
    }

    fn append(&self, id: &SessionId, messages: Vec<Message>) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id.clone()));
        session.conversation.extend(messages);
        session.touch();
        Ok(())
    }

    fn reset(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        if let Some(session) = sessions.get_mut(id) {
            session.conversation.clear();
            session.touch();
        }
        Ok(())
    }
}

/// One async lock per identity
///
/// Holding the guard grants exclusive use of the identity's history. Call
/// [`SessionLocks::release`] once the guard is dropped so idle identities do
/// not accumulate.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to an identity
    pub async fn acquire(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop entries nobody holds or waits on
    ///
    /// Every guard and waiter keeps a clone of its identity's lock, so an
    /// entry referenced only by the map is idle.
    pub async fn release(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked identities
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
