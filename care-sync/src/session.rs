use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::models::User;

/// The authenticated identity held by the client for the duration of a
/// login. Token and user travel together: a store never exposes one
/// without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Where the current session lives.
///
/// The application is either fully authenticated (`current()` returns a
/// session) or fully anonymous; no partial state is observable. Token
/// validity is never checked locally: the first authenticated request the
/// backend rejects clears the store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load whatever was persisted by a previous run. Missing, unreadable
    /// or unparseable state restores as `None`; this never fails.
    async fn restore(&self) -> Option<Session>;

    /// The session as of this instant. Callers read this immediately
    /// before each request rather than caching it.
    async fn current(&self) -> Option<Session>;

    /// Replace the session, persisting token and user as one unit.
    async fn set(&self, session: Session);

    /// Drop the session and remove any persisted state.
    async fn clear(&self);
}

/// In-memory implementation of `SessionStore`. Nothing survives the
/// process; used in tests and embedded setups.
#[derive(Default)]
pub struct InMemorySessionStore {
    current: Mutex<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn restore(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    async fn current(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    async fn set(&self, session: Session) {
        *self.current.lock().unwrap() = Some(session);
    }

    async fn clear(&self) {
        *self.current.lock().unwrap() = None;
    }
}

/// File-backed implementation of `SessionStore`: a single JSON document on
/// disk, surviving restarts the way browser local storage survives
/// reloads.
///
/// The in-memory copy is authoritative; persistence failures are logged
/// and never surface to callers.
pub struct FileSessionStore {
    path: PathBuf,
    current: Mutex<Option<Session>>,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn restore(&self) -> Option<Session> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no persisted session");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                *self.current.lock().unwrap() = Some(session.clone());
                Some(session)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                None
            }
        }
    }

    async fn current(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    async fn set(&self, session: Session) {
        *self.current.lock().unwrap() = Some(session.clone());
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = tokio::fs::write(&self.path, raw).await {
                    warn!(path = %self.path.display(), error = %e, "failed to persist session");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize session"),
        }
    }

    async fn clear(&self) {
        *self.current.lock().unwrap() = None;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "tok-123".to_string(),
            user: User {
                id: 1,
                name: "Admin".to_string(),
                email: "admin@clinic.test".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemorySessionStore::new();
        assert!(store.current().await.is_none());

        store.set(session()).await;
        assert_eq!(store.current().await, Some(session()));

        store.clear().await;
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn file_store_survives_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::new(&path);
        store.set(session()).await;

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.restore().await, Some(session()));
        assert_eq!(reopened.current().await, Some(session()));
    }

    #[tokio::test]
    async fn missing_or_corrupt_state_restores_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::new(&path);
        assert!(store.restore().await.is_none());

        tokio::fs::write(&path, "{not json").await.unwrap();
        assert!(store.restore().await.is_none());
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn clear_removes_the_persisted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::new(&path);
        store.set(session()).await;
        store.clear().await;

        assert!(store.current().await.is_none());
        assert!(!path.exists());
        // clearing twice is fine
        store.clear().await;
    }
}
