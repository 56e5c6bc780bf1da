use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;
use log::debug;

use super::SessionStore;

pub type SessionHandle = Arc<Mutex<SessionStore>>;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Live sessions keyed by the id carried in the browser cookie. A session
/// that has not been opened for longer than the idle timeout is discarded.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns the session for `id`, or opens a new one under a fresh id when
    /// `id` is absent, unknown or expired. The returned flag is true for a new
    /// session. Expired sessions are pruned on every call.
    pub async fn open(&self, id: Option<&str>) -> (String, SessionHandle, bool) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        if sessions.len() < before {
            debug!("Discarded {} idle session(s)", before - sessions.len());
        }

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen = now;
                return (id.to_string(), Arc::clone(&entry.handle), false);
            }
        }

        let id = Uuid::new_v4().to_string();
        let handle: SessionHandle = Arc::new(Mutex::new(SessionStore::new()));
        sessions.insert(id.clone(), SessionEntry { handle: Arc::clone(&handle), last_seen: now });
        debug!("Opened session {}", id);
        (id, handle, true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
