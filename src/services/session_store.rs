use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::domain::Session;

/// Keyed storage for live sessions. Mutation is always whole-record
/// replacement so no caller can observe a half-updated session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: &str) -> Option<Session>;
    fn set(&self, user_id: &str, session: Session);
    fn clear(&self, user_id: &str);
}

/// In-memory store; sessions are lost on restart, which is acceptable for
/// this design.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user_id: &str) -> Option<Session> {
        self.lock().get(user_id).cloned()
    }

    fn set(&self, user_id: &str, session: Session) {
        self.lock().insert(user_id.to_string(), session);
    }

    fn clear(&self, user_id: &str) {
        self.lock().remove(user_id);
    }
}
