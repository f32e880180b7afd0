//! Per-viewer session state.
//!
//! Each session owns its own slide cursor. Sessions are created and torn
//! down explicitly by the client; nothing is shared between them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use borderhub_core::error::{HubError, Result};
use borderhub_core::{Slide, SlideNavigator, SlidePosition};

pub struct Session {
    pub navigator: SlideNavigator,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub slide: SlidePosition,
}

/// Thread-safe registry of live sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with its cursor on the first slide.
    pub fn create(&self, deck: Arc<[Slide]>) -> Result<SessionInfo> {
        let navigator = SlideNavigator::new(deck)?;
        let id = Uuid::new_v4();
        let session = Session {
            navigator,
            created_at: Utc::now(),
        };
        let info = SessionInfo {
            id: id.to_string(),
            created_at: session.created_at,
            slide: session.navigator.position(),
        };
        self.lock().insert(id, session);
        info!(session = %id, "session started");
        Ok(info)
    }

    /// Drop a session. Returns false when it did not exist.
    pub fn remove(&self, id: &str) -> bool {
        let Ok(id) = Uuid::parse_str(id) else {
            return false;
        };
        let removed = self.lock().remove(&id).is_some();
        if removed {
            info!(session = %id, "session ended");
        }
        removed
    }

    /// Run `f` against one session's state.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let uuid = Uuid::parse_str(id).map_err(|_| HubError::SessionNotFound(id.to_string()))?;
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(&uuid)
            .ok_or_else(|| HubError::SessionNotFound(id.to_string()))?;
        Ok(f(session))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use borderhub_core::slides::default_deck;

    #[test]
    fn sessions_have_independent_cursors() {
        let registry = SessionRegistry::new();
        let deck: Arc<[Slide]> = default_deck().into();
        let a = registry.create(deck.clone()).unwrap();
        let b = registry.create(deck).unwrap();

        registry.with_session(&a.id, |s| s.navigator.advance()).unwrap();
        registry.with_session(&a.id, |s| s.navigator.advance()).unwrap();

        assert_eq!(registry.with_session(&a.id, |s| s.navigator.index()).unwrap(), 2);
        assert_eq!(registry.with_session(&b.id, |s| s.navigator.index()).unwrap(), 0);
    }

    #[test]
    fn removed_session_is_gone() {
        let registry = SessionRegistry::new();
        let a = registry.create(default_deck().into()).unwrap();
        assert!(registry.remove(&a.id));
        assert!(!registry.remove(&a.id));
        assert!(matches!(
            registry.with_session(&a.id, |_| ()),
            Err(HubError::SessionNotFound(_))
        ));
        assert!(registry.is_empty());
    }
}
