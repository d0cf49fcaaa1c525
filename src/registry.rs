//! Process-wide keyed store of active sessions.
//!
//! An owned, thread-safe instance the embedding layer constructs once at
//! startup and passes wherever it is needed — deliberately not a global.
//! Lifecycle is process lifetime; there is no expiry or eviction policy
//! (abandoned sessions accumulate until [`SessionRegistry::remove`]), so an
//! owner that cares should sweep on [`crate::session::Session::created_at`].
//!
//! Each session sits behind its own `tokio::sync::Mutex`: the registry map
//! itself is lock-free for unrelated keys, while the per-session mutex
//! serializes advances on one interview — a slow question-generation call
//! for one session never blocks lookups or other sessions.

use crate::error::Form2ChatError;
use crate::fields::FieldDescriptor;
use crate::session::{Session, SourcePayload};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Shared handle to one registered session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Keyed store of active sessions, addressed by their opaque identifier.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new session, returning its identifier and
    /// handle. The identifier is a v4 UUID — effectively unique and
    /// unguessable, since it is the sole token authorizing later access.
    pub fn create(
        &self,
        fields: Vec<FieldDescriptor>,
        payload: SourcePayload,
        context: String,
    ) -> (String, SessionHandle) {
        let session = Session::new(fields, payload, context);
        let id = session.id().to_string();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id.clone(), Arc::clone(&handle));
        info!("created session {id}");
        (id, handle)
    }

    /// Look up a session by identifier.
    pub fn get(&self, id: &str) -> Result<SessionHandle, Form2ChatError> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Form2ChatError::SessionNotFound { id: id.to_string() })
    }

    /// Drop a session. Returns `false` when the identifier was unknown
    /// (already deleted, or never existed).
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            debug!("removed session {id}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::new("a", FieldType::Text)]
    }

    #[test]
    fn create_then_get_returns_the_same_session() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create(
            fields(),
            SourcePayload::Website("<form/>".into()),
            String::new(),
        );
        assert!(registry.get(&id).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_id_is_a_not_found_error() {
        let registry = SessionRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(Form2ChatError::SessionNotFound { .. })
        ));
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create(
            fields(),
            SourcePayload::Website("<form/>".into()),
            String::new(),
        );
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
        assert!(registry.get(&id).is_err());
    }
}
