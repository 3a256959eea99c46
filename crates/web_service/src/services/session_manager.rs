use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use log::info;
use tokio::sync::RwLock;
use uuid::Uuid;

use copilot_bridge::CopilotBridge;
use todo_core::TodoStore;

use crate::error::AppError;

/// One todo list plus the bridge that exposes it to the assistant.
pub struct TodoSession {
    pub id: Uuid,
    pub store: Arc<RwLock<TodoStore>>,
    pub bridge: CopilotBridge,
    pub created_at: DateTime<Utc>,
}

impl TodoSession {
    fn new(id: Uuid, instructions: &str) -> Result<Self, AppError> {
        let store = Arc::new(RwLock::new(TodoStore::new()));
        let bridge = CopilotBridge::new(Arc::clone(&store), instructions)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to build bridge: {e}")))?;
        Ok(TodoSession {
            id,
            store,
            bridge,
            created_at: Utc::now(),
        })
    }
}

/// Sessions keyed by id. Each session owns its list for as long as the
/// session lives; deleting the session destroys the list.
///
/// Requests that carry no session id land on the default session, which is
/// recreated empty on first use after deletion.
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<TodoSession>>,
    default_session_id: Uuid,
    instructions: String,
}

impl SessionManager {
    pub fn new(instructions: impl Into<String>) -> Result<Self, AppError> {
        let manager = SessionManager {
            sessions: DashMap::new(),
            default_session_id: Uuid::new_v4(),
            instructions: instructions.into(),
        };
        manager.ensure_default()?;
        Ok(manager)
    }

    pub fn default_session_id(&self) -> Uuid {
        self.default_session_id
    }

    pub fn create_session(&self) -> Result<Arc<TodoSession>, AppError> {
        let id = Uuid::new_v4();
        let session = Arc::new(TodoSession::new(id, &self.instructions)?);
        self.sessions.insert(id, Arc::clone(&session));
        info!("Created session {}", id);
        Ok(session)
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<TodoSession>> {
        self.sessions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Session addressed by the request; `None` means the default session.
    pub fn resolve(&self, id: Option<Uuid>) -> Result<Arc<TodoSession>, AppError> {
        match id {
            Some(id) => self
                .get(id)
                .ok_or_else(|| AppError::SessionNotFound(id.to_string())),
            None => self.ensure_default(),
        }
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            info!("Removed session {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn ensure_default(&self) -> Result<Arc<TodoSession>, AppError> {
        match self.sessions.entry(self.default_session_id) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let session = Arc::new(TodoSession::new(
                    self.default_session_id,
                    &self.instructions,
                )?);
                entry.insert(Arc::clone(&session));
                info!("Created default session {}", self.default_session_id);
                Ok(session)
            }
        }
    }
}
