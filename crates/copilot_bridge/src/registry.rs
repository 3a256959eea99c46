use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

use openai_adapter::models::ToolSchema;

use crate::action::{Action, SharedAction};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("action with name '{0}' already registered")]
    DuplicateAction(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),
}

/// Actions available to the assistant, keyed by the name the model calls
/// them with. One registry belongs to one bridge; there is no process-wide
/// registry.
pub struct ActionRegistry {
    actions: DashMap<String, SharedAction>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
        }
    }

    pub fn register<A>(&self, action: A) -> Result<(), RegistryError>
    where
        A: Action + 'static,
    {
        self.register_shared(std::sync::Arc::new(action))
    }

    pub fn register_shared(&self, action: SharedAction) -> Result<(), RegistryError> {
        let name = action.name().trim();

        if name.is_empty() {
            return Err(RegistryError::InvalidAction(
                "action name cannot be empty".to_string(),
            ));
        }

        match self.actions.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateAction(name.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(action);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedAction> {
        self.actions
            .get(name)
            .map(|entry| std::sync::Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Schemas of every registered action, sorted by name for a stable
    /// tool list on the wire.
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .actions
            .iter()
            .map(|entry| entry.value().to_schema())
            .collect();
        schemas.sort_by(|left, right| left.function.name.cmp(&right.function.name));
        schemas
    }

    pub fn list_action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
