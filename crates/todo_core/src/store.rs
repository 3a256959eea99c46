//! Ordered, in-memory todo list with reconciliation by id.

use log::debug;
use uuid::Uuid;

use crate::item::TodoItem;

/// The todo list owned by one session.
///
/// Insertion order is display order and `id` is the reconciliation key.
/// Mutations that target an id not present in the list are silent no-ops:
/// they return `false` but never fail.
#[derive(Debug, Default, Clone)]
pub struct TodoStore {
    items: Vec<TodoItem>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a new item with a generated id and returns it.
    /// Whitespace-only input is dropped and `None` is returned.
    pub fn add(&mut self, text: &str) -> Option<TodoItem> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("add: ignoring empty todo text");
            return None;
        }
        let item = TodoItem::new(Uuid::new_v4().to_string(), trimmed);
        self.items.push(item.clone());
        Some(item)
    }

    /// Flips the completion flag. Returns whether an item matched.
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.is_completed = !item.is_completed;
                true
            }
            None => {
                debug!("toggle_complete: no todo with id '{}'", id);
                false
            }
        }
    }

    /// Removes the item, keeping the order of the rest. Returns whether an
    /// item matched.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if !removed {
            debug!("delete: no todo with id '{}'", id);
        }
        removed
    }

    /// Sets or clears the assignee. `None` and `""` both clear the field so
    /// an unassigned item stays absent on the wire. Returns whether an item
    /// matched.
    pub fn assign(&mut self, id: &str, person: Option<&str>) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.assigned_to = match person {
                    Some(p) if !p.is_empty() => Some(p.to_string()),
                    _ => None,
                };
                true
            }
            None => {
                debug!("assign: no todo with id '{}'", id);
                false
            }
        }
    }

    /// Reconciles a batch of incoming items in order: an item whose id is
    /// already present replaces that entry wholesale, anything else is
    /// appended. Lookups run against the live list, so an id introduced
    /// earlier in the same batch is replaced in place rather than appended
    /// twice. The list never holds two items with the same id.
    pub fn bulk_upsert(&mut self, incoming: Vec<TodoItem>) {
        for item in incoming {
            match self.items.iter().position(|existing| existing.id == item.id) {
                Some(index) => self.items[index] = item,
                None => self.items.push(item),
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
