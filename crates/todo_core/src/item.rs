//! Todo item data model shared by the store, the assistant bridge, and the
//! HTTP surface.

use serde::{Deserialize, Serialize};

/// A single entry in the todo list.
///
/// Field names follow the JSON wire shape (`isCompleted`, `assignedTo`) so
/// items round-trip unchanged between HTTP payloads and assistant tool
/// arguments. An unassigned item omits `assignedTo` entirely; it is never
/// serialized as `null` or `""`. `id` and `isCompleted` have no defaults on
/// purpose: a tool-argument batch that drops either field fails
/// deserialization instead of silently filling it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl TodoItem {
    /// Creates a fresh, not-completed, unassigned item.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_completed: false,
            assigned_to: None,
        }
    }
}
