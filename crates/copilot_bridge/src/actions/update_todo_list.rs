use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use todo_core::{TodoItem, TodoStore};

use crate::action::{Action, ActionError, ActionOutcome};

/// Arguments for `updateTodoList`, validated before any mutation runs. A
/// batch whose items miss `id`, `text`, or `isCompleted` is rejected whole;
/// `assignedTo` may be absent and passes through as-is.
#[derive(Debug, Deserialize)]
struct UpdateTodoListArgs {
    items: Vec<TodoItem>,
}

/// Assistant action that reconciles a batch of items into the list: known
/// ids are replaced, new ids appended, in batch order.
pub struct UpdateTodoListAction {
    store: Arc<RwLock<TodoStore>>,
}

impl UpdateTodoListAction {
    pub fn new(store: Arc<RwLock<TodoStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for UpdateTodoListAction {
    fn name(&self) -> &str {
        "updateTodoList"
    }

    fn description(&self) -> &str {
        "Update the users todo list"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "description": "The new and updated todo list items.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "description": "The id of the todo item. When creating a new todo item, just make up a new id."
                            },
                            "text": {
                                "type": "string",
                                "description": "The text of the todo item."
                            },
                            "isCompleted": {
                                "type": "boolean",
                                "description": "The completion status of the todo item."
                            },
                            "assignedTo": {
                                "type": "string",
                                "description": "The person assigned to the todo item. If you don't know, assign it to 'YOU'."
                            }
                        },
                        "required": ["id", "text", "isCompleted", "assignedTo"]
                    }
                }
            },
            "required": ["items"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let args: UpdateTodoListArgs = serde_json::from_value(args)
            .map_err(|e| ActionError::InvalidArguments(format!("invalid todo batch: {e}")))?;

        let incoming = args.items.len();
        let mut store = self.store.write().await;
        store.bulk_upsert(args.items);
        info!(
            "updateTodoList: reconciled {} item(s), list now holds {}",
            incoming,
            store.len()
        );

        Ok(ActionOutcome::success(format!(
            "Updated the todo list with {} item(s); it now holds {}.",
            incoming,
            store.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_with_store() -> (UpdateTodoListAction, Arc<RwLock<TodoStore>>) {
        let store = Arc::new(RwLock::new(TodoStore::new()));
        (UpdateTodoListAction::new(Arc::clone(&store)), store)
    }

    #[test]
    fn action_name_matches_the_published_contract() {
        let (action, _) = action_with_store();
        assert_eq!(action.name(), "updateTodoList");
        assert_eq!(action.to_schema().schema_type, "function");
    }

    #[tokio::test]
    async fn valid_batch_reconciles_into_the_store() {
        let (action, store) = action_with_store();

        let outcome = action
            .execute(json!({
                "items": [
                    {"id": "t1", "text": "water plants", "isCompleted": false, "assignedTo": "YOU"},
                    {"id": "t2", "text": "call mom", "isCompleted": true}
                ]
            }))
            .await
            .unwrap();

        assert!(outcome.success);
        let store = store.read().await;
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("t1").unwrap().assigned_to.as_deref(), Some("YOU"));
        assert_eq!(store.get("t2").unwrap().assigned_to, None);
    }

    #[tokio::test]
    async fn batch_missing_required_fields_is_rejected_without_mutating() {
        let (action, store) = action_with_store();

        let result = action
            .execute(json!({
                "items": [{"id": "t1", "text": "no completion flag"}]
            }))
            .await;

        assert!(matches!(result, Err(ActionError::InvalidArguments(_))));
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn non_array_items_are_rejected() {
        let (action, store) = action_with_store();

        let result = action.execute(json!({"items": "not a list"})).await;

        assert!(matches!(result, Err(ActionError::InvalidArguments(_))));
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn missing_items_key_is_rejected() {
        let (action, _) = action_with_store();

        let result = action.execute(json!({})).await;

        assert!(matches!(result, Err(ActionError::InvalidArguments(_))));
    }
}
