use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use todo_core::TodoStore;

use crate::action::{Action, ActionError, ActionOutcome};

#[derive(Debug, Deserialize)]
struct DeleteTodoArgs {
    id: String,
}

/// Assistant action that removes one item by id. An id that matches
/// nothing succeeds as a no-op; the list stays as it was.
pub struct DeleteTodoAction {
    store: Arc<RwLock<TodoStore>>,
}

impl DeleteTodoAction {
    pub fn new(store: Arc<RwLock<TodoStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for DeleteTodoAction {
    fn name(&self) -> &str {
        "deleteTodo"
    }

    fn description(&self) -> &str {
        "Delete a todo item"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "The id of the todo item to delete."
                }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ActionOutcome, ActionError> {
        let args: DeleteTodoArgs = serde_json::from_value(args)
            .map_err(|e| ActionError::InvalidArguments(format!("invalid delete request: {e}")))?;

        let removed = self.store.write().await.delete(&args.id);
        info!("deleteTodo: id '{}', removed: {}", args.id, removed);

        if removed {
            Ok(ActionOutcome::success(format!(
                "Deleted todo item '{}'.",
                args.id
            )))
        } else {
            Ok(ActionOutcome::success(format!(
                "No todo item with id '{}'; nothing to delete.",
                args.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_with_store() -> (DeleteTodoAction, Arc<RwLock<TodoStore>>) {
        let store = Arc::new(RwLock::new(TodoStore::new()));
        (DeleteTodoAction::new(Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn deletes_an_existing_item() {
        let (action, store) = action_with_store();
        let id = store.write().await.add("buy milk").unwrap().id;

        let outcome = action.execute(json!({ "id": id })).await.unwrap();

        assert!(outcome.success);
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_a_quiet_no_op() {
        let (action, store) = action_with_store();
        store.write().await.add("buy milk");

        let outcome = action.execute(json!({"id": "missing"})).await.unwrap();

        assert!(outcome.success);
        assert_eq!(store.read().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_id_argument_is_rejected() {
        let (action, _) = action_with_store();

        let result = action.execute(json!({})).await;

        assert!(matches!(result, Err(ActionError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn non_string_id_is_rejected() {
        let (action, _) = action_with_store();

        let result = action.execute(json!({"id": 42})).await;

        assert!(matches!(result, Err(ActionError::InvalidArguments(_))));
    }
}
