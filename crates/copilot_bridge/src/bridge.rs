use std::sync::Arc;

use log::warn;
use serde_json::json;
use tokio::sync::RwLock;

use openai_adapter::models::{ChatCompletionRequest, ChatMessage, ToolCall};
use todo_core::TodoStore;

use crate::action::{ActionError, ActionOutcome};
use crate::actions::{DeleteTodoAction, UpdateTodoListAction};
use crate::registry::{ActionRegistry, RegistryError};

/// Default operator instructions sent ahead of every conversation.
pub const DEFAULT_INSTRUCTIONS: &str = "Help the user manage a todo list. If the user provides a \
    high level goal, break it down into a few specific tasks and add them to the list";

/// Description under which the list is published to the assistant.
pub const READABLE_DESCRIPTION: &str = "The user's todo list.";

/// Result of dispatching one assistant-issued call.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub call_id: String,
    pub action: String,
    pub outcome: ActionOutcome,
}

/// Connects one todo list to the assistant: publishes the list as readable
/// context, advertises the registered actions as tools, and applies the
/// calls a model response carries back to the store.
pub struct CopilotBridge {
    store: Arc<RwLock<TodoStore>>,
    registry: ActionRegistry,
    instructions: String,
}

impl CopilotBridge {
    /// Bridge with the standard todo actions registered against `store`.
    pub fn new(
        store: Arc<RwLock<TodoStore>>,
        instructions: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let registry = ActionRegistry::new();
        registry.register(UpdateTodoListAction::new(Arc::clone(&store)))?;
        registry.register(DeleteTodoAction::new(Arc::clone(&store)))?;
        Ok(CopilotBridge {
            store,
            registry,
            instructions: instructions.into(),
        })
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Current list snapshot under its published description.
    pub async fn readable_state(&self) -> serde_json::Value {
        let store = self.store.read().await;
        json!({
            "description": READABLE_DESCRIPTION,
            "value": store.items(),
        })
    }

    /// System message carrying the instructions and the list snapshot.
    pub async fn system_message(&self) -> String {
        let store = self.store.read().await;
        let items = serde_json::to_string(store.items()).unwrap_or_else(|_| "[]".to_string());
        format!("{}\n\n{}\n{}", self.instructions, READABLE_DESCRIPTION, items)
    }

    /// Prepares an outbound request: the system message goes first, the
    /// caller's messages follow unmodified, and the registered actions are
    /// attached as tools.
    pub async fn prepare_request(
        &self,
        mut request: ChatCompletionRequest,
    ) -> ChatCompletionRequest {
        let system = ChatMessage::system(self.system_message().await);
        request.messages.insert(0, system);

        let tools = self.registry.list_schemas();
        if !tools.is_empty() {
            request.tools = Some(tools);
        }
        request
    }

    /// Applies assistant-issued calls strictly in call order, one at a
    /// time. Every call produces a result; unknown actions and bad
    /// arguments become failed outcomes without stopping the calls that
    /// follow. There is no retry and no queueing: the last write wins.
    pub async fn dispatch(&self, calls: &[ToolCall]) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let outcome = self.dispatch_one(call).await;
            if !outcome.success {
                warn!(
                    "dispatch: call '{}' ({}) failed: {}",
                    call.id, call.function.name, outcome.result
                );
            }
            results.push(DispatchResult {
                call_id: call.id.clone(),
                action: call.function.name.clone(),
                outcome,
            });
        }
        results
    }

    async fn dispatch_one(&self, call: &ToolCall) -> ActionOutcome {
        let Some(action) = self.registry.get(&call.function.name) else {
            let error = ActionError::NotFound(call.function.name.clone());
            return ActionOutcome::failure(error.to_string());
        };

        let args = if call.function.arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(&call.function.arguments) {
                Ok(args) => args,
                Err(e) => {
                    let error = ActionError::InvalidArguments(format!(
                        "arguments for '{}' are not valid JSON: {}",
                        call.function.name, e
                    ));
                    return ActionOutcome::failure(error.to_string());
                }
            }
        };

        match action.execute(args).await {
            Ok(outcome) => outcome,
            Err(error) => ActionOutcome::failure(error.to_string()),
        }
    }
}
