use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use openai_adapter::models::{FunctionSchema, ToolSchema};

#[derive(Error, Debug, Clone)]
pub enum ActionError {
    #[error("Action not found: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Outcome of one action invocation. Dispatch folds errors into failed
/// outcomes, so `success: false` is the normal shape for a call the
/// assistant got wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub result: String,
}

impl ActionOutcome {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: result.into(),
        }
    }

    pub fn failure(result: impl Into<String>) -> Self {
        Self {
            success: false,
            result: result.into(),
        }
    }
}

/// A named operation the assistant may invoke against the todo list.
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> serde_json::Value;
    async fn execute(&self, args: serde_json::Value) -> Result<ActionOutcome, ActionError>;

    /// Function-tool descriptor published to the model.
    fn to_schema(&self) -> ToolSchema {
        ToolSchema {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

pub type SharedAction = Arc<dyn Action>;
