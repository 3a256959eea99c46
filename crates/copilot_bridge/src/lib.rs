pub mod accumulator;
pub mod action;
pub mod actions;
pub mod bridge;
pub mod registry;

pub use accumulator::ToolCallAccumulator;
pub use action::{Action, ActionError, ActionOutcome, SharedAction};
pub use actions::{DeleteTodoAction, UpdateTodoListAction};
pub use bridge::{CopilotBridge, DispatchResult, DEFAULT_INSTRUCTIONS, READABLE_DESCRIPTION};
pub use registry::{ActionRegistry, RegistryError};
