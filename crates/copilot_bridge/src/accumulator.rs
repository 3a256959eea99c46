use uuid::Uuid;

use openai_adapter::models::{FunctionCall, StreamToolCall, ToolCall};

/// One tool call under assembly while its fragments stream in.
#[derive(Debug, Clone)]
struct PartialToolCall {
    index: u32,
    id: String,
    tool_type: String,
    name: String,
    arguments: String,
}

/// Collects streamed tool-call fragments so a streaming response can be
/// dispatched exactly like a buffered one once the stream ends.
#[derive(Debug, Default, Clone)]
pub struct ToolCallAccumulator {
    parts: Vec<PartialToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one fragment in. Fragments join the partial with the same
    /// index; `arguments` append across fragments while `id`, `type`, and
    /// `name` fill in whenever a fragment carries them.
    pub fn update(&mut self, delta: StreamToolCall) {
        let id = delta.id.unwrap_or_default();
        let tool_type = delta.tool_type.unwrap_or_default();
        let (name, arguments) = match delta.function {
            Some(function) => (
                function.name.unwrap_or_default(),
                function.arguments.unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        if id.is_empty() && name.is_empty() && arguments.is_empty() {
            return;
        }

        if let Some(part) = self.parts.iter_mut().find(|part| part.index == delta.index) {
            part.arguments.push_str(&arguments);
            if !id.is_empty() {
                part.id = id;
            }
            if !name.is_empty() {
                part.name = name;
            }
            if !tool_type.is_empty() {
                part.tool_type = tool_type;
            }
        } else {
            self.parts.push(PartialToolCall {
                index: delta.index,
                id,
                tool_type,
                name,
                arguments,
            });
        }
    }

    pub fn extend<I>(&mut self, deltas: I)
    where
        I: IntoIterator<Item = StreamToolCall>,
    {
        for delta in deltas {
            self.update(delta);
        }
    }

    /// Completed calls in index order. Parts that never received a name are
    /// dropped; missing ids are generated so every call can be answered.
    pub fn finalize(mut self) -> Vec<ToolCall> {
        self.parts.sort_by_key(|part| part.index);
        self.parts
            .into_iter()
            .filter(|part| !part.name.trim().is_empty())
            .map(|part| ToolCall {
                id: if part.id.is_empty() {
                    format!("call_{}", Uuid::new_v4())
                } else {
                    part.id
                },
                tool_type: if part.tool_type.is_empty() {
                    "function".to_string()
                } else {
                    part.tool_type
                },
                function: FunctionCall {
                    name: part.name,
                    arguments: part.arguments,
                },
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
