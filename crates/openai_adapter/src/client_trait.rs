use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Response;
use tokio::sync::mpsc::Sender;

use crate::models::ChatCompletionRequest;

/// Seam between the HTTP surface and the chat completion backend. The
/// service holds a `dyn OpenAIAdapterTrait` so tests can stand in for the
/// network client.
#[async_trait]
pub trait OpenAIAdapterTrait: Send + Sync {
    /// Forwards a chat completion request and returns the raw upstream
    /// response, whatever its status.
    async fn send_chat_completion_request(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<Response>;

    /// Reads the SSE body of a streaming response, relaying each chunk's
    /// data untouched (and the final `[DONE]` marker) over `tx`.
    async fn process_chat_completion_stream(
        &self,
        response: Response,
        tx: Sender<Result<Bytes>>,
    ) -> Result<()>;
}
