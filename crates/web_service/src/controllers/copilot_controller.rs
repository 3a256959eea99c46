use std::sync::Arc;

use actix_web::{http::StatusCode, post, web, HttpResponse};
use bytes::Bytes;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use copilot_bridge::ToolCallAccumulator;
use openai_adapter::models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStreamChunk, ChatMessage, ToolCall,
};
use openai_adapter::OpenAIAdapterTrait;

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::services::session_manager::TodoSession;

/// Body of `POST /api/copilotkit`: a chat request plus an optional session
/// id routing the call to one todo list.
#[derive(Debug, Deserialize)]
pub struct CopilotRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// POST /api/copilotkit
///
/// Forwards the chat request to the model adapter and returns the upstream
/// answer verbatim. Tool calls found in the answer are applied to the
/// session's list before the response (or the stream) completes.
#[post("/copilotkit")]
pub async fn copilotkit(
    app_state: web::Data<AppState>,
    request: web::Json<CopilotRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let session = app_state.sessions.resolve(request.session_id)?;
    let streaming = request.stream.unwrap_or(false);

    info!(
        "Copilot request for session {} ({} messages, stream: {})",
        session.id,
        request.messages.len(),
        streaming
    );

    let upstream_request = session
        .bridge
        .prepare_request(ChatCompletionRequest {
            model: request.model.unwrap_or_default(),
            messages: request.messages,
            tools: None,
            stream: Some(streaming),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        })
        .await;

    let response = app_state
        .adapter
        .send_chat_completion_request(upstream_request)
        .await
        .map_err(|e| {
            error!("Upstream request failed: {}", e);
            AppError::Upstream(e.to_string())
        })?;

    if streaming {
        relay_stream(Arc::clone(&app_state.adapter), session, response).await
    } else {
        forward_response(session, response).await
    }
}

/// Non-streaming path. The upstream body goes back verbatim; tool calls in
/// a successful answer are applied to the list first.
async fn forward_response(
    session: Arc<TodoSession>,
    response: reqwest::Response,
) -> Result<HttpResponse> {
    let upstream_status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("failed to read upstream body: {e}")))?;

    if upstream_status.is_success() {
        match serde_json::from_slice::<ChatCompletionResponse>(&body) {
            Ok(parsed) => {
                let calls = collect_tool_calls(&parsed);
                if !calls.is_empty() {
                    debug!(
                        "Dispatching {} tool call(s) for session {}",
                        calls.len(),
                        session.id
                    );
                    session.bridge.dispatch(&calls).await;
                }
            }
            Err(e) => warn!("Upstream body is not a chat completion: {}", e),
        }
    }

    let status =
        StatusCode::from_u16(upstream_status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(HttpResponse::build(status)
        .content_type(content_type)
        .body(body))
}

fn collect_tool_calls(response: &ChatCompletionResponse) -> Vec<ToolCall> {
    response
        .choices
        .iter()
        .filter_map(|choice| choice.message.tool_calls.clone())
        .flatten()
        .collect()
}

/// Streaming path. Chunks pass through as SSE frames while a side task
/// collects tool-call fragments; the collected calls are applied once the
/// upstream stream ends.
async fn relay_stream(
    adapter: Arc<dyn OpenAIAdapterTrait>,
    session: Arc<TodoSession>,
    response: reqwest::Response,
) -> Result<HttpResponse> {
    if !response.status().is_success() {
        // Upstream refused the request; there is no stream to relay.
        return forward_response(session, response).await;
    }

    let (tx, rx) = mpsc::channel(10);
    tokio::spawn(async move {
        if let Err(e) = adapter.process_chat_completion_stream(response, tx).await {
            error!("Upstream stream processing failed: {}", e);
        }
    });

    let (relay_tx, relay_rx) = mpsc::channel::<anyhow::Result<Bytes>>(10);
    tokio::spawn(inspect_and_forward(session, rx, relay_tx));

    let stream = ReceiverStream::new(relay_rx).map(|result| {
        result
            .map(|bytes| Bytes::from(format!("data: {}\n\n", String::from_utf8_lossy(&bytes))))
            .map_err(AppError::InternalError)
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(stream))
}

/// Forwards chunks to the client and feeds tool-call fragments into an
/// accumulator; dispatches the accumulated calls when the stream ends.
///
/// Keeps draining after a client disconnect so the dispatch still sees every
/// fragment. The relay sender is held until dispatch finishes, so the client
/// observes stream end only after the list has been updated.
async fn inspect_and_forward(
    session: Arc<TodoSession>,
    mut rx: mpsc::Receiver<anyhow::Result<Bytes>>,
    relay_tx: mpsc::Sender<anyhow::Result<Bytes>>,
) {
    let mut accumulator = ToolCallAccumulator::new();
    let mut client_connected = true;

    while let Some(chunk) = rx.recv().await {
        match chunk {
            Ok(bytes) => {
                if bytes.as_ref() != b"[DONE]" {
                    match serde_json::from_slice::<ChatCompletionStreamChunk>(&bytes) {
                        Ok(parsed) => {
                            for choice in parsed.choices {
                                if let Some(deltas) = choice.delta.tool_calls {
                                    accumulator.extend(deltas);
                                }
                            }
                        }
                        Err(e) => debug!("Skipping unparsable stream chunk: {}", e),
                    }
                }
                if client_connected && relay_tx.send(Ok(bytes)).await.is_err() {
                    client_connected = false;
                }
            }
            Err(e) => {
                if client_connected {
                    let _ = relay_tx.send(Err(e)).await;
                }
                break;
            }
        }
    }

    if !accumulator.is_empty() {
        let calls = accumulator.finalize();
        info!(
            "Dispatching {} streamed tool call(s) for session {}",
            calls.len(),
            session.id
        );
        session.bridge.dispatch(&calls).await;
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(copilotkit);
}
