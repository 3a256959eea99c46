use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use log::{error, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Proxy, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use tokio::sync::mpsc::Sender;

use crate::client_trait::OpenAIAdapterTrait;
use crate::config::{Config, ProxyAuth};
use crate::models::{ChatCompletionRequest, ChatCompletionStreamChunk};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

fn apply_proxy_auth(proxy: Proxy, auth: Option<&ProxyAuth>) -> Proxy {
    let Some(auth) = auth else {
        return proxy;
    };
    if auth.username.is_empty() {
        return proxy;
    }
    proxy.basic_auth(&auth.username, &auth.password)
}

/// Chat completion client for any OpenAI-compatible backend. Transient
/// transport failures retry with exponential backoff; HTTP error statuses
/// are returned to the caller untouched.
#[derive(Debug)]
pub struct OpenAIAdapter {
    client: Arc<ClientWithMiddleware>,
    config: Config,
}

impl OpenAIAdapter {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Self::build_http_client(&config)?;
        let retry_client = Self::build_retry_client(client);
        Ok(OpenAIAdapter {
            client: Arc::new(retry_client),
            config,
        })
    }

    fn build_http_client(config: &Config) -> anyhow::Result<Client> {
        let mut builder = Client::builder().default_headers(Self::default_headers());
        if !config.http_proxy.is_empty() {
            let mut proxy = Proxy::http(&config.http_proxy)?;
            proxy = apply_proxy_auth(proxy, config.http_proxy_auth.as_ref());
            builder = builder.proxy(proxy);
        }
        if !config.https_proxy.is_empty() {
            let mut proxy = Proxy::https(&config.https_proxy)?;
            proxy = apply_proxy_auth(proxy, config.https_proxy_auth.as_ref());
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {e}"))
    }

    fn build_retry_client(client: Client) -> ClientWithMiddleware {
        // Exponential backoff: 1s, 2s, 4s with jitter
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(5))
            .build_with_max_retries(3);

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn chat_completions_url(base: &str) -> String {
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[async_trait]
impl OpenAIAdapterTrait for OpenAIAdapter {
    async fn send_chat_completion_request(
        &self,
        mut request: ChatCompletionRequest,
    ) -> anyhow::Result<Response> {
        if request.model.is_empty() {
            request.model = self
                .config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        }

        let base_url = self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let url = Self::chat_completions_url(base_url);
        info!(
            "Forwarding chat completion ({} messages, model '{}') to {}",
            request.messages.len(),
            request.model,
            url
        );

        let mut request_builder = self.client.post(&url);
        if let Some(api_key) = self.config.api_key.as_deref() {
            request_builder =
                request_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        request_builder.json(&request).send().await.map_err(|e| {
            error!("Failed to send chat completion request: {}", e);
            anyhow!("Failed to send chat completion request: {}", e)
        })
    }

    async fn process_chat_completion_stream(
        &self,
        response: Response,
        tx: Sender<anyhow::Result<Bytes>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = response.bytes_stream().eventsource();
        while let Some(event_result) = event_stream.next().await {
            match event_result {
                Ok(message) => {
                    if message.data == "[DONE]" {
                        info!("Received [DONE] signal, closing stream.");
                        let _ = tx.send(Ok(Bytes::from("[DONE]"))).await;
                        break;
                    }
                    // Chunks relay byte-for-byte; the parse is log-only so
                    // no field the chunk type lacks gets stripped.
                    if let Err(e) =
                        serde_json::from_str::<ChatCompletionStreamChunk>(&message.data)
                    {
                        error!("Failed to parse stream chunk: {}, data: {}", e, message.data);
                    }
                    if tx.send(Ok(Bytes::from(message.data))).await.is_err() {
                        warn!("Failed to send chunk - receiver dropped.");
                        break;
                    }
                }
                Err(e) => {
                    error!("Error in SSE stream: {}", e);
                    let _ = tx.send(Err(anyhow!("Error in SSE stream: {}", e))).await;
                    break;
                }
            }
        }
        Ok(())
    }
}
