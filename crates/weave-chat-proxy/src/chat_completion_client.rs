use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use weave_core::{current_unix_timestamp_ms, elapsed_ms_since, non_empty_trimmed};

use crate::chat_types::{
    ChatMessage, ChatProxyError, ChatReply, ChatRequestBody, CHAT_TEMPERATURE,
    DEFAULT_CHAT_API_BASE, DEFAULT_CHAT_MODEL,
};

const MIN_REQUEST_TIMEOUT_MS: u64 = 1_000;

#[derive(Debug, Clone)]
/// Settings for [`ChatCompletionClient`].
pub struct ChatCompletionClientConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for ChatCompletionClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_CHAT_API_BASE.to_string(),
            api_key: None,
            model: None,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamChatChoice {
    message: Option<UpstreamChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct UpstreamChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UpstreamChatOutcome {
    Reply { content: String },
    RawPayload { payload: String },
}

impl UpstreamChatOutcome {
    fn decode(payload: Value) -> Self {
        // Only the first choice is decoded; siblings may use any shape.
        let content = payload
            .pointer("/choices/0")
            .cloned()
            .and_then(|choice| serde_json::from_value::<UpstreamChatChoice>(choice).ok())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);
        match content {
            Some(content) => Self::Reply { content },
            None => Self::RawPayload {
                payload: payload.to_string(),
            },
        }
    }

    fn into_reply(self) -> ChatReply {
        match self {
            Self::Reply { content } => ChatReply::new(content),
            Self::RawPayload { payload } => ChatReply::new(payload),
        }
    }
}

#[derive(Debug, Clone)]
/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    completions_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(config: ChatCompletionClientConfig) -> Result<Self, ChatProxyError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(
                config.request_timeout_ms.max(MIN_REQUEST_TIMEOUT_MS),
            ))
            .build()
            .map_err(|error| ChatProxyError::ClientBuild(error.to_string()))?;

        Ok(Self {
            http,
            completions_url: format!(
                "{}/chat/completions",
                config.api_base.trim().trim_end_matches('/')
            ),
            api_key: non_empty_trimmed(config.api_key.as_deref()),
            model: non_empty_trimmed(config.model.as_deref())
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forwards a conversation and always produces a reply; failures become
    /// `(router error) ...` text.
    pub async fn complete_chat(&self, messages: &[ChatMessage]) -> ChatReply {
        match self.try_complete_chat(messages).await {
            Ok(reply) => reply,
            Err(error) => ChatReply::router_error(&error),
        }
    }

    /// Parses a raw `POST /chat` body and forwards its conversation.
    pub async fn complete_chat_body(&self, body: &[u8]) -> Result<ChatReply, ChatProxyError> {
        let request: ChatRequestBody =
            serde_json::from_slice(body).map_err(ChatProxyError::MalformedRequest)?;
        self.try_complete_chat(&request.into_messages()).await
    }

    pub async fn try_complete_chat(
        &self,
        messages: &[ChatMessage],
    ) -> Result<ChatReply, ChatProxyError> {
        let started_unix_ms = current_unix_timestamp_ms();
        let payload = json!({
            "model": self.model,
            "temperature": CHAT_TEMPERATURE,
            "messages": messages,
        });
        let response = self
            .http
            .post(self.completions_url.as_str())
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&payload)
            .send()
            .await
            .inspect_err(|error| {
                tracing::warn!(error = %error, "chat completion request failed");
            })?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let payload: Value =
            serde_json::from_slice(&bytes).map_err(ChatProxyError::MalformedResponse)?;

        let outcome = UpstreamChatOutcome::decode(payload);
        tracing::debug!(
            status = status.as_u16(),
            model = %self.model,
            message_count = messages.len(),
            raw_payload = matches!(outcome, UpstreamChatOutcome::RawPayload { .. }),
            duration_ms = elapsed_ms_since(started_unix_ms),
            "chat completion relayed"
        );
        Ok(outcome.into_reply())
    }
}
