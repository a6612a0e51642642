use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_CHAT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";
pub const CHAT_TEMPERATURE: f64 = 0.2;
/// Prefix of reply text that reports a proxy failure inline.
pub const ROUTER_ERROR_PREFIX: &str = "(router error)";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One conversation turn. `content` may be text, a list of parts or `null`;
/// it and any fields beyond `role` are forwarded untouched.
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Inbound `POST /chat` body.
pub struct ChatRequestBody {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatRequestBody {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The single text reply handed back to the chat widget.
pub struct ChatReply {
    pub content: String,
}

impl ChatReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn router_error(error: &ChatProxyError) -> Self {
        Self::new(format!("{ROUTER_ERROR_PREFIX} {error}"))
    }

    pub fn into_envelope(self) -> ChatCompletionEnvelope {
        ChatCompletionEnvelope {
            choices: vec![ChatChoice {
                message: ChatChoiceMessage {
                    content: self.content,
                },
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Wire shape of every `/chat` answer: `{ choices: [{ message: { content } }] }`.
pub struct ChatCompletionEnvelope {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatChoiceMessage {
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ChatProxyError {
    #[error("malformed chat request body: {0}")]
    MalformedRequest(#[source] serde_json::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed upstream response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("failed to create chat completion client: {0}")]
    ClientBuild(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Controls how proxy failures reach the chat widget.
pub struct ChatProxyPolicy {
    /// Answer 200 with the failure embedded as reply text instead of a
    /// failed HTTP status.
    pub always_succeed: bool,
}

impl Default for ChatProxyPolicy {
    fn default() -> Self {
        Self {
            always_succeed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// HTTP status plus reply, ready to be written to the caller.
pub struct ChatProxyResponse {
    pub status: u16,
    pub reply: ChatReply,
}

impl ChatProxyPolicy {
    pub fn settle(&self, outcome: Result<ChatReply, ChatProxyError>) -> ChatProxyResponse {
        match outcome {
            Ok(reply) => ChatProxyResponse { status: 200, reply },
            Err(error) => ChatProxyResponse {
                status: if self.always_succeed { 200 } else { 502 },
                reply: ChatReply::router_error(&error),
            },
        }
    }
}
