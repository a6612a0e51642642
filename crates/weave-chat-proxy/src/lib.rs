//! Chat completion proxy for the Weave dashboard chat widget.
//!
//! Forwards a conversation to an OpenAI-compatible chat-completions API and
//! always hands back exactly one reply, embedding failures as reply text.
mod chat_completion_client;
mod chat_types;

pub use chat_completion_client::{ChatCompletionClient, ChatCompletionClientConfig};
pub use chat_types::{
    ChatChoice, ChatChoiceMessage, ChatCompletionEnvelope, ChatMessage, ChatProxyError,
    ChatProxyPolicy, ChatProxyResponse, ChatReply, ChatRequestBody, CHAT_TEMPERATURE,
    DEFAULT_CHAT_API_BASE, DEFAULT_CHAT_MODEL, ROUTER_ERROR_PREFIX,
};
