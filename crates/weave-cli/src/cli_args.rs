use clap::{ArgAction, Parser};
use weave_chat_proxy::{ChatProxyPolicy, DEFAULT_CHAT_API_BASE};
use weave_core::non_empty_trimmed;
use weave_gateway::WeaveGatewayConfig;
use weave_github_issues::DEFAULT_GITHUB_API_BASE;

use crate::orchestrator_commands::WeaveCommand;

pub(crate) fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "weave-dashboard",
    about = "Weave dashboard server: GitHub issue proxy, chat proxy and health probe",
    version
)]
pub struct Cli {
    #[arg(
        long = "bind",
        env = "WEAVE_DASHBOARD_BIND",
        default_value = "127.0.0.1:8788",
        help = "Socket address the dashboard server listens on (host:port)"
    )]
    pub bind: String,

    #[arg(
        long = "github-token",
        env = "GH_TOKEN",
        hide_env_values = true,
        help = "GitHub token used to open issues in the dashboard repository"
    )]
    pub github_token: Option<String>,

    #[arg(
        long = "github-api-base",
        env = "WEAVE_GITHUB_API_BASE",
        default_value = DEFAULT_GITHUB_API_BASE,
        help = "Base URL of the GitHub REST API"
    )]
    pub github_api_base: String,

    #[arg(
        long = "chat-api-key",
        env = "GROQ_API_KEY",
        hide_env_values = true,
        help = "API key forwarded as bearer credential to the chat-completion API"
    )]
    pub chat_api_key: Option<String>,

    #[arg(
        long = "chat-model",
        env = "GROQ_MODEL",
        help = "Chat model identifier; falls back to the proxy default when unset"
    )]
    pub chat_model: Option<String>,

    #[arg(
        long = "chat-api-base",
        env = "WEAVE_CHAT_API_BASE",
        default_value = DEFAULT_CHAT_API_BASE,
        help = "Base URL of the OpenAI-compatible chat-completion API"
    )]
    pub chat_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "WEAVE_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for each outbound upstream request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "chat-strict-errors",
        env = "WEAVE_CHAT_STRICT_ERRORS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Answer chat proxy failures with 502 instead of an inline 200 reply"
    )]
    pub chat_strict_errors: bool,

    #[command(subcommand)]
    pub command: Option<WeaveCommand>,
}

impl Cli {
    pub fn into_gateway_config(self) -> WeaveGatewayConfig {
        WeaveGatewayConfig {
            bind: self.bind,
            github_api_base: self.github_api_base,
            github_token: non_empty_trimmed(self.github_token.as_deref()),
            chat_api_base: self.chat_api_base,
            chat_api_key: non_empty_trimmed(self.chat_api_key.as_deref()),
            chat_model: non_empty_trimmed(self.chat_model.as_deref()),
            request_timeout_ms: self.request_timeout_ms,
            chat_policy: ChatProxyPolicy {
                always_succeed: !self.chat_strict_errors,
            },
        }
    }
}
