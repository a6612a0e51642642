use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use weave_chat_proxy::{
    ChatCompletionClient, ChatCompletionClientConfig, ChatProxyPolicy, DEFAULT_CHAT_API_BASE,
};
use weave_core::current_iso8601_timestamp;
use weave_dashboard_ui::{render_weave_dashboard_page, WeaveDashboardContext};
use weave_github_issues::{
    CreatedIssue, GithubIssueClient, GithubIssueClientConfig, IssueRequest, IssueResult,
    IssueSubmitError, DEFAULT_GITHUB_API_BASE,
};

mod chat_api;
mod dashboard_page;
mod health_api;
mod issue_api;
mod server_bootstrap;

pub use health_api::{check_health, WeaveHealthReport};
pub use server_bootstrap::run_weave_gateway_server;

use chat_api::{handle_chat, handle_chat_preflight};
use dashboard_page::handle_dashboard_page;
use health_api::handle_health;
use issue_api::handle_issue_submit;
use server_bootstrap::build_weave_gateway_router;

const HEALTH_ENDPOINT: &str = "/api/health";
const ISSUE_ENDPOINT: &str = "/api/issue";
const CHAT_ENDPOINT: &str = "/chat";
const DASHBOARD_ENDPOINT: &str = "/dashboard";
const ROOT_ENDPOINT: &str = "/";

#[derive(Debug, Clone)]
/// Process-wide settings, built once at startup and shared with every
/// handler.
pub struct WeaveGatewayConfig {
    pub bind: String,
    pub github_api_base: String,
    pub github_token: Option<String>,
    pub chat_api_base: String,
    pub chat_api_key: Option<String>,
    pub chat_model: Option<String>,
    pub request_timeout_ms: u64,
    pub chat_policy: ChatProxyPolicy,
}

impl Default for WeaveGatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8788".to_string(),
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            github_token: None,
            chat_api_base: DEFAULT_CHAT_API_BASE.to_string(),
            chat_api_key: None,
            chat_model: None,
            request_timeout_ms: 30_000,
            chat_policy: ChatProxyPolicy::default(),
        }
    }
}

struct WeaveGatewayState {
    issues: GithubIssueClient,
    chat: ChatCompletionClient,
    chat_policy: ChatProxyPolicy,
}

impl WeaveGatewayState {
    fn from_config(config: &WeaveGatewayConfig) -> Result<Self> {
        let issues = GithubIssueClient::new(GithubIssueClientConfig {
            api_base: config.github_api_base.clone(),
            token: config.github_token.clone(),
            request_timeout_ms: config.request_timeout_ms,
        })
        .context("failed to construct github issue client")?;
        let chat = ChatCompletionClient::new(ChatCompletionClientConfig {
            api_base: config.chat_api_base.clone(),
            api_key: config.chat_api_key.clone(),
            model: config.chat_model.clone(),
            request_timeout_ms: config.request_timeout_ms,
        })
        .context("failed to construct chat completion client")?;

        Ok(Self {
            issues,
            chat,
            chat_policy: config.chat_policy,
        })
    }
}
