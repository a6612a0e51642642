use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::issue_types::{
    CreatedIssue, IssueComment, IssueRequest, IssueResult, IssueSubmitError, RepoRef, DEFAULT_GITHUB_API_BASE,
    GENERIC_UPSTREAM_ERROR_MESSAGE, WEAVE_DASHBOARD_REPO,
};

const GITHUB_USER_AGENT: &str = "weave-dashboard-issue-proxy";
const GITHUB_API_VERSION: &str = "2022-11-28";
const MIN_REQUEST_TIMEOUT_MS: u64 = 1_000;

#[derive(Debug, Clone)]
/// Settings for [`GithubIssueClient`].
pub struct GithubIssueClientConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for GithubIssueClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            token: None,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GithubIssueCreateResponse {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubIssueCommentResponse {
    id: u64,
    html_url: String,
}

/// GitHub's `message` field, or a generic text when the body has none.
fn upstream_rejection_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|payload| {
            payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR_MESSAGE.to_string())
}

/// Decoded answer of a single issue-creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UpstreamIssueOutcome {
    Created { number: u64, url: String },
    Rejected { status: u16, message: String },
}

impl UpstreamIssueOutcome {
    fn decode(status: reqwest::StatusCode, body: &[u8]) -> Result<Self, IssueSubmitError> {
        if !status.is_success() {
            return Ok(Self::Rejected {
                status: status.as_u16(),
                message: upstream_rejection_message(body),
            });
        }

        let created = serde_json::from_slice::<GithubIssueCreateResponse>(body).map_err(|error| {
            IssueSubmitError::local(format!("failed to decode github issue response: {error}"))
        })?;
        Ok(Self::Created {
            number: created.number,
            url: created.html_url,
        })
    }
}

#[derive(Debug, Clone)]
/// Creates issues in the dashboard repository through the GitHub REST API.
pub struct GithubIssueClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    repo: RepoRef,
}

impl GithubIssueClient {
    pub fn new(config: GithubIssueClientConfig) -> Result<Self, IssueSubmitError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(GITHUB_USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(
                config.request_timeout_ms.max(MIN_REQUEST_TIMEOUT_MS),
            ))
            .build()
            .map_err(|error| {
                IssueSubmitError::local(format!("failed to create github api client: {error}"))
            })?;

        let token = config
            .token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            http,
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            token,
            repo: RepoRef::parse(WEAVE_DASHBOARD_REPO)?,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.token.is_some()
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_base, self.repo.owner, self.repo.name
        )
    }

    fn issue_comments_url(&self, issue_number: u64) -> String {
        format!("{}/{issue_number}/comments", self.issues_url())
    }

    /// Opens an issue and folds every outcome into an [`IssueResult`].
    pub async fn submit_issue(&self, title: &str, body: &str) -> IssueResult {
        IssueResult::from(self.try_submit_issue(&IssueRequest::new(title, body)).await)
    }

    /// Opens an issue, reporting validation and upstream failures as typed
    /// errors. Preconditions are checked before any network call.
    pub async fn try_submit_issue(
        &self,
        request: &IssueRequest,
    ) -> Result<CreatedIssue, IssueSubmitError> {
        let Some(token) = self.token.as_deref() else {
            return Err(IssueSubmitError::MissingCredential);
        };
        let title = request.title();
        if title.trim().is_empty() {
            return Err(IssueSubmitError::MissingField("title"));
        }

        let payload = json!({ "title": title, "body": request.body() });
        let response = self
            .http
            .post(self.issues_url())
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|error| IssueSubmitError::local(error.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| IssueSubmitError::local(error.to_string()))?;

        match UpstreamIssueOutcome::decode(status, &bytes)? {
            UpstreamIssueOutcome::Created { number, url } => {
                tracing::info!(repo = %self.repo.as_slug(), number, "opened github issue");
                Ok(CreatedIssue { number, url })
            }
            UpstreamIssueOutcome::Rejected { status, message } => {
                tracing::warn!(
                    repo = %self.repo.as_slug(),
                    status,
                    message = %message,
                    "github rejected issue creation"
                );
                Err(IssueSubmitError::Upstream { status, message })
            }
        }
    }

    /// Posts a markdown comment on an existing issue.
    pub async fn comment_on_issue(
        &self,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment, IssueSubmitError> {
        let Some(token) = self.token.as_deref() else {
            return Err(IssueSubmitError::MissingCredential);
        };
        if body.trim().is_empty() {
            return Err(IssueSubmitError::MissingField("comment body"));
        }

        let response = self
            .http
            .post(self.issue_comments_url(issue_number))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .map_err(|error| IssueSubmitError::local(error.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| IssueSubmitError::local(error.to_string()))?;

        if !status.is_success() {
            let message = upstream_rejection_message(&bytes);
            tracing::warn!(
                repo = %self.repo.as_slug(),
                issue_number,
                status = status.as_u16(),
                message = %message,
                "github rejected issue comment"
            );
            return Err(IssueSubmitError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        let created =
            serde_json::from_slice::<GithubIssueCommentResponse>(&bytes).map_err(|error| {
                IssueSubmitError::local(format!("failed to decode github comment response: {error}"))
            })?;
        tracing::info!(
            repo = %self.repo.as_slug(),
            issue_number,
            comment_id = created.id,
            "commented on github issue"
        );
        Ok(IssueComment {
            id: created.id,
            url: created.html_url,
        })
    }
}
