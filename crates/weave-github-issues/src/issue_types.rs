use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Repository that receives every issue opened from the dashboard.
pub const WEAVE_DASHBOARD_REPO: &str = "lnooroa/weave-dashboard";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_WEB_BASE: &str = "https://github.com";
/// Reported when GitHub rejects a request without a usable `message` field.
pub const GENERIC_UPSTREAM_ERROR_MESSAGE: &str = "upstream error";
/// Reported when a local failure carries no description of its own.
pub const GENERIC_LOCAL_ERROR_MESSAGE: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Owner/name pair addressing a GitHub repository.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self, IssueSubmitError> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| IssueSubmitError::InvalidRepo(raw.to_string()))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(IssueSubmitError::InvalidRepo(raw.to_string()));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Builds the GitHub web form link that opens a new issue with `title`
/// pre-filled. Needs no credential; the browser session authenticates.
pub fn github_new_issue_url(repo: &RepoRef, title: &str) -> String {
    let base = format!("{GITHUB_WEB_BASE}/{}/issues/new", repo.as_slug());
    match reqwest::Url::parse(&base) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("title", title);
            url.into()
        }
        Err(_) => base,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Inbound issue submission as posted by the dashboard form.
pub struct IssueRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl IssueRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Issue created upstream, as reported by GitHub.
pub struct CreatedIssue {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Comment posted on an existing issue.
pub struct IssueComment {
    pub id: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure modes of an issue submission.
pub enum IssueSubmitError {
    #[error("Missing credential")]
    MissingCredential,
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Local(String),
    #[error("invalid repository '{0}', expected owner/repo")]
    InvalidRepo(String),
}

impl IssueSubmitError {
    pub fn local(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::Local(GENERIC_LOCAL_ERROR_MESSAGE.to_string());
        }
        Self::Local(message)
    }

    /// True for precondition failures detected before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::MissingField(_))
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Normalized answer returned to the dashboard for every submission.
pub struct IssueResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl IssueResult {
    pub fn created(number: u64, url: impl Into<String>) -> Self {
        Self {
            ok: true,
            number: Some(number),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            status,
            ..Self::default()
        }
    }
}

impl From<Result<CreatedIssue, IssueSubmitError>> for IssueResult {
    fn from(outcome: Result<CreatedIssue, IssueSubmitError>) -> Self {
        match outcome {
            Ok(created) => Self::created(created.number, created.url),
            Err(error) => Self::failed(error.to_string(), error.upstream_status()),
        }
    }
}
