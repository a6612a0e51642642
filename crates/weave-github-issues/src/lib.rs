//! Issue submission proxy for the Weave dashboard.
//!
//! Validates a title/body pair, forwards it to the GitHub Issues API of the
//! dashboard repository and normalizes the upstream answer into an
//! [`IssueResult`]. Result comments on existing issues go through the same
//! client.
mod github_issue_client;
mod issue_types;

pub use github_issue_client::{GithubIssueClient, GithubIssueClientConfig};
pub use issue_types::{
    github_new_issue_url, CreatedIssue, IssueComment, IssueRequest, IssueResult, IssueSubmitError, RepoRef,
    DEFAULT_GITHUB_API_BASE, GENERIC_LOCAL_ERROR_MESSAGE, GENERIC_UPSTREAM_ERROR_MESSAGE,
    WEAVE_DASHBOARD_REPO,
};
