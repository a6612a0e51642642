//! `POST /api/issue` handler.

use super::*;

fn issue_status_code(outcome: &Result<CreatedIssue, IssueSubmitError>) -> StatusCode {
    match outcome {
        Ok(_) => StatusCode::OK,
        Err(error) if error.is_validation() => StatusCode::BAD_REQUEST,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn issue_response(outcome: Result<CreatedIssue, IssueSubmitError>) -> Response {
    let status = issue_status_code(&outcome);
    (status, Json(IssueResult::from(outcome))).into_response()
}

pub(super) async fn handle_issue_submit(
    State(state): State<Arc<WeaveGatewayState>>,
    body: Bytes,
) -> Response {
    // Credential precedes body parsing.
    if !state.issues.has_credential() {
        return issue_response(Err(IssueSubmitError::MissingCredential));
    }

    let request = match serde_json::from_slice::<IssueRequest>(&body) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(error = %error, "rejected malformed issue request body");
            return issue_response(Err(IssueSubmitError::local(format!(
                "malformed issue request body: {error}"
            ))));
        }
    };

    issue_response(state.issues.try_submit_issue(&request).await)
}
