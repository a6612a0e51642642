//! `GET /api/health` probe.

use super::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeaveHealthReport {
    pub ok: bool,
    pub has_credential: bool,
    pub time: String,
}

/// Reports credential presence and the current UTC time. Never fails.
pub fn check_health(has_credential: bool) -> WeaveHealthReport {
    WeaveHealthReport {
        ok: true,
        has_credential,
        time: current_iso8601_timestamp(),
    }
}

pub(super) async fn handle_health(State(state): State<Arc<WeaveGatewayState>>) -> Response {
    (
        StatusCode::OK,
        Json(check_health(state.issues.has_credential())),
    )
        .into_response()
}
