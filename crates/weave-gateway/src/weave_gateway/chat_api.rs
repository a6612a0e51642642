//! `POST /chat` and its cross-origin pre-flight.

use super::*;

const CHAT_ALLOWED_HEADERS: &str = "content-type";
const CHAT_ALLOWED_METHODS: &str = "GET,POST,OPTIONS";

pub(super) async fn handle_chat(
    State(state): State<Arc<WeaveGatewayState>>,
    body: Bytes,
) -> Response {
    let outcome = state.chat.complete_chat_body(&body).await;
    if let Err(error) = &outcome {
        tracing::warn!(error = %error, "chat proxy failed; replying with inline router error");
    }
    let settled = state.chat_policy.settle(outcome);
    let status = StatusCode::from_u16(settled.status).unwrap_or(StatusCode::OK);

    let mut response = (status, Json(settled.reply.into_envelope())).into_response();
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

pub(super) async fn handle_chat_preflight() -> Response {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_HEADERS, CHAT_ALLOWED_HEADERS),
            (ACCESS_CONTROL_ALLOW_METHODS, CHAT_ALLOWED_METHODS),
        ],
    )
        .into_response()
}
