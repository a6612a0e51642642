//! `GET /` and `GET /dashboard` page handler.

use super::*;

pub(super) async fn handle_dashboard_page(
    State(state): State<Arc<WeaveGatewayState>>,
) -> Html<String> {
    let context = WeaveDashboardContext::new(
        state.issues.repo().clone(),
        state.issues.has_credential(),
    );
    Html(render_weave_dashboard_page(&context))
}
