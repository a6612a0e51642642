//! Weave gateway server bootstrap and router wiring.

use super::*;

/// Run the Weave dashboard server until ctrl-c.
pub async fn run_weave_gateway_server(config: WeaveGatewayConfig) -> Result<()> {
    let bind_addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid --bind '{}': expected host:port", config.bind))?;
    let state = Arc::new(WeaveGatewayState::from_config(&config)?);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind weave dashboard on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve weave dashboard listen address")?;

    tracing::info!(
        addr = %local_addr,
        repo = %state.issues.repo().as_slug(),
        has_credential = state.issues.has_credential(),
        chat_upstream = state.chat.completions_url(),
        chat_model = state.chat.model(),
        chat_has_api_key = state.chat.has_api_key(),
        "weave dashboard listening"
    );

    let app = build_weave_gateway_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("weave dashboard server exited unexpectedly")?;
    tracing::info!("weave dashboard stopped");
    Ok(())
}

pub(super) fn build_weave_gateway_router(state: Arc<WeaveGatewayState>) -> Router {
    Router::new()
        .route(ROOT_ENDPOINT, get(handle_dashboard_page))
        .route(DASHBOARD_ENDPOINT, get(handle_dashboard_page))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .route(ISSUE_ENDPOINT, post(handle_issue_submit))
        .route(
            CHAT_ENDPOINT,
            post(handle_chat).options(handle_chat_preflight),
        )
        .with_state(state)
}
