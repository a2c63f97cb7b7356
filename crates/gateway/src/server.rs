use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::State,
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::trace::TraceLayer,
    tracing::{info, warn},
};

use crate::{
    state::GatewayState,
    webhooks::{bot_inbound_handler, crm_outbound_handler},
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/webhook/bot-inbound", post(bot_inbound_handler))
        .route("/webhook/crm-outbound", post(crm_outbound_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { gateway: state })
}

/// Bind and serve until ctrl-c.
pub async fn start_gateway(bind: &str, port: u16, state: Arc<GatewayState>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let integration = state.integration.style();
    let app = build_gateway_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, %integration, "hublink gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("hublink gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
        "integration": state.gateway.integration.style().as_str(),
    }))
}
