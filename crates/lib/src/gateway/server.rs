//! Gateway HTTP server: health probe and the LINE webhook.

use crate::channels::{verify_signature, LineChannel, ReplyChannel, WebhookBody};
use crate::config::{self, Config};
use crate::dispatcher::Dispatcher;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

const SIGNATURE_HEADER: &str = "x-line-signature";

/// Shared state for the gateway (config, dispatcher, reply channel).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// LINE channel secret for signature checks. None => every webhook fails with 500.
    pub channel_secret: Option<String>,
    pub dispatcher: Arc<Dispatcher>,
    pub channel: Arc<dyn ReplyChannel>,
}

impl GatewayState {
    /// Resolve credentials and build the dispatcher (adapters, music token, model chain).
    pub async fn from_config(config: Config) -> Self {
        let channel_secret = config::resolve_line_channel_secret(&config);
        if channel_secret.is_none() {
            log::warn!("LINE_CHANNEL_SECRET not set; webhook requests will be rejected");
        }
        let access_token = config::resolve_line_access_token(&config);
        if access_token.is_none() {
            log::warn!("LINE_CHANNEL_ACCESS_TOKEN not set; replies cannot be delivered");
        }
        let channel = Arc::new(
            LineChannel::new(access_token, config.line.api_base_url.clone())
                .with_timeout(config::request_timeout(&config)),
        );
        let dispatcher = Arc::new(Dispatcher::from_config(&config).await);
        Self {
            config: Arc::new(config),
            channel_secret,
            dispatcher,
            channel,
        }
    }
}

/// Routes: `GET /` health, `POST /webhook` LINE events. Other methods on /webhook get 405.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/webhook", post(line_webhook))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config).await;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);
    serve(listener, state).await
}

/// Serve the gateway routes on an already-bound listener until shutdown.
pub async fn serve(listener: tokio::net::TcpListener, state: GatewayState) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /webhook: verify `x-line-signature`, then dispatch each text message in order and
/// reply before moving to the next. Delivery failures are logged; the response is still 200.
async fn line_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let Some(secret) = state.channel_secret.as_deref() else {
        log::error!("webhook: channel secret not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error: channel secret not configured".to_string(),
        );
    };
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !verify_signature(&body, signature, secret) {
        log::warn!("webhook: invalid signature");
        return (StatusCode::BAD_REQUEST, "Invalid signature.".to_string());
    }
    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            log::error!("webhook: malformed body: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {}", e),
            );
        }
    };

    let request_id = uuid::Uuid::new_v4();
    let messages = payload.text_messages();
    log::info!(
        "webhook {}: {} event(s), {} text message(s)",
        request_id,
        payload.events.len(),
        messages.len()
    );
    for inbound in messages {
        let reply = state.dispatcher.dispatch(&inbound).await;
        match state.channel.reply(&inbound.reply_token, &reply).await {
            Ok(()) => log::info!("webhook {}: replied via {}", request_id, state.channel.id()),
            Err(e) => log::warn!("webhook {}: reply failed: {}", request_id, e),
        }
    }
    (StatusCode::OK, "OK".to_string())
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}
