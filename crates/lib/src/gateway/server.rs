//! Gateway HTTP server (single port): Slack events webhook and health probe.

use crate::bridge::{self, BridgeResponse, BridgeSettings, DeliveryMetadata};
use crate::channels::SlackClient;
use crate::config::{self, Config};
use crate::gateway::signature;
use crate::llm::ChatAppClient;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

const RETRY_NUM_HEADER: &str = "X-Slack-Retry-Num";
const RETRY_REASON_HEADER: &str = "X-Slack-Retry-Reason";
const SIGNATURE_HEADER: &str = "X-Slack-Signature";
const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Read-only state shared by request handlers. Secrets are resolved once at startup.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub settings: Arc<BridgeSettings>,
    /// When Some, every events request must carry a valid Slack signature.
    pub signing_secret: Option<String>,
    pub bot_token: Option<String>,
    pub slack_api_base: Option<String>,
    pub backend_api_key: Option<String>,
}

impl GatewayState {
    /// Resolve secrets (env over config) and bridge settings.
    pub fn from_config(config: Config) -> Self {
        Self {
            settings: Arc::new(BridgeSettings::from_config(&config)),
            signing_secret: config::resolve_signing_secret(&config),
            bot_token: config::resolve_bot_token(&config),
            slack_api_base: config::resolve_slack_api_base(&config),
            backend_api_key: config::resolve_backend_api_key(&config),
            config: Arc::new(config),
        }
    }

    fn slack_client(&self) -> SlackClient {
        SlackClient::new(self.slack_api_base.clone(), self.bot_token.clone())
    }

    fn backend_client(&self) -> ChatAppClient {
        ChatAppClient::new(
            Some(self.config.backend.base_url.clone()),
            self.backend_api_key.clone(),
        )
    }
}

impl IntoResponse for BridgeResponse {
    /// Always 200: Slack treats anything else as a failed delivery and redelivers.
    fn into_response(self) -> Response {
        match self {
            BridgeResponse::Ack => (StatusCode::OK, "ok").into_response(),
            BridgeResponse::Challenge(challenge) => {
                (StatusCode::OK, Json(json!({ "challenge": challenge }))).into_response()
            }
            BridgeResponse::Posted(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
            BridgeResponse::Diagnostic(text) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Build the router: `GET /` health, `POST {events_path}` Slack events.
pub fn router(state: GatewayState) -> Router {
    let path = state.config.gateway.events_path.trim();
    let events_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    Router::new()
        .route("/", get(health_http))
        .route(&events_path, post(slack_events))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let state = GatewayState::from_config(config);
    if state.signing_secret.is_none() {
        log::warn!("no slack signing secret configured; events requests are not verified");
    }
    if state.bot_token.is_none() {
        log::warn!("no slack bot token configured; replies will fail");
    }
    if state.backend_api_key.is_none() {
        log::warn!("no chat backend api key configured; every query will get the apology reply");
    }

    let bind_addr = format!(
        "{}:{}",
        state.config.gateway.bind.trim(),
        state.config.gateway.port
    );
    let events_path = state.config.gateway.events_path.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {} (events at {})", bind_addr, events_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining in-flight deliveries");
}

/// POST {events_path} — verifies the optional signature, then runs the bridge for this delivery.
async fn slack_events(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(ref secret) = state.signing_secret {
        let timestamp = header_str(&headers, TIMESTAMP_HEADER).unwrap_or("");
        let provided = header_str(&headers, SIGNATURE_HEADER).unwrap_or("");
        if let Err(e) = signature::verify(secret, timestamp, provided, &body, unix_now()) {
            log::warn!("rejecting events request: {}", e);
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let metadata = DeliveryMetadata::from_headers(
        header_str(&headers, RETRY_NUM_HEADER),
        header_str(&headers, RETRY_REASON_HEADER),
    );
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("events body is not JSON, acknowledging: {}", e);
            return BridgeResponse::Ack.into_response();
        }
    };

    // Run on its own task so a panic in the pipeline still ends in a 200 diagnostic.
    let task = tokio::spawn(async move {
        let channel = state.slack_client();
        let backend = state.backend_client();
        bridge::handle_delivery(&state.settings, &metadata, payload, &backend, &channel).await
    });
    let response = match task.await {
        Ok(r) => r,
        Err(e) => {
            log::error!("delivery handler aborted: {}", e);
            BridgeResponse::Diagnostic(format!("An error occurred: {}", e))
        }
    };
    response.into_response()
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_map_to_expected_bodies() {
        let res = BridgeResponse::Ack.into_response();
        assert_eq!(res.status(), StatusCode::OK);

        let res = BridgeResponse::Challenge("X".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let res = BridgeResponse::Diagnostic("boom".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn router_accepts_path_without_leading_slash() {
        let mut config = Config::default();
        config.gateway.events_path = "hooks/slack".to_string();
        let _ = router(GatewayState::from_config(config));
    }
}
