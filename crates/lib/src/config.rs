//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.slack-bridge/config.json`) and environment.
//! Secrets (bot token, signing secret, backend API key) may come from env instead of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Slack app settings (bot token, signing secret, retry policy).
    #[serde(default)]
    pub slack: SlackConfig,

    /// Chat backend the queries are forwarded to.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Gateway bind, port, and events path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Path Slack posts Events API deliveries to (default "/slack/events").
    #[serde(default = "default_events_path")]
    pub events_path: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_events_path() -> String {
    "/slack/events".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            events_path: default_events_path(),
        }
    }
}

/// Slack app config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// Bot user OAuth token (xoxb-...). Overridden by SLACK_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Signing secret for X-Slack-Signature verification. Overridden by SLACK_SIGNING_SECRET.
    /// When absent, requests are not verified.
    pub signing_secret: Option<String>,
    /// When false (default), redeliveries (X-Slack-Retry-Num > 0 or reason http_timeout)
    /// are acknowledged without processing.
    #[serde(default)]
    pub allow_retry: bool,
    /// Web API base URL. Overridden by SLACK_API_BASE (used by tests and proxies).
    pub api_base: Option<String>,
}

/// Chat backend config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// API root, e.g. "http://127.0.0.1:5001/v1".
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Bearer key for the chat app. Overridden by CHAT_BACKEND_API_KEY.
    pub api_key: Option<String>,
    /// App identity passed with every invocation.
    #[serde(default)]
    pub app_id: String,
    /// User identity reported to the backend for every Slack user.
    #[serde(default = "default_backend_user")]
    pub user: String,
    /// When true, the fetched thread transcript is sent as `inputs.thread_history`.
    #[serde(default)]
    pub forward_thread_history: bool,
}

fn default_backend_base_url() -> String {
    "http://127.0.0.1:5001/v1".to_string()
}

fn default_backend_user() -> String {
    "slack-user".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            api_key: None,
            app_id: String::new(),
            user: default_backend_user(),
            forward_thread_history: false,
        }
    }
}

/// Env value wins when set and non-blank; otherwise the trimmed, non-empty config value.
fn env_or_config(env_key: &str, configured: Option<&String>) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the Slack bot token: env SLACK_BOT_TOKEN overrides config.
pub fn resolve_bot_token(config: &Config) -> Option<String> {
    env_or_config("SLACK_BOT_TOKEN", config.slack.bot_token.as_ref())
}

/// Resolve the Slack signing secret: env SLACK_SIGNING_SECRET overrides config.
pub fn resolve_signing_secret(config: &Config) -> Option<String> {
    env_or_config("SLACK_SIGNING_SECRET", config.slack.signing_secret.as_ref())
}

/// Resolve the Slack Web API base: env SLACK_API_BASE, then config, then slack.com.
pub fn resolve_slack_api_base(config: &Config) -> Option<String> {
    env_or_config("SLACK_API_BASE", config.slack.api_base.as_ref())
}

/// Resolve the chat backend API key: env CHAT_BACKEND_API_KEY overrides config.
pub fn resolve_backend_api_key(config: &Config) -> Option<String> {
    env_or_config("CHAT_BACKEND_API_KEY", config.backend.api_key.as_ref())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SLACK_BRIDGE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".slack-bridge").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or SLACK_BRIDGE_CONFIG_PATH).
/// Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
