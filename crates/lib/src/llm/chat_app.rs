//! Chat-app API client (POST {base}/chat-messages, blocking mode).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001/v1";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("chat backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat backend api error: {0}")]
    Api(String),
    #[error("chat backend api key not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Blocking,
}

/// One chat invocation. `inputs` holds app-defined variables;
/// empty unless thread history is forwarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub app_id: String,
    pub query: String,
    pub inputs: serde_json::Map<String, serde_json::Value>,
    pub conversation_id: String,
    pub response_mode: ResponseMode,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatAnswer {
    #[serde(default)]
    pub answer: String,
}

/// Conversational backend: owns conversation state keyed by `conversation_id`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn invoke(&self, request: &ChatRequest) -> Result<ChatAnswer, BackendError>;
}

/// HTTP client for a chat-app API. Built per delivery from config.
#[derive(Clone)]
pub struct ChatAppClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ChatAppClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatBackend for ChatAppClient {
    /// POST /chat-messages — blocking chat completion.
    async fn invoke(&self, request: &ChatRequest) -> Result<ChatAnswer, BackendError> {
        let api_key = self.api_key.as_deref().ok_or(BackendError::NotConfigured)?;
        let url = format!("{}/chat-messages", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::Api(format!("{} {}", status, body)));
        }
        let data: ChatAnswer = res.json().await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_blocking_mode_and_empty_inputs() {
        let req = ChatRequest {
            app_id: "app-1".to_string(),
            query: "hello".to_string(),
            inputs: serde_json::Map::new(),
            conversation_id: "slack-C1-100.1".to_string(),
            response_mode: ResponseMode::Blocking,
            user: "slack-user".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "app_id": "app-1",
                "query": "hello",
                "inputs": {},
                "conversation_id": "slack-C1-100.1",
                "response_mode": "blocking",
                "user": "slack-user",
            })
        );
    }

    #[test]
    fn answer_defaults_to_empty() {
        let a: ChatAnswer = serde_json::from_str(r#"{"conversation_id":"x"}"#).unwrap();
        assert_eq!(a.answer, "");
    }

    #[tokio::test]
    async fn missing_api_key_is_reported() {
        let c = ChatAppClient::new(Some("http://127.0.0.1:9/v1/".to_string()), None);
        assert_eq!(c.base_url, "http://127.0.0.1:9/v1");
        let req = ChatRequest {
            app_id: String::new(),
            query: "q".to_string(),
            inputs: serde_json::Map::new(),
            conversation_id: "k".to_string(),
            response_mode: ResponseMode::Blocking,
            user: "u".to_string(),
        };
        assert!(matches!(
            c.invoke(&req).await.unwrap_err(),
            BackendError::NotConfigured
        ));
    }
}
