//! Recording collaborators for bridge tests.

use crate::channels::{ChannelClient, ChannelError, ReplyPayload, ThreadMessage};
use crate::llm::{BackendError, ChatAnswer, ChatBackend, ChatRequest};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// Backend that answers with a fixed text, or fails when `answer` is None.
pub struct FakeBackend {
    pub answer: Option<String>,
    pub calls: Mutex<Vec<ChatRequest>>,
}

impl FakeBackend {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn invoke(&self, request: &ChatRequest) -> Result<ChatAnswer, BackendError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.answer {
            Some(a) => Ok(ChatAnswer { answer: a.clone() }),
            None => Err(BackendError::Api("500 upstream exploded".to_string())),
        }
    }
}

/// Channel with a canned thread; posts succeed unless `post_fails`.
pub struct FakeChannel {
    pub thread: Option<Vec<ThreadMessage>>,
    pub post_fails: bool,
    pub fetches: Mutex<Vec<(String, String)>>,
    pub posts: Mutex<Vec<ReplyPayload>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            thread: Some(Vec::new()),
            post_fails: false,
            fetches: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_posts() -> Self {
        Self {
            post_fails: true,
            ..Self::new()
        }
    }

    pub fn posts(&self) -> Vec<ReplyPayload> {
        self.posts.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelClient for FakeChannel {
    async fn fetch_thread(
        &self,
        channel: &str,
        thread_anchor: &str,
    ) -> Result<Vec<ThreadMessage>, ChannelError> {
        self.fetches
            .lock()
            .unwrap()
            .push((channel.to_string(), thread_anchor.to_string()));
        self.thread
            .clone()
            .ok_or_else(|| ChannelError::Api("missing_scope".to_string()))
    }

    async fn post(&self, reply: &ReplyPayload) -> Result<serde_json::Value, ChannelError> {
        self.posts.lock().unwrap().push(reply.clone());
        if self.post_fails {
            return Err(ChannelError::Api("chat.postMessage failed: not_in_channel".to_string()));
        }
        Ok(json!({ "ok": true, "channel": reply.channel, "ts": "999.1" }))
    }
}
