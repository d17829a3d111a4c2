//! Slack event → chat backend → Slack reply.
//!
//! `handle_delivery` is the whole pipeline for one webhook delivery: retry suppression,
//! classification, context resolution, backend call, reply. It holds no state between calls
//! and always produces a `BridgeResponse`; the gateway turns every one of them into HTTP 200.

mod classify;
mod context;
mod dispatch;
mod layout;
mod retry;

#[cfg(test)]
mod fakes;

pub use classify::{classify, strip_mention, InboundEvent, MessageEvent, DM_CHANNEL_PREFIX};
pub use context::{
    history_transcript, resolve_context, thread_turns, ConversationContext, ConversationKey,
    Surface, ThreadTurn, TurnRole,
};
pub use dispatch::{dispatch_reply, APOLOGY_TEXT};
pub use layout::RichLayout;
pub use retry::{should_suppress, DeliveryMetadata, TIMEOUT_RETRY_REASON};

use crate::channels::ChannelClient;
use crate::config::Config;
use crate::llm::ChatBackend;

/// Per-delivery settings taken from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub allow_retry: bool,
    pub app_id: String,
    pub user: String,
    pub forward_thread_history: bool,
}

impl BridgeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allow_retry: config.slack.allow_retry,
            app_id: config.backend.app_id.clone(),
            user: config.backend.user.clone(),
            forward_thread_history: config.backend.forward_thread_history,
        }
    }
}

/// Terminal action of one delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeResponse {
    /// Plain `ok`: suppressed, ignored, or bot echo.
    Ack,
    /// `{"challenge": token}` for URL verification.
    Challenge(String),
    /// Receipt of the posted reply.
    Posted(serde_json::Value),
    /// Plain-text description of a failure that did not reach the channel.
    Diagnostic(String),
}

/// Handle one decoded delivery. At most one backend invocation per call.
pub async fn handle_delivery(
    settings: &BridgeSettings,
    metadata: &DeliveryMetadata,
    payload: serde_json::Value,
    backend: &dyn ChatBackend,
    channel: &dyn ChannelClient,
) -> BridgeResponse {
    if should_suppress(metadata, settings.allow_retry) {
        log::debug!(
            "suppressing redelivery (count {:?}, reason {:?})",
            metadata.retry_count,
            metadata.retry_reason
        );
        return BridgeResponse::Ack;
    }

    let (surface, event) = match classify(payload) {
        InboundEvent::Verification { challenge } => return BridgeResponse::Challenge(challenge),
        InboundEvent::Mention(event) => (Surface::Mention, event),
        InboundEvent::DirectMessage(event) => (Surface::DirectMessage, event),
        InboundEvent::BotEcho => {
            log::debug!("ignoring bot-authored message");
            return BridgeResponse::Ack;
        }
        InboundEvent::Other => {
            log::debug!("ignoring unhandled event");
            return BridgeResponse::Ack;
        }
    };

    let context = resolve_context(channel, surface, &event).await;
    log::info!(
        "answering {} ({} prior turn(s))",
        context.key,
        context.history.len()
    );
    dispatch_reply(settings, backend, channel, surface, event, context).await
}
