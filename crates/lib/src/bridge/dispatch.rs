//! Invoke the chat backend and deliver its answer (or an apology) back to the channel.

use crate::bridge::classify::MessageEvent;
use crate::bridge::context::{history_transcript, ConversationContext, Surface};
use crate::bridge::{BridgeResponse, BridgeSettings};
use crate::channels::{ChannelClient, ChannelError, ReplyPayload};
use crate::llm::{ChatBackend, ChatRequest, ResponseMode};

/// Posted to the user when the backend call fails.
pub const APOLOGY_TEXT: &str =
    "Sorry, I'm having trouble processing your request. Please try again later.";

fn build_request(
    settings: &BridgeSettings,
    query: &str,
    context: &ConversationContext,
) -> ChatRequest {
    let mut inputs = serde_json::Map::new();
    if settings.forward_thread_history && !context.history.is_empty() {
        inputs.insert(
            "thread_history".to_string(),
            serde_json::Value::String(history_transcript(&context.history)),
        );
    }
    ChatRequest {
        app_id: settings.app_id.clone(),
        query: query.to_string(),
        inputs,
        conversation_id: context.key.to_string(),
        response_mode: ResponseMode::Blocking,
        user: settings.user.clone(),
    }
}

/// Ask the backend once and reply in (channel, reply thread).
/// Never fails: every outcome is a response body.
pub async fn dispatch_reply(
    settings: &BridgeSettings,
    backend: &dyn ChatBackend,
    channel: &dyn ChannelClient,
    surface: Surface,
    event: MessageEvent,
    context: ConversationContext,
) -> BridgeResponse {
    let request = build_request(settings, &event.text, &context);
    let reply_thread = surface.reply_thread(&event);

    let answer = match backend.invoke(&request).await {
        Ok(a) => a.answer,
        Err(e) => {
            log::warn!("chat backend failed for {}: {}", context.key, e);
            let apology = ReplyPayload {
                channel: event.channel,
                thread_anchor: reply_thread,
                text: APOLOGY_TEXT.to_string(),
                rich_layout: None,
            };
            let fallback: Result<serde_json::Value, ChannelError> = channel.post(&apology).await;
            if let Err(post_err) = fallback {
                log::warn!("posting apology to {} failed: {}", apology.channel, post_err);
            }
            return BridgeResponse::Diagnostic(format!("An error occurred: {}\n{:?}", e, e));
        }
    };

    // A layout without a text slot goes out unchanged.
    let rich_layout = event.rich_layout.map(|mut layout| {
        if !layout.replace_first_text(&answer) {
            log::debug!("reply layout for {} has no text slot, sending as is", context.key);
        }
        layout.into_blocks()
    });
    let reply = ReplyPayload {
        channel: event.channel,
        thread_anchor: reply_thread,
        text: answer,
        rich_layout,
    };
    match channel.post(&reply).await {
        Ok(receipt) => BridgeResponse::Posted(receipt),
        Err(e) => {
            log::warn!("posting reply to {} failed: {}", reply.channel, e);
            BridgeResponse::Diagnostic(format!("Error sending message to Slack: {}", e))
        }
    }
}
