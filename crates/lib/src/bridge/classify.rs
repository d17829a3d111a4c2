//! Decode an Events API payload and route it to exactly one `InboundEvent`.
//!
//! Decoding is lenient: missing or null fields become empty defaults, and a payload that does not
//! decode at all is `Other`. Nothing past this module deals with raw JSON shapes.

use crate::bridge::layout::RichLayout;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Slack DM channel ids start with this character.
pub const DM_CHANNEL_PREFIX: char = 'D';

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Envelope {
    #[serde(rename = "url_verification")]
    UrlVerification {
        #[serde(default, deserialize_with = "lenient_string")]
        challenge: String,
    },
    #[serde(rename = "event_callback")]
    EventCallback {
        #[serde(default)]
        event: Option<RawEvent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEvent {
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    kind: String,
    #[serde(deserialize_with = "lenient_string")]
    channel: String,
    #[serde(deserialize_with = "lenient_string")]
    text: String,
    #[serde(deserialize_with = "lenient_string")]
    ts: String,
    thread_ts: Option<String>,
    bot_id: Option<String>,
    subtype: Option<String>,
    blocks: Option<Vec<Value>>,
}

/// Strings, numbers, and null all decode; anything else becomes "".
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

impl RawEvent {
    fn is_bot_origin(&self) -> bool {
        self.bot_id.as_deref().is_some_and(|id| !id.is_empty())
            || self.subtype.as_deref() == Some("bot_message")
    }
}

/// A user message the bridge answers (mention or DM).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub channel: String,
    /// Query text (mention token already stripped for mentions).
    pub text: String,
    pub ts: String,
    /// Root of the thread the message was posted in, if it was in one.
    pub thread_ts: Option<String>,
    pub rich_layout: Option<RichLayout>,
}

impl MessageEvent {
    /// Thread root if threaded, else the message's own ts. None only when both are empty.
    pub fn thread_anchor(&self) -> Option<&str> {
        self.thread_ts
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.ts.as_str()).filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// URL verification handshake; the token must be echoed back.
    Verification { challenge: String },
    /// `app_mention`.
    Mention(MessageEvent),
    /// `message` in a DM channel from a human.
    DirectMessage(MessageEvent),
    /// `message` authored by a bot (ours included). Never answered.
    BotEcho,
    /// Anything else: non-DM messages, other event types, unknown payloads.
    Other,
}

/// Remove a leading `<@U123> ` mention token. Text without the token is returned as is.
pub fn strip_mention(text: &str) -> &str {
    if !text.starts_with("<@") {
        return text;
    }
    match text.split_once("> ") {
        Some((_, rest)) => rest,
        None => text,
    }
}

/// Classify a decoded payload.
pub fn classify(payload: Value) -> InboundEvent {
    let envelope: Envelope = match serde_json::from_value(payload) {
        Ok(e) => e,
        Err(e) => {
            log::debug!("payload not recognized: {}", e);
            return InboundEvent::Other;
        }
    };
    match envelope {
        Envelope::UrlVerification { challenge } => InboundEvent::Verification { challenge },
        Envelope::EventCallback { event: Some(event) } => classify_event(event),
        Envelope::EventCallback { event: None } | Envelope::Other => InboundEvent::Other,
    }
}

fn classify_event(event: RawEvent) -> InboundEvent {
    match event.kind.as_str() {
        "app_mention" => {
            let mut rich_layout = RichLayout::from_blocks(event.blocks);
            if let Some(layout) = rich_layout.as_mut() {
                layout.strip_leading_mention();
            }
            InboundEvent::Mention(MessageEvent {
                text: strip_mention(&event.text).to_string(),
                channel: event.channel,
                ts: event.ts,
                thread_ts: event.thread_ts,
                rich_layout,
            })
        }
        "message" => {
            if event.is_bot_origin() {
                return InboundEvent::BotEcho;
            }
            if !event.channel.starts_with(DM_CHANNEL_PREFIX) {
                return InboundEvent::Other;
            }
            InboundEvent::DirectMessage(MessageEvent {
                channel: event.channel,
                text: event.text,
                ts: event.ts,
                thread_ts: event.thread_ts,
                rich_layout: None,
            })
        }
        _ => InboundEvent::Other,
    }
}
