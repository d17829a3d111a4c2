//! Conversation identity and thread history for a message being answered.

use crate::bridge::classify::MessageEvent;
use crate::channels::{ChannelClient, ThreadMessage};
use std::fmt;

/// How the bot was reached. Keeps mention and DM conversations apart even for equal channel/thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Mention,
    DirectMessage,
}

impl Surface {
    pub fn tag(self) -> &'static str {
        match self {
            Surface::Mention => "slack",
            Surface::DirectMessage => "slack-dm",
        }
    }

    /// Where the reply goes. Mentions always reply in the thread; DMs only when already threaded.
    pub fn reply_thread(self, event: &MessageEvent) -> Option<String> {
        match self {
            Surface::Mention => event.thread_anchor().map(str::to_string),
            Surface::DirectMessage => event.thread_ts.clone().filter(|t| !t.is_empty()),
        }
    }
}

/// Backend conversation id: `{surface}-{channel}-{thread_anchor}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn new(surface: Surface, channel: &str, thread_anchor: Option<&str>) -> Self {
        Self(format!(
            "{}-{}-{}",
            surface.tag(),
            channel,
            thread_anchor.unwrap_or_default()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// A prior message in the thread, tagged by who wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    pub key: ConversationKey,
    pub history: Vec<ThreadTurn>,
}

/// Turn thread messages into history, in platform order, skipping the anchor message itself.
pub fn thread_turns(messages: Vec<ThreadMessage>, thread_anchor: &str) -> Vec<ThreadTurn> {
    messages
        .into_iter()
        .filter(|m| m.ts != thread_anchor)
        .map(|m| ThreadTurn {
            role: if m.is_bot_origin {
                TurnRole::Assistant
            } else {
                TurnRole::User
            },
            content: m.text,
        })
        .collect()
}

/// One `role: content` line per turn.
pub fn history_transcript(history: &[ThreadTurn]) -> String {
    history
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Key the conversation and load thread history. A failed fetch yields empty history.
/// A top-level DM has no thread to read, so nothing is fetched for it.
pub async fn resolve_context(
    channel: &dyn ChannelClient,
    surface: Surface,
    event: &MessageEvent,
) -> ConversationContext {
    let anchor = event.thread_anchor();
    let key = ConversationKey::new(surface, &event.channel, anchor);
    let fetch_anchor = match surface {
        Surface::Mention => anchor,
        Surface::DirectMessage => anchor.filter(|_| surface.reply_thread(event).is_some()),
    };
    let history = match fetch_anchor {
        Some(anchor) => match channel.fetch_thread(&event.channel, anchor).await {
            Ok(messages) => thread_turns(messages, anchor),
            Err(e) => {
                log::warn!(
                    "fetching thread history for {} failed, continuing without it: {}",
                    key,
                    e
                );
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    ConversationContext { key, history }
}
