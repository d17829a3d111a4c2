//! Communication channels (Slack).
//!
//! `ChannelClient` is the seam the bridge talks through: fetch a thread's messages and post
//! a reply.
//! `SlackClient` implements it over the Slack Web API.

mod client;
mod slack;

pub use client::{ChannelClient, ChannelError, ReplyPayload, ThreadMessage};
pub use slack::SlackClient;
