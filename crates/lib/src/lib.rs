//! Slack bridge core library — configuration, Slack and chat backend clients,
//! the event bridge, and the webhook gateway used by the CLI.

pub mod bridge;
pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
