//! Gateway: HTTP server for the Slack Events API.
//!
//! Single port serves the events webhook and a health probe. Every delivery gets its own
//! Slack and backend client handles; nothing is shared between requests but read-only config.

mod server;
mod signature;

pub use server::{router, run_gateway, GatewayState};
pub use signature::{sign, verify, SignatureError, MAX_CLOCK_SKEW_SECS};
