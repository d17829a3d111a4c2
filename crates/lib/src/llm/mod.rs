//! Chat backend abstraction and HTTP chat-app client.
//!
//! The bridge only needs one blocking call: send a query under a conversation id, get an answer.

mod chat_app;

pub use chat_app::{
    BackendError, ChatAnswer, ChatAppClient, ChatBackend, ChatRequest, ResponseMode,
};
