//! Execution layer wiring transformers, HTTP and stream converters

mod chat;

pub use chat::{ChatExecutor, HttpChatExecutor};
