//! Memochat - terminal chat client with conversation memory
//!
//! A completion endpoint is stateless per call; this library reconstructs
//! the conversation client-side by resending prior turns on every request,
//! and manages that context: sliding-window eviction, approximate token
//! budgeting with severity alerts, debug snapshots and transcript export.

pub mod cli;
pub mod config;
pub mod core;
pub mod memory;
pub mod session;
pub mod utils;

pub use crate::config::Settings;
pub use crate::core::error::{ApiError, ConfigError};
pub use crate::core::llm::{CompletionBackend, CompletionRequest, OpenAiClient};
pub use crate::memory::{
    Advisory, AlertPolicy, MemoryStore, Message, Role, Severity, SlidingWindowPolicy,
};
pub use crate::session::debug_log::{DebugRecorder, DebugSink, FileSink};
pub use crate::session::{ConversationSession, MemorySnapshot, TurnReport};

use std::sync::Arc;

/// Builds a ready session from settings: a real OpenAI-compatible backend
/// plus, when `debug_mode` is set, a file-backed debug recorder.
pub fn session_from_settings(settings: Settings) -> anyhow::Result<ConversationSession> {
    let backend = Arc::new(OpenAiClient::new(
        settings.api_key.clone(),
        settings.base_url.clone(),
    ));

    let recorder = if settings.debug_mode {
        let path = FileSink::default_path();
        let sink = FileSink::create(&path)?;
        Some(DebugRecorder::new(Box::new(sink), Some(path)))
    } else {
        None
    };

    Ok(ConversationSession::new(settings, backend, recorder)?)
}
