//! Conversation session - stateful chat over a stateless completion API.
//!
//! Information Hiding:
//! - The completion endpoint sits behind an injected [`CompletionBackend`]
//! - Log mutation, eviction and alerting are internalized; callers see
//!   turns, snapshots and advisories
//! - The debug recorder is an optional injected capability

pub mod debug_log;
pub mod transcript;

use crate::config::Settings;
use crate::core::error::{ApiError, ConfigError};
use crate::core::llm::{CompletionBackend, CompletionRequest};
use crate::memory::{
    estimator, Advisory, AlertPolicy, MemoryStore, Message, Role, Severity, SlidingWindowPolicy,
};
use chrono::Local;
use debug_log::{DebugRecorder, TurnStatus};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and friendly assistant.";

/// Everything a successful turn reports back.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub reply: String,
    pub evicted: usize,
    pub advisories: Vec<Advisory>,
}

/// Window occupancy for the debug snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    pub pair_capacity: usize,
    pub pairs_used: usize,
}

/// Ceiling usage for the debug snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CeilingStatus {
    pub token_ceiling: usize,
    pub percent_used: f64,
    pub severity: Severity,
}

/// Debug recorder state for the debug snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RecorderStatus {
    pub log_path: Option<PathBuf>,
    pub interactions: u64,
}

/// Point-in-time view of session memory. Derived on demand from the log,
/// never cached, so it can never go stale.
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub message_count: usize,
    pub pair_count: usize,
    pub estimated_tokens: usize,
    pub window: Option<WindowStatus>,
    pub ceiling: Option<CeilingStatus>,
    pub recorder: Option<RecorderStatus>,
}

/// Multi-turn chat session with bounded, monitored memory.
///
/// Single-owner and not safe for concurrent use: every mutating operation
/// takes `&mut self` for its full duration. Independent sessions share
/// nothing. If the backend future is cancelled mid-turn, the log keeps the
/// already-appended user message; there is no transactional rollback.
pub struct ConversationSession {
    settings: Settings,
    backend: Arc<dyn CompletionBackend>,
    store: MemoryStore,
    window: SlidingWindowPolicy,
    alerts: AlertPolicy,
    system_prompt: String,
    recorder: Option<DebugRecorder>,
}

impl ConversationSession {
    /// Builds a session from validated settings, a completion backend and
    /// an optional debug recorder. Fails with [`ConfigError`] if any
    /// setting is outside its domain; a session is never partially
    /// constructed.
    pub fn new(
        settings: Settings,
        backend: Arc<dyn CompletionBackend>,
        mut recorder: Option<DebugRecorder>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        if let Some(rec) = recorder.as_mut() {
            rec.record_session_start(
                &settings.model,
                settings.temperature,
                settings.max_tokens,
                settings.window_pair_capacity,
                settings.token_ceiling,
            );
        }

        tracing::info!(
            "[ConversationSession] Ready: model={} window={:?} ceiling={:?}",
            settings.model,
            settings.window_pair_capacity,
            settings.token_ceiling
        );

        Ok(Self {
            window: SlidingWindowPolicy::new(settings.window_pair_capacity),
            alerts: AlertPolicy::new(settings.token_ceiling),
            settings,
            backend,
            store: MemoryStore::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            recorder,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Replaces the system prompt wholesale. Never part of the log and
    /// never subject to eviction.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
        if let Some(rec) = self.recorder.as_mut() {
            rec.record_system_prompt_change(&self.system_prompt);
        }
        tracing::debug!("[ConversationSession] System prompt replaced");
    }

    /// One conversational turn. Appends the user message, sends the system
    /// prompt plus the full log to the backend, appends the reply, applies
    /// the sliding window and evaluates token alerts.
    ///
    /// On backend failure the error propagates and the user message stays
    /// in the log (no rollback, by design): the log shows what was
    /// attempted, and the session remains usable for the next turn.
    pub async fn send_turn(&mut self, user_text: &str) -> Result<String, ApiError> {
        Ok(self.send_turn_report(user_text).await?.reply)
    }

    /// Like [`send_turn`](Self::send_turn) but also reports eviction and
    /// advisories so callers can render them.
    pub async fn send_turn_report(&mut self, user_text: &str) -> Result<TurnReport, ApiError> {
        let tokens_before = self.estimated_tokens();
        // Only pay for the history copy when a recorder will consume it.
        let prior_history = self
            .recorder
            .is_some()
            .then(|| self.store.snapshot().to_vec());

        self.store.append(Role::User, user_text);

        let mut outbound = Vec::with_capacity(self.store.len() + 1);
        outbound.push(Message::new(Role::System, self.system_prompt.clone()));
        outbound.extend_from_slice(self.store.snapshot());

        let request = CompletionRequest {
            model: &self.settings.model,
            messages: &outbound,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let reply = self.backend.complete(request).await?;

        self.store.append(Role::Assistant, reply.clone());

        let (kept, evicted) = self.window.apply(self.store.snapshot());
        if evicted > 0 {
            self.store.replace_all(kept);
            tracing::info!(
                "[ConversationSession] Sliding window evicted {} messages",
                evicted
            );
        }

        let tokens_after = self.estimated_tokens();
        let advisories = self.alerts.evaluate(tokens_after, false);

        tracing::debug!(
            "[ConversationSession] Turn complete: tokens {} -> {}, {} advisories",
            tokens_before,
            tokens_after,
            advisories.len()
        );

        if let Some(rec) = self.recorder.as_mut() {
            let status = TurnStatus {
                message_count: self.store.len(),
                pair_count: self.store.len() / 2,
                estimated_tokens: tokens_after,
                window_capacity: self.window.pair_capacity(),
                token_ceiling: self.alerts.token_ceiling(),
                evicted,
                advisories: &advisories,
            };
            rec.record_turn(
                user_text,
                &self.system_prompt,
                &self.settings.model,
                self.settings.temperature,
                self.settings.max_tokens,
                prior_history.as_deref().unwrap_or(&[]),
                &reply,
                status,
            );
        }

        Ok(TurnReport {
            reply,
            evicted,
            advisories,
        })
    }

    /// Empties the log and returns how many messages were removed.
    pub fn clear_history(&mut self) -> usize {
        let removed = self.store.clear();
        if let Some(rec) = self.recorder.as_mut() {
            rec.record_clear(removed);
        }
        tracing::info!("[ConversationSession] History cleared ({} messages)", removed);
        removed
    }

    /// Read-only view of the live log, oldest first.
    pub fn history(&self) -> &[Message] {
        self.store.snapshot()
    }

    /// Current approximate token count of the log.
    pub fn estimated_tokens(&self) -> usize {
        estimator::estimate(self.store.snapshot())
    }

    /// Cumulative token estimate after each message; empty when the log is
    /// empty (nothing to chart, not an error).
    pub fn token_timeline(&self) -> Vec<usize> {
        estimator::timeline(self.store.snapshot())
    }

    /// Structured view of memory state. Pure read.
    pub fn debug_snapshot(&self) -> MemorySnapshot {
        let message_count = self.store.len();
        let pair_count = message_count / 2;
        let estimated_tokens = self.estimated_tokens();

        let window = self.window.pair_capacity().map(|capacity| WindowStatus {
            pair_capacity: capacity,
            pairs_used: pair_count.min(capacity),
        });

        let ceiling = self.alerts.token_ceiling().and_then(|token_ceiling| {
            let percent_used = self.alerts.percent_used(estimated_tokens)?;
            let severity = self.alerts.classify(estimated_tokens)?;
            Some(CeilingStatus {
                token_ceiling,
                percent_used,
                severity,
            })
        });

        let recorder = self.recorder.as_ref().map(|rec| RecorderStatus {
            log_path: rec.path().map(PathBuf::from),
            interactions: rec.interactions(),
        });

        MemorySnapshot {
            message_count,
            pair_count,
            estimated_tokens,
            window,
            ceiling,
            recorder,
        }
    }

    /// Serializes the log to the given sink in the transcript format,
    /// stamped with the current local time.
    pub fn export_transcript(&self, sink: &mut dyn Write) -> io::Result<()> {
        transcript::write_transcript(
            sink,
            self.store.snapshot(),
            &self.settings.model,
            Local::now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend double: scripted replies, records every request it sees.
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<String, ()>>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, ()>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn with_reply(reply: &str) -> Self {
            Self::new(vec![Ok(reply.to_string()); 16])
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ApiError> {
            self.seen.lock().unwrap().push(request.messages.to_vec());
            match self.replies.lock().unwrap().remove(0) {
                Ok(reply) => Ok(reply),
                Err(()) => Err(ApiError::EmptyResponse),
            }
        }
    }

    fn settings() -> Settings {
        Settings {
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            window_pair_capacity: None,
            token_ceiling: None,
            debug_mode: false,
            base_url: None,
        }
    }

    fn session_with(
        settings: Settings,
        backend: Arc<dyn CompletionBackend>,
    ) -> ConversationSession {
        ConversationSession::new(settings, backend, None).unwrap()
    }

    #[test]
    fn test_invalid_settings_rejected_at_construction() {
        let mut bad = settings();
        bad.temperature = 3.0;
        let backend = Arc::new(ScriptedBackend::with_reply("hi"));
        assert!(ConversationSession::new(bad, backend, None).is_err());
    }

    #[tokio::test]
    async fn test_turn_appends_user_then_assistant() {
        let backend = Arc::new(ScriptedBackend::with_reply("hello back"));
        let mut session = session_with(settings(), backend);

        let reply = session.send_turn("hello").await.unwrap();

        assert_eq!(reply, "hello back");
        let log = session.history();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, Role::User);
        assert_eq!(log[0].content, "hello");
        assert_eq!(log[1].role, Role::Assistant);
        assert_eq!(log[1].content, "hello back");
    }

    #[tokio::test]
    async fn test_outbound_request_has_system_prompt_then_full_log() {
        let backend = Arc::new(ScriptedBackend::with_reply("ok"));
        let mut session = session_with(settings(), backend.clone());
        session.set_system_prompt("You are terse.");

        session.send_turn("one").await.unwrap();
        session.send_turn("two").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second[0].role, Role::System);
        assert_eq!(second[0].content, "You are terse.");
        // full log after appending the new user message
        assert_eq!(second.len(), 4);
        assert_eq!(second[1].content, "one");
        assert_eq!(second[3].content, "two");
    }

    #[tokio::test]
    async fn test_failed_call_keeps_user_message_no_assistant() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(())]));
        let mut session = session_with(settings(), backend);

        let before = session.history().len();
        let result = session.send_turn("doomed").await;

        assert!(result.is_err());
        let log = session.history();
        assert_eq!(log.len(), before + 1);
        assert_eq!(log.last().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_session_usable_after_failed_turn() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(()), Ok("recovered".to_string())]));
        let mut session = session_with(settings(), backend);

        assert!(session.send_turn("first").await.is_err());
        let reply = session.send_turn("second").await.unwrap();
        assert_eq!(reply, "recovered");
    }

    #[tokio::test]
    async fn test_window_bounds_log_after_turn() {
        let mut config = settings();
        config.window_pair_capacity = Some(3);
        let backend = Arc::new(ScriptedBackend::with_reply("a"));
        let mut session = session_with(config, backend);

        for i in 1..=5 {
            session.send_turn(&format!("turn {}", i)).await.unwrap();
        }

        let log = session.history();
        assert_eq!(log.len(), 6);
        // turns 1-2 evicted, 3-5 retained
        assert_eq!(log[0].content, "turn 3");
        assert_eq!(log[2].content, "turn 4");
        assert_eq!(log[4].content, "turn 5");
    }

    #[tokio::test]
    async fn test_turn_report_surfaces_eviction_and_advisories() {
        let mut config = settings();
        config.window_pair_capacity = Some(1);
        config.token_ceiling = Some(10);
        let backend = Arc::new(ScriptedBackend::with_reply(
            "a long answer that certainly exceeds forty characters of text",
        ));
        let mut session = session_with(config, backend);

        session.send_turn("first question").await.unwrap();
        let report = session.send_turn_report("second question").await.unwrap();

        assert_eq!(report.evicted, 2);
        assert_eq!(report.advisories.len(), 1);
        assert_eq!(report.advisories[0].severity, Severity::Red);
    }

    #[tokio::test]
    async fn test_clear_resets_log_and_tokens() {
        let backend = Arc::new(ScriptedBackend::with_reply("some reply text"));
        let mut session = session_with(settings(), backend);

        session.send_turn("a question long enough to count").await.unwrap();
        assert!(session.estimated_tokens() > 0);

        let removed = session.clear_history();
        assert_eq!(removed, 2);
        assert!(session.history().is_empty());
        assert_eq!(session.estimated_tokens(), 0);
    }

    #[tokio::test]
    async fn test_token_timeline_tracks_log() {
        let backend = Arc::new(ScriptedBackend::with_reply("12345678"));
        let mut session = session_with(settings(), backend);

        assert!(session.token_timeline().is_empty());

        session.send_turn("abcd").await.unwrap();
        let timeline = session.token_timeline();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0], 1);
        assert_eq!(timeline[1], 3);
    }

    #[tokio::test]
    async fn test_debug_snapshot_reflects_config() {
        let mut config = settings();
        config.window_pair_capacity = Some(4);
        config.token_ceiling = Some(400);
        let backend = Arc::new(ScriptedBackend::with_reply("short"));
        let mut session = session_with(config, backend);

        session.send_turn("hello there friend").await.unwrap();

        let snap = session.debug_snapshot();
        assert_eq!(snap.message_count, 2);
        assert_eq!(snap.pair_count, 1);
        let window = snap.window.unwrap();
        assert_eq!(window.pair_capacity, 4);
        assert_eq!(window.pairs_used, 1);
        let ceiling = snap.ceiling.unwrap();
        assert_eq!(ceiling.token_ceiling, 400);
        assert_eq!(ceiling.severity, Severity::Green);
        assert!(snap.recorder.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_without_optional_features() {
        let backend = Arc::new(ScriptedBackend::with_reply("x"));
        let session = session_with(settings(), backend);
        let snap = session.debug_snapshot();
        assert!(snap.window.is_none());
        assert!(snap.ceiling.is_none());
        assert_eq!(snap.estimated_tokens, 0);
    }

    #[tokio::test]
    async fn test_debug_recorder_sees_turns_and_clears() {
        use debug_log::test_support::BufferSink;

        let sink = BufferSink::default();
        let blocks = sink.blocks.clone();
        let recorder = DebugRecorder::new(Box::new(sink), None);

        let backend = Arc::new(ScriptedBackend::with_reply("reply"));
        let mut session =
            ConversationSession::new(settings(), backend, Some(recorder)).unwrap();

        session.set_system_prompt("be nice");
        session.send_turn("hi").await.unwrap();
        session.clear_history();

        let blocks = blocks.lock().unwrap();
        // header, prompt change, turn, clear
        assert_eq!(blocks.len(), 4);
        assert!(blocks[0].contains("SESSION STARTED"));
        assert!(blocks[1].contains("SYSTEM PROMPT CHANGED"));
        assert!(blocks[2].contains("INTERACTION 1"));
        assert!(blocks[3].contains("HISTORY CLEARED"));
    }

    #[tokio::test]
    async fn test_export_transcript_contains_log() {
        let backend = Arc::new(ScriptedBackend::with_reply("the answer"));
        let mut session = session_with(settings(), backend);
        session.send_turn("the question").await.unwrap();

        let mut out = Vec::new();
        session.export_transcript(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Model: gpt-4o-mini"));
        assert!(text.contains("YOU:\nthe question"));
        assert!(text.contains("ASSISTANT:\nthe answer"));
    }
}
