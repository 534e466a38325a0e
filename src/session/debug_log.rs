//! Append-only debug log for a session.
//!
//! Information Hiding:
//! - The sink is an injected capability, never a global; tests use an
//!   in-memory double instead of touching the filesystem.
//! - Block formatting is internal to the recorder; the session only hands
//!   over the state for each event.
//!
//! A sink write failure is logged as a warning and never fails the turn.

use crate::memory::{Advisory, Message};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Maximum characters of prior-history content reproduced per message.
const HISTORY_TRUNCATE_CHARS: usize = 80;

/// Where debug blocks go. Append-only; blocks are never rewritten.
pub trait DebugSink: Send {
    fn append(&mut self, block: &str) -> io::Result<()>;
}

/// Appends blocks to a log file on disk.
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Conventional log path: `chat_debug_YYYYMMDD_HHMMSS.log` in the
    /// working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(format!(
            "chat_debug_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    }
}

impl DebugSink for FileSink {
    fn append(&mut self, block: &str) -> io::Result<()> {
        self.file.write_all(block.as_bytes())?;
        self.file.flush()
    }
}

/// Post-turn memory status, as recorded in each interaction block.
#[derive(Debug, Clone)]
pub struct TurnStatus<'a> {
    pub message_count: usize,
    pub pair_count: usize,
    pub estimated_tokens: usize,
    pub window_capacity: Option<usize>,
    pub token_ceiling: Option<usize>,
    pub evicted: usize,
    pub advisories: &'a [Advisory],
}

/// Structured session log. One header block at creation, then one block
/// per recorded event, in order.
pub struct DebugRecorder {
    sink: Box<dyn DebugSink>,
    path: Option<PathBuf>,
    interactions: u64,
}

impl DebugRecorder {
    pub fn new(sink: Box<dyn DebugSink>, path: Option<PathBuf>) -> Self {
        Self {
            sink,
            path,
            interactions: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Interactions recorded so far.
    pub fn interactions(&self) -> u64 {
        self.interactions
    }

    fn write(&mut self, block: String) {
        if let Err(e) = self.sink.append(&block) {
            tracing::warn!("[DebugRecorder] Failed to write debug block: {}", e);
        }
    }

    /// Config summary written once when the session comes up.
    pub fn record_session_start(
        &mut self,
        model: &str,
        temperature: f32,
        max_tokens: u32,
        window_capacity: Option<usize>,
        token_ceiling: Option<usize>,
    ) {
        let mut block = String::new();
        block.push_str(&"=".repeat(60));
        block.push('\n');
        block.push_str(&format!("SESSION STARTED: {}\n", Local::now()));
        block.push_str(&format!("Model: {}\n", model));
        block.push_str(&format!("Temperature: {}\n", temperature));
        block.push_str(&format!("Max tokens: {}\n", max_tokens));
        block.push_str(&format!(
            "Sliding window: {}\n",
            match window_capacity {
                Some(pairs) => format!("{} pairs", pairs),
                None => "disabled".to_string(),
            }
        ));
        block.push_str(&format!(
            "Token ceiling: {}\n",
            match token_ceiling {
                Some(ceiling) => ceiling.to_string(),
                None => "disabled".to_string(),
            }
        ));
        block.push_str(&"=".repeat(60));
        block.push_str("\n\n");
        self.write(block);
    }

    /// One block per completed turn: who said what, the state the call was
    /// made with, and where memory ended up.
    #[allow(clippy::too_many_arguments)]
    pub fn record_turn(
        &mut self,
        user_text: &str,
        system_prompt: &str,
        model: &str,
        temperature: f32,
        max_tokens: u32,
        prior_history: &[Message],
        response: &str,
        status: TurnStatus<'_>,
    ) {
        self.interactions += 1;

        let mut block = String::new();
        block.push_str(&format!(
            "--- INTERACTION {} [{}] ---\n",
            self.interactions,
            Local::now()
        ));
        block.push_str(&format!("User: {}\n", user_text));
        block.push_str(&format!("System prompt: {}\n", system_prompt));
        block.push_str(&format!(
            "Parameters: model={} temperature={} max_tokens={}\n",
            model, temperature, max_tokens
        ));

        block.push_str(&format!("Prior history ({} messages):\n", prior_history.len()));
        for (i, msg) in prior_history.iter().enumerate() {
            block.push_str(&format!(
                "  [{}] {}: {}\n",
                i + 1,
                msg.role.label(),
                truncate(&msg.content, HISTORY_TRUNCATE_CHARS)
            ));
        }

        block.push_str(&format!("Response: {}\n", response));
        block.push_str(&format!(
            "Memory status: {} messages ({} pairs), ~{} tokens\n",
            status.message_count, status.pair_count, status.estimated_tokens
        ));
        if let Some(capacity) = status.window_capacity {
            block.push_str(&format!(
                "Window: {}/{} pairs used\n",
                status.pair_count.min(capacity),
                capacity
            ));
        }
        if let Some(ceiling) = status.token_ceiling {
            block.push_str(&format!(
                "Ceiling: {}/{} tokens\n",
                status.estimated_tokens, ceiling
            ));
        }
        if status.evicted > 0 {
            block.push_str(&format!(
                "Action: sliding window evicted {} messages\n",
                status.evicted
            ));
        }
        for advisory in status.advisories {
            block.push_str(&format!("Advisory: {}\n", advisory.message));
            if let Some(remediation) = &advisory.remediation {
                block.push_str(&format!("  Suggestion: {}\n", remediation));
            }
        }
        block.push('\n');
        self.write(block);
    }

    pub fn record_system_prompt_change(&mut self, prompt: &str) {
        self.write(format!(
            "--- SYSTEM PROMPT CHANGED [{}] ---\n{}\n\n",
            Local::now(),
            prompt
        ));
    }

    pub fn record_clear(&mut self, removed: usize) {
        self.write(format!(
            "--- HISTORY CLEARED [{}] --- {} messages removed\n\n",
            Local::now(),
            removed
        ));
    }
}

fn truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DebugSink;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Captures blocks in memory for assertions.
    #[derive(Clone, Default)]
    pub struct BufferSink {
        pub blocks: Arc<Mutex<Vec<String>>>,
    }

    impl DebugSink for BufferSink {
        fn append(&mut self, block: &str) -> io::Result<()> {
            self.blocks.lock().unwrap().push(block.to_string());
            Ok(())
        }
    }
}
