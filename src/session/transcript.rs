//! Plain-text transcript export.
//!
//! Deterministic given the log content and the export time, which is
//! injected so tests can pin the output.

use crate::memory::Message;
use chrono::{DateTime, Local};
use std::io::{self, Write};

/// Writes the transcript to any sink: a header with the export timestamp
/// and model, a separator rule, then each message as a role label line,
/// its content, and a blank line.
pub fn write_transcript(
    sink: &mut dyn Write,
    messages: &[Message],
    model: &str,
    exported_at: DateTime<Local>,
) -> io::Result<()> {
    writeln!(sink, "Conversation exported at: {}", exported_at)?;
    writeln!(sink, "Model: {}", model)?;
    writeln!(sink, "{}", "=".repeat(60))?;
    writeln!(sink)?;

    for msg in messages {
        writeln!(sink, "{}:", msg.role.label())?;
        writeln!(sink, "{}", msg.content)?;
        writeln!(sink)?;
    }

    Ok(())
}

/// Default export filename: `conversation_YYYYMMDD_HHMMSS.txt`.
pub fn default_filename(exported_at: DateTime<Local>) -> String {
    format!("conversation_{}.txt", exported_at.format("%Y%m%d_%H%M%S"))
}
