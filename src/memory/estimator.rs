//! Approximate token accounting.
//!
//! Deliberately crude: roughly 4 characters per token, no real tokenizer.
//! The budget checks tolerate the inaccuracy in exchange for zero
//! dependencies and zero latency.

use super::store::Message;

/// Fixed character-per-token ratio used by the estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimates the token count of a message sequence.
///
/// Sums content lengths in characters and integer-divides by
/// [`CHARS_PER_TOKEN`]. Pure.
pub fn estimate(messages: &[Message]) -> usize {
    let total_chars: usize = messages.iter().map(|m| m.content.chars().count()).sum();
    total_chars / CHARS_PER_TOKEN
}

/// Cumulative token estimate after each message, in log order.
///
/// An empty log yields an empty sequence; callers render that as
/// "nothing to chart", not as an error.
pub fn timeline(messages: &[Message]) -> Vec<usize> {
    let mut chars = 0usize;
    messages
        .iter()
        .map(|m| {
            chars += m.content.chars().count();
            chars / CHARS_PER_TOKEN
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::store::Role;

    fn msg(content: &str) -> Message {
        Message::new(Role::User, content)
    }

    #[test]
    fn test_estimate_divides_chars_by_four() {
        let messages = vec![msg("abcd"), msg("efgh")];
        assert_eq!(estimate(&messages), 2);
    }

    #[test]
    fn test_estimate_truncates() {
        // 7 chars -> 1 token
        assert_eq!(estimate(&[msg("abcdefg")]), 1);
        assert_eq!(estimate(&[msg("abc")]), 0);
    }

    #[test]
    fn test_estimate_counts_characters_not_bytes() {
        // 4 multibyte chars are still 4 chars
        assert_eq!(estimate(&[msg("çãéú")]), 1);
    }

    #[test]
    fn test_estimate_empty_log() {
        assert_eq!(estimate(&[]), 0);
    }

    #[test]
    fn test_appending_nonempty_message_grows_estimate() {
        let mut messages = vec![msg("hello world, this is long enough")];
        let before = estimate(&messages);
        messages.push(msg("another reasonably long message"));
        assert!(estimate(&messages) > before);
    }

    #[test]
    fn test_timeline_is_cumulative() {
        let messages = vec![msg("abcd"), msg("efgh"), msg("ijkl")];
        assert_eq!(timeline(&messages), vec![1, 2, 3]);
    }

    #[test]
    fn test_timeline_empty_log() {
        assert!(timeline(&[]).is_empty());
    }
}
