//! Token-budget alerting.
//!
//! Classifies the current token estimate against an optional ceiling into
//! four severity bands and produces typed advisory records. Advisories are
//! informational values returned alongside normal results, never errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Usage severity relative to the configured ceiling.
///
/// "No ceiling configured" is represented as `None` at the
/// [`AlertPolicy::classify`] seam rather than as a fifth variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Green,
    Yellow,
    Orange,
    Red,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Green => "GREEN",
            Severity::Yellow => "YELLOW",
            Severity::Orange => "ORANGE",
            Severity::Red => "RED",
        };
        f.write_str(name)
    }
}

/// One advisory produced by [`AlertPolicy::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub severity: Severity,
    pub tokens: usize,
    pub percent: f64,
    pub message: String,
    pub remediation: Option<String>,
}

/// Classifies token usage against an optional ceiling. `None` disables
/// all alerting. Pure: no mutation, no I/O.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    token_ceiling: Option<usize>,
}

impl AlertPolicy {
    pub fn new(token_ceiling: Option<usize>) -> Self {
        Self { token_ceiling }
    }

    pub fn token_ceiling(&self) -> Option<usize> {
        self.token_ceiling
    }

    /// Percentage of the ceiling currently used, when configured.
    pub fn percent_used(&self, current_tokens: usize) -> Option<f64> {
        self.token_ceiling
            .map(|ceiling| current_tokens as f64 / ceiling as f64 * 100.0)
    }

    /// Severity band for the current estimate. Bands are lower-closed,
    /// upper-open: [0,33) green, [33,66) yellow, [66,100) orange,
    /// [100,inf) red. Returns `None` when no ceiling is configured.
    pub fn classify(&self, current_tokens: usize) -> Option<Severity> {
        let percent = self.percent_used(current_tokens)?;
        Some(if percent >= 100.0 {
            Severity::Red
        } else if percent >= 66.0 {
            Severity::Orange
        } else if percent >= 33.0 {
            Severity::Yellow
        } else {
            Severity::Green
        })
    }

    /// Advisories for the current estimate. Green is reported only when
    /// `verbose` is set; yellow and above always produce one advisory, and
    /// red carries a remediation suggestion.
    pub fn evaluate(&self, current_tokens: usize, verbose: bool) -> Vec<Advisory> {
        let Some(severity) = self.classify(current_tokens) else {
            return Vec::new();
        };
        // percent_used is Some whenever classify is
        let percent = self.percent_used(current_tokens).unwrap_or_default();

        if severity == Severity::Green && !verbose {
            return Vec::new();
        }

        let message = format!(
            "Token usage {}: {} tokens ({:.1}% of ceiling)",
            severity, current_tokens, percent
        );
        let remediation = (severity == Severity::Red)
            .then(|| "clear history or reduce window capacity".to_string());

        vec![Advisory {
            severity,
            tokens: current_tokens,
            percent,
            message,
            remediation,
        }]
    }
}
