//! Sliding-window retention policy.
//!
//! Capacity is expressed in whole User/Assistant pairs so eviction never
//! strands a lone assistant message: the policy runs only after a turn has
//! appended both halves, and always drops from the oldest end.

use super::store::Message;

/// Bounds the log to the most recent N pairs. `None` disables eviction.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindowPolicy {
    pair_capacity: Option<usize>,
}

impl SlidingWindowPolicy {
    pub fn new(pair_capacity: Option<usize>) -> Self {
        Self { pair_capacity }
    }

    pub fn pair_capacity(&self) -> Option<usize> {
        self.pair_capacity
    }

    /// Maximum messages the window retains, when a capacity is configured.
    pub fn max_messages(&self) -> Option<usize> {
        self.pair_capacity.map(|pairs| pairs * 2)
    }

    /// Applies the window to a log, returning the retained tail and how
    /// many messages were evicted from the head. Idempotent: a compliant
    /// log comes back unchanged with an evicted count of zero.
    pub fn apply(&self, log: &[Message]) -> (Vec<Message>, usize) {
        let Some(max) = self.max_messages() else {
            return (log.to_vec(), 0);
        };
        if log.len() <= max {
            return (log.to_vec(), 0);
        }
        let evicted = log.len() - max;
        tracing::debug!(
            "[SlidingWindowPolicy] Evicting {} oldest messages (window {} pairs)",
            evicted,
            // capacity is Some whenever max is
            self.pair_capacity.unwrap_or_default()
        );
        (log[evicted..].to_vec(), evicted)
    }
}
