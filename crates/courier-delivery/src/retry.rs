//! Bounded retry policy for failed deliveries.
//!
//! A failed message is either re-queued after a fixed delay or dropped
//! permanently once the attempt ceiling is reached. The delay keeps a
//! retry loop from hammering a destination that is likely still down.
//!
//! A single record moves through `Admitted → delivering → {Delivered |
//! Failed→Requeued → delivering | Failed→Dropped}`; the requeue loop runs
//! at most `max_attempts` times before the forced transition to `Dropped`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry policy for failed message deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of delivery attempts before a message is dropped.
    pub max_attempts: u32,

    /// Fixed delay before a failed message is re-queued.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(crate::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Outcome of the retry decision for one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-queue the message after the given delay.
    Requeue {
        /// How long to hold the record before re-enqueueing it
        delay: Duration,
    },
    /// Drop the message permanently.
    Drop {
        /// Why the message is not retried
        reason: String,
    },
}

impl RetryPolicy {
    /// Decides the fate of a message after a failed attempt.
    ///
    /// `attempts` is the failure count after the attempt was recorded.
    /// A record at or past the ceiling must never be re-queued.
    pub fn decide(&self, attempts: u32) -> RetryDecision {
        if attempts >= self.max_attempts {
            RetryDecision::Drop {
                reason: format!("maximum attempts ({}) exhausted", self.max_attempts),
            }
        } else {
            RetryDecision::Requeue { delay: self.delay }
        }
    }
}
