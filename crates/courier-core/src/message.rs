//! Message records and strongly-typed identifiers.
//!
//! A message record is created on admission, carries the raw inbound
//! payload and credential, and tracks how many delivery attempts have
//! failed. Records live only in memory and are dropped after a successful
//! delivery or once the attempt ceiling is reached.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Strongly-typed message identifier.
///
/// Wraps a UUID to prevent mixing with other ID types. Assigned once at
/// admission and used to correlate log lines across delivery attempts.
///
/// # Example
///
/// ```
/// use courier_core::message::MessageId;
/// let message_id = MessageId::new();
/// println!("admitted message: {}", message_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Creates a new random message ID.
    ///
    /// Uses UUID v4 for collision-resistant identifiers without
    /// coordination.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MessageId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A queued message awaiting delivery to a downstream consumer.
///
/// The payload bytes are forwarded downstream exactly as received; the
/// relay never re-serializes them. The credential is carried verbatim on
/// every attempt. A record is handed to at most one in-flight delivery
/// task at a time, so `attempts` is never mutated concurrently.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique identifier assigned at admission.
    pub id: MessageId,

    /// Raw inbound payload, delivered downstream byte-for-byte.
    pub body: Bytes,

    /// Raw `Authorization` value supplied by the original caller.
    pub auth_header: String,

    /// Number of failed delivery attempts so far.
    pub attempts: u32,

    /// When the message was admitted.
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new message record with a fresh ID and zero attempts.
    pub fn new(body: Bytes, auth_header: String) -> Self {
        Self { id: MessageId::new(), body, auth_header, attempts: 0, received_at: Utc::now() }
    }

    /// Records a failed delivery attempt and returns the new count.
    ///
    /// The counter is monotonically non-decreasing over a record's
    /// lifetime.
    pub fn record_failure(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_starts_with_zero_attempts() {
        let message = Message::new(Bytes::from_static(b"{}"), "Bearer abc".to_string());
        assert_eq!(message.attempts, 0);
        assert_eq!(message.auth_header, "Bearer abc");
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::new(Bytes::new(), String::new());
        let b = Message::new(Bytes::new(), String::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn record_failure_increments_monotonically() {
        let mut message = Message::new(Bytes::new(), String::new());

        assert_eq!(message.record_failure(), 1);
        assert_eq!(message.record_failure(), 2);
        assert_eq!(message.record_failure(), 3);
        assert_eq!(message.attempts, 3);
    }

    #[test]
    fn payload_bytes_are_preserved() {
        let raw = Bytes::from_static(b"{\"type\":\"task\",\"x\":1}");
        let message = Message::new(raw.clone(), "Bearer abc".to_string());
        assert_eq!(message.body, raw);
    }

    #[test]
    fn message_id_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        let id = MessageId::from(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }
}
