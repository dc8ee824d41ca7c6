//! In-memory delivery queue with snapshot-and-empty draining.
//!
//! The queue is the only shared mutable state in the relay. Admission and
//! the retry path append; the drain loop removes. Removal transfers sole
//! ownership of each record, so two overlapping drain invocations can
//! never hand the same message to two delivery tasks.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use thiserror::Error;

use crate::message::Message;

/// Admission was rejected because the queue is at its configured bound.
#[derive(Debug, Clone, Error)]
#[error("queue at capacity ({capacity} messages)")]
pub struct QueueFull {
    /// The configured capacity that was reached.
    pub capacity: usize,
}

/// Mutex-guarded FIFO of pending message records.
///
/// FIFO for admission order, but not for retry order: retried messages
/// are appended to the back and interleave with newer arrivals. Unbounded
/// by default; an optional capacity bound can be set as a hardening
/// option, applying to admissions only.
#[derive(Debug, Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<Message>>,
    capacity: Option<usize>,
}

impl MessageQueue {
    /// Creates an unbounded queue.
    pub fn unbounded() -> Self {
        Self { inner: Mutex::new(VecDeque::new()), capacity: None }
    }

    /// Creates a queue that rejects admissions beyond `capacity`.
    pub fn bounded(capacity: usize) -> Self {
        Self { inner: Mutex::new(VecDeque::new()), capacity: Some(capacity) }
    }

    /// Appends a newly admitted message.
    ///
    /// # Errors
    ///
    /// Returns `QueueFull` when a capacity bound is configured and the
    /// queue already holds that many messages.
    pub fn push(&self, message: Message) -> Result<(), QueueFull> {
        let mut pending = self.lock();

        if let Some(capacity) = self.capacity {
            if pending.len() >= capacity {
                return Err(QueueFull { capacity });
            }
        }

        pending.push_back(message);
        Ok(())
    }

    /// Re-appends a message whose delivery attempt failed.
    ///
    /// The retry path is exempt from the capacity bound: a record already
    /// admitted keeps its place until delivered or dropped.
    pub fn requeue(&self, message: Message) {
        self.lock().push_back(message);
    }

    /// Removes and returns every message currently queued.
    ///
    /// A drain is a snapshot-and-empty operation: messages pushed after
    /// the snapshot is taken stay queued for the next drain.
    pub fn drain(&self) -> Vec<Message> {
        self.lock().drain(..).collect()
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Message>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
