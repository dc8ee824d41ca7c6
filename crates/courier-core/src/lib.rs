//! Core domain types for the courier message relay.
//!
//! Provides the message record, its strongly-typed identifier, and the
//! in-memory delivery queue shared between admission and the drain loop.
//! The other crates depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod message;
pub mod queue;

pub use message::{Message, MessageId};
pub use queue::{MessageQueue, QueueFull};
