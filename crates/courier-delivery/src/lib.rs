//! Message delivery engine for the courier relay.
//!
//! Implements the queueing-and-delivery core: the drain loop pulls every
//! currently-queued message and dispatches each to an independent delivery
//! task, so a slow or failing destination never delays other messages or
//! new admissions. Failed attempts are retried a bounded number of times
//! with a fixed delay, then dropped.
//!
//! # Architecture
//!
//! ```text
//! admission ──▶ MessageQueue ──▶ drain() ──▶ delivery task (per message)
//!                    ▲                            │
//!                    └── retry timer ◀── failure ─┘
//! ```
//!
//! Each delivery task resolves a destination through the [`RouteTable`],
//! performs one HTTP attempt via [`DeliveryClient`], and on failure hands
//! the record to the [`RetryPolicy`], which either schedules a re-enqueue
//! after a delay or drops the message permanently.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use courier_core::Message;
//! use courier_delivery::{EngineConfig, RelayEngine};
//!
//! # fn example() -> courier_delivery::Result<()> {
//! let engine = Arc::new(RelayEngine::new(EngineConfig::default())?);
//! let message = Message::new(Bytes::from_static(b"{}"), "Bearer abc".into());
//! engine.admit(message).ok();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod engine;
pub mod error;
pub mod retry;
pub mod router;

pub use client::{ClientConfig, DeliveryClient};
pub use engine::{EngineConfig, EngineStats, RelayEngine};
pub use error::{DeliveryError, Result};
pub use retry::{RetryDecision, RetryPolicy};
pub use router::RouteTable;

/// Default destination when no route matches and none is configured.
pub const DEFAULT_CONSUMER_URL: &str = "http://localhost:8081/galebroker/events/agent";

/// Default maximum delivery attempts before a message is dropped.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before a failed message is re-queued, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default per-attempt HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;
