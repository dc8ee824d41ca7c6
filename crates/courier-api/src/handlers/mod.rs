//! HTTP request handlers for the courier API.
//!
//! Handlers are grouped by functionality:
//! - `admit` - message admission into the delivery queue
//! - `health` - liveness probe with queue depth
//!
//! Admission responds as soon as a message is queued; delivery outcomes
//! are observable only through logs, never through the admission
//! response.

pub mod admit;
pub mod health;

pub use admit::admit_message;
pub use health::health_check;
