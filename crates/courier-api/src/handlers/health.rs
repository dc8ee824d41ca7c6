//! Health check handler for service monitoring.
//!
//! The relay holds no external state, so liveness reports the engine's
//! own counters: queue depth and in-flight deliveries.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use courier_delivery::RelayEngine;
use serde::Serialize;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: &'static str,
    /// Timestamp when the health check was performed
    pub timestamp: DateTime<Utc>,
    /// Messages currently queued
    pub queue_depth: usize,
    /// Delivery attempts currently in flight
    pub in_flight: u64,
}

/// Reports service liveness with queue and delivery counters.
pub async fn health_check(State(engine): State<Arc<RelayEngine>>) -> Json<HealthResponse> {
    let stats = engine.stats().await;

    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        queue_depth: engine.queue_depth(),
        in_flight: stats.in_flight,
    })
}
