//! Drain-loop coordinator dispatching concurrent delivery tasks.
//!
//! The engine owns the queue, the HTTP client, the route table, and the
//! retry policy. A drain snapshot-empties the queue and spawns one
//! independent task per message, so delivery of one message never blocks
//! another or the admission path. The drain is safe to trigger
//! redundantly: removal from the queue transfers sole ownership of each
//! record, and the loop returns as soon as the queue is observed empty.

use std::sync::Arc;

use courier_core::{Message, MessageQueue, QueueFull};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::{
    client::{ClientConfig, DeliveryClient, DeliveryRequest, DeliveryResponse},
    error::Result,
    retry::{RetryDecision, RetryPolicy},
    router::RouteTable,
};

/// Configuration for the relay engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// HTTP client configuration.
    pub client: ClientConfig,

    /// Retry policy applied to failed deliveries.
    pub retry: RetryPolicy,

    /// Type-to-destination routing table.
    pub routes: RouteTable,

    /// Optional admission bound on the queue. `None` keeps the queue
    /// unbounded, the relay's documented default.
    pub queue_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            retry: RetryPolicy::default(),
            routes: RouteTable::with_default(crate::DEFAULT_CONSUMER_URL),
            queue_capacity: None,
        }
    }
}

/// Counters for engine monitoring.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Messages delivered successfully.
    pub delivered: u64,
    /// Failed attempts that were re-queued.
    pub retried: u64,
    /// Messages dropped after exhausting the attempt ceiling, plus any
    /// terminated by unexpected task errors.
    pub dropped: u64,
    /// Delivery attempts currently in flight.
    pub in_flight: u64,
}

/// Queueing-and-delivery coordinator for the relay.
pub struct RelayEngine {
    queue: MessageQueue,
    client: DeliveryClient,
    routes: RouteTable,
    retry: RetryPolicy,
    stats: RwLock<EngineStats>,
}

impl RelayEngine {
    /// Creates a new engine with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Configuration` if the HTTP client cannot
    /// be built.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = DeliveryClient::new(config.client)?;
        let queue = match config.queue_capacity {
            Some(capacity) => MessageQueue::bounded(capacity),
            None => MessageQueue::unbounded(),
        };

        Ok(Self {
            queue,
            client,
            routes: config.routes,
            retry: config.retry,
            stats: RwLock::new(EngineStats::default()),
        })
    }

    /// Admits a message and triggers a drain.
    ///
    /// Returns as soon as the message is queued and the drain's tasks are
    /// spawned; it never waits on delivery.
    ///
    /// # Errors
    ///
    /// Returns `QueueFull` when a configured capacity bound is reached;
    /// the message is not enqueued.
    pub fn admit(self: &Arc<Self>, message: Message) -> std::result::Result<(), QueueFull> {
        self.queue.push(message)?;
        self.drain();
        Ok(())
    }

    /// Drains the queue, spawning one delivery task per message.
    ///
    /// Each snapshot claims only the messages present at that moment;
    /// concurrent invocations therefore never hand a message to two
    /// tasks. Returns once the queue is observed empty.
    pub fn drain(self: &Arc<Self>) {
        loop {
            let batch = self.queue.drain();
            if batch.is_empty() {
                return;
            }

            debug!(batch = batch.len(), "draining queue");

            for message in batch {
                let engine = Arc::clone(self);
                tokio::spawn(async move { engine.process(message).await });
            }
        }
    }

    /// Number of messages currently queued.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Returns a snapshot of the engine counters.
    pub async fn stats(&self) -> EngineStats {
        self.stats.read().await.clone()
    }

    /// Runs one message through attempt, retry, or drop.
    ///
    /// Every failure path terminates here in either a re-enqueue or a
    /// permanent drop; nothing escapes the task boundary.
    async fn process(self: Arc<Self>, mut message: Message) {
        {
            let mut stats = self.stats.write().await;
            stats.in_flight += 1;
        }

        let outcome = self.attempt(&message).await;

        let mut stats = self.stats.write().await;
        stats.in_flight -= 1;

        match outcome {
            Ok(response) => {
                stats.delivered += 1;
                drop(stats);

                info!(
                    message_id = %message.id,
                    status = response.status_code,
                    duration_ms = response.duration.as_millis(),
                    "message delivered"
                );
            },
            Err(failure) if failure.is_retryable() => {
                let attempts = message.record_failure();

                match self.retry.decide(attempts) {
                    RetryDecision::Requeue { delay } => {
                        stats.retried += 1;
                        drop(stats);

                        warn!(
                            message_id = %message.id,
                            attempts,
                            delay_ms = delay.as_millis(),
                            error = %failure,
                            "delivery failed, retrying later"
                        );

                        // The timer task holds the record for the delay,
                        // so the next attempt starts no sooner than
                        // `delay` after this one resolved.
                        let engine = Arc::clone(&self);
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            engine.queue.requeue(message);
                            engine.drain();
                        });
                    },
                    RetryDecision::Drop { reason } => {
                        stats.dropped += 1;
                        drop(stats);

                        error!(
                            message_id = %message.id,
                            attempts,
                            reason = %reason,
                            error = %failure,
                            "dropping message"
                        );
                    },
                }
            },
            Err(failure) => {
                stats.dropped += 1;
                drop(stats);

                error!(
                    message_id = %message.id,
                    error = %failure,
                    "unexpected delivery task error"
                );
            },
        }
    }

    /// Performs one delivery attempt for a message.
    async fn attempt(&self, message: &Message) -> Result<DeliveryResponse> {
        let url = self.routes.resolve(&message.body);

        debug!(
            message_id = %message.id,
            url,
            attempt = message.attempts + 1,
            "dispatching delivery attempt"
        );

        let request = DeliveryRequest {
            message_id: message.id,
            url: url.to_string(),
            body: message.body.clone(),
            auth_header: message.auth_header.clone(),
            attempt_number: message.attempts + 1,
        };

        self.client.deliver(request).await
    }
}
