use crate::application::evaluator::evaluate;
use crate::application::window::WindowBuffer;
use crate::domain::event::{PaymentConfirmation, PaymentRequest, StreamEvent, TransactionStatus};
use crate::domain::ports::{EventSourceBox, SharedStatusSink};
use crate::error::{JoinError, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Configuration for the windowed join.
///
/// The join key is fixed (`transactionID`); everything else is tunable.
#[derive(Debug, Clone)]
pub struct JoinConfig {
    /// Symmetric join-window bound, compared in event time.
    pub window: Duration,
    /// Housekeeping horizon for keys that never see a partner. Defaults to
    /// twice the window, far enough behind stream time that sweeping can
    /// never drop an event the window would still admit.
    pub retention: Option<Duration>,
    /// Number of shard workers; events are routed by key hash.
    pub shards: usize,
    /// Capacity of each shard's routing channel.
    pub channel_capacity: usize,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(300),
            retention: None,
            shards: 1,
            channel_capacity: 1024,
        }
    }
}

impl JoinConfig {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Effective retention: the explicit value, or twice the window.
    pub fn retention(&self) -> Duration {
        self.retention.unwrap_or(self.window * 2)
    }

    fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    fn retention_ms(&self) -> i64 {
        i64::try_from(self.retention().as_millis()).unwrap_or(i64::MAX)
    }
}

/// Counters accumulated per shard and merged across shards at shutdown.
#[derive(Debug, Default, Clone)]
pub struct JoinStats {
    pub requests_processed: u64,
    pub confirmations_processed: u64,
    pub matches_emitted: u64,
    pub events_expired: u64,
    pub delivery_failures: u64,
    /// Events still buffered when the shard drained.
    pub requests_buffered: usize,
    pub confirmations_buffered: usize,
}

impl JoinStats {
    fn merge(&mut self, other: &JoinStats) {
        self.requests_processed += other.requests_processed;
        self.confirmations_processed += other.confirmations_processed;
        self.matches_emitted += other.matches_emitted;
        self.events_expired += other.events_expired;
        self.delivery_failures += other.delivery_failures;
        self.requests_buffered += other.requests_buffered;
        self.confirmations_buffered += other.confirmations_buffered;
    }
}

/// Single-owner core of the windowed join.
///
/// A `JoinState` owns the request and confirmation buffers for its slice of
/// the key space and advances each key's state serially. On every arriving
/// event it prunes that key's entries on both sides to the event's window,
/// then either takes the first in-window partner by arrival order (the
/// partner is removed and the arriving event is not buffered, so a pair
/// emits at most once) or buffers the event to wait for its partner.
pub struct JoinState {
    window_ms: i64,
    retention_ms: i64,
    requests: WindowBuffer<PaymentRequest>,
    confirmations: WindowBuffer<PaymentConfirmation>,
    /// Maximum event time seen so far on either stream.
    watermark: i64,
    last_sweep: i64,
    stats: JoinStats,
}

impl JoinState {
    pub fn new(config: &JoinConfig) -> Self {
        Self {
            window_ms: config.window_ms(),
            retention_ms: config.retention_ms(),
            requests: WindowBuffer::new(),
            confirmations: WindowBuffer::new(),
            watermark: i64::MIN,
            last_sweep: i64::MIN,
            stats: JoinStats::default(),
        }
    }

    /// Processes one event and returns the derived status if it completed a
    /// pair.
    pub fn apply(&mut self, event: StreamEvent) -> Option<TransactionStatus> {
        debug!(
            stream = event.stream(),
            key = event.key(),
            created = %format_event_time(event.event_time()),
            "event received"
        );

        match event {
            StreamEvent::Request(request) => self.apply_request(request),
            StreamEvent::Confirmation(confirmation) => self.apply_confirmation(confirmation),
        }
    }

    fn apply_request(&mut self, request: PaymentRequest) -> Option<TransactionStatus> {
        self.stats.requests_processed += 1;
        let key = request.transaction_id.clone();
        let event_time = request.created_time;
        self.prune(&key, event_time);

        let outcome = match self.confirmations.take_match(&key, event_time, self.window_ms) {
            Some(confirmation) => {
                self.stats.matches_emitted += 1;
                Some(evaluate(&request, &confirmation))
            }
            None => {
                self.requests.insert(&key, request, event_time);
                None
            }
        };

        self.advance_watermark(event_time);
        outcome
    }

    fn apply_confirmation(
        &mut self,
        confirmation: PaymentConfirmation,
    ) -> Option<TransactionStatus> {
        self.stats.confirmations_processed += 1;
        let key = confirmation.transaction_id.clone();
        let event_time = confirmation.created_time;
        self.prune(&key, event_time);

        let outcome = match self.requests.take_match(&key, event_time, self.window_ms) {
            Some(request) => {
                self.stats.matches_emitted += 1;
                Some(evaluate(&request, &confirmation))
            }
            None => {
                self.confirmations.insert(&key, confirmation, event_time);
                None
            }
        };

        self.advance_watermark(event_time);
        outcome
    }

    /// Drops entries for `key` on both sides whose event time lies outside
    /// the arriving event's window.
    fn prune(&mut self, key: &str, pivot: i64) {
        let dropped = self.requests.prune_key(key, pivot, self.window_ms)
            + self.confirmations.prune_key(key, pivot, self.window_ms);
        self.stats.events_expired += dropped as u64;
    }

    fn advance_watermark(&mut self, event_time: i64) {
        if event_time > self.watermark {
            self.watermark = event_time;
        }

        // Per-event pruning only touches the arriving key; keys abandoned
        // without a partner are reclaimed here once stream time has moved a
        // full window past the previous sweep.
        if self.watermark.saturating_sub(self.last_sweep) >= self.window_ms {
            let horizon = self.watermark.saturating_sub(self.retention_ms);
            let swept = self.requests.sweep(horizon) + self.confirmations.sweep(horizon);
            if swept > 0 {
                self.stats.events_expired += swept as u64;
                debug!(swept, horizon, "sweep dropped events past retention");
            }
            self.last_sweep = self.watermark;
        }
    }

    /// Snapshot of the counters, including current buffer gauges.
    pub fn stats(&self) -> JoinStats {
        let mut stats = self.stats.clone();
        stats.requests_buffered = self.requests.len();
        stats.confirmations_buffered = self.confirmations.len();
        stats
    }
}

/// The windowed join engine.
///
/// `JoinEngine` spawns one worker task per shard, each exclusively owning a
/// [`JoinState`] for its slice of the key space. Events are routed by key
/// hash, so both streams of a key always land on the same worker and every
/// key's buffer mutations are serialized without locking.
pub struct JoinEngine {
    shards: Vec<mpsc::Sender<StreamEvent>>,
    workers: Vec<JoinHandle<JoinStats>>,
}

impl JoinEngine {
    /// Creates a new `JoinEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Window, retention and sharding parameters.
    /// * `sink` - The delivery target for derived statuses.
    pub fn new(config: JoinConfig, sink: SharedStatusSink) -> Self {
        let shard_count = config.shards.max(1);
        let mut shards = Vec::with_capacity(shard_count);
        let mut workers = Vec::with_capacity(shard_count);

        for shard in 0..shard_count {
            let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
            let state = JoinState::new(&config);
            let sink = Arc::clone(&sink);
            workers.push(tokio::spawn(shard_worker(shard, state, rx, sink)));
            shards.push(tx);
        }

        debug!(shards = shard_count, window = ?config.window, "join engine started");
        Self { shards, workers }
    }

    /// Routes an event to the shard owning its key.
    pub async fn submit(&self, event: StreamEvent) -> Result<()> {
        let shard = self.shard_for(event.key());
        self.shards[shard]
            .send(event)
            .await
            .map_err(|_| JoinError::EngineClosed(format!("shard {shard} worker is gone")))
    }

    /// Drains an ingress source into the engine until it ends. Returns the
    /// number of events submitted.
    pub async fn consume(&self, mut source: EventSourceBox) -> Result<u64> {
        let mut submitted = 0;
        while let Some(event) = source.next_event().await? {
            self.submit(event).await?;
            submitted += 1;
        }
        Ok(submitted)
    }

    /// Closes the ingress side, waits for every shard to drain its queue,
    /// and returns the merged statistics.
    pub async fn shutdown(self) -> Result<JoinStats> {
        drop(self.shards);

        let mut merged = JoinStats::default();
        for worker in self.workers {
            let stats = worker
                .await
                .map_err(|e| JoinError::EngineClosed(format!("shard worker failed: {e}")))?;
            merged.merge(&stats);
        }
        Ok(merged)
    }

    fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}

async fn shard_worker(
    shard: usize,
    mut state: JoinState,
    mut events: mpsc::Receiver<StreamEvent>,
    sink: SharedStatusSink,
) -> JoinStats {
    let mut delivery_failures = 0u64;

    while let Some(event) = events.recv().await {
        if let Some(status) = state.apply(event) {
            info!(
                shard,
                key = %status.transaction_id,
                status = %status.status,
                "transaction status emitted"
            );
            if let Err(e) = sink.deliver(status).await {
                delivery_failures += 1;
                warn!(shard, error = %e, "status delivery failed");
            }
        }
    }

    let mut stats = state.stats();
    stats.delivery_failures = delivery_failures;
    debug!(shard, matches = stats.matches_emitted, "shard drained");
    stats
}

fn format_event_time(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
