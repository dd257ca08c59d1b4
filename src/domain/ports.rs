use super::event::{StreamEvent, TransactionStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Ingress port implemented by the transport layer.
///
/// A source yields one lazy, effectively-infinite, non-restartable sequence
/// of keyed, timestamped events. `Ok(None)` marks the end of the stream
/// (only finite replays ever reach it). Sources must hand the engine only
/// well-formed events; rows without a key or timestamp are filtered here,
/// not in the core.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Result<Option<StreamEvent>>;
}

/// Egress port implemented by the transport layer.
///
/// The engine hands every derived status to the sink; delivery onward
/// (publishing, serialization) is the transport's concern.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn deliver(&self, status: TransactionStatus) -> Result<()>;
}

pub type EventSourceBox = Box<dyn EventSource>;
pub type SharedStatusSink = Arc<dyn StatusSink>;
