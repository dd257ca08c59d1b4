use crate::domain::event::{StreamEvent, TransactionStatus};
use crate::domain::ports::{EventSource, StatusSink};
use crate::error::{JoinError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// An ingress adapter backed by a `tokio` mpsc channel.
///
/// Producers hold the paired [`mpsc::Sender`] and push events from anywhere
/// (another task, a network handler, a test). The source ends once every
/// sender is dropped and the queue drains.
pub struct ChannelEventSource {
    events: mpsc::Receiver<StreamEvent>,
}

impl ChannelEventSource {
    /// Creates a bounded channel and returns the producer handle together
    /// with the source adapter.
    pub fn bounded(capacity: usize) -> (mpsc::Sender<StreamEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { events: rx })
    }
}

#[async_trait]
impl EventSource for ChannelEventSource {
    async fn next_event(&mut self) -> Result<Option<StreamEvent>> {
        Ok(self.events.recv().await)
    }
}

/// An egress adapter backed by a `tokio` mpsc channel.
///
/// Statuses are pushed to the paired [`mpsc::Receiver`]; delivery fails once
/// the receiving side is gone.
#[derive(Clone)]
pub struct ChannelStatusSink {
    statuses: mpsc::Sender<TransactionStatus>,
}

impl ChannelStatusSink {
    /// Creates a bounded channel and returns the sink adapter together with
    /// the consumer handle.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<TransactionStatus>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { statuses: tx }, rx)
    }
}

#[async_trait]
impl StatusSink for ChannelStatusSink {
    async fn deliver(&self, status: TransactionStatus) -> Result<()> {
        self.statuses
            .send(status)
            .await
            .map_err(|e| JoinError::SinkClosed(format!("status receiver is gone: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{PaymentRequest, Status};

    fn request(id: &str) -> StreamEvent {
        StreamEvent::Request(PaymentRequest {
            transaction_id: id.to_string(),
            otp: "1234".to_string(),
            created_time: 0,
        })
    }

    #[tokio::test]
    async fn test_channel_event_source_yields_until_closed() {
        let (tx, mut source) = ChannelEventSource::bounded(4);

        tx.send(request("T1")).await.unwrap();
        tx.send(request("T2")).await.unwrap();
        drop(tx);

        assert_eq!(source.next_event().await.unwrap().unwrap().key(), "T1");
        assert_eq!(source.next_event().await.unwrap().unwrap().key(), "T2");
        assert!(source.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_channel_status_sink_delivers() {
        let (sink, mut rx) = ChannelStatusSink::bounded(4);

        sink.deliver(TransactionStatus {
            transaction_id: "T1".to_string(),
            status: Status::Success,
        })
        .await
        .unwrap();

        let status = rx.recv().await.unwrap();
        assert_eq!(status.transaction_id, "T1");
        assert_eq!(status.status, Status::Success);
    }

    #[tokio::test]
    async fn test_channel_status_sink_fails_after_receiver_drops() {
        let (sink, rx) = ChannelStatusSink::bounded(4);
        drop(rx);

        let result = sink
            .deliver(TransactionStatus {
                transaction_id: "T1".to_string(),
                status: Status::Failure,
            })
            .await;

        assert!(matches!(result, Err(JoinError::SinkClosed(_))));
    }
}
