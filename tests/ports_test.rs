use otpmatch::domain::event::{PaymentRequest, Status, StreamEvent, TransactionStatus};
use otpmatch::domain::ports::{EventSourceBox, SharedStatusSink};
use otpmatch::infrastructure::channels::{ChannelEventSource, ChannelStatusSink};
use std::sync::Arc;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let (events, source) = ChannelEventSource::bounded(8);
    let (sink, mut statuses) = ChannelStatusSink::bounded(8);

    let mut source: EventSourceBox = Box::new(source);
    let sink: SharedStatusSink = Arc::new(sink);

    // Verify Send + Sync by moving the boxed ports into tasks.
    let source_handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(event) = source.next_event().await.unwrap() {
            seen.push(event);
        }
        seen
    });

    let sink_handle = tokio::spawn(async move {
        sink.deliver(TransactionStatus {
            transaction_id: "T1".to_string(),
            status: Status::Success,
        })
        .await
        .unwrap();
    });

    events
        .send(StreamEvent::Request(PaymentRequest {
            transaction_id: "T1".to_string(),
            otp: "4821".to_string(),
            created_time: 0,
        }))
        .await
        .unwrap();
    drop(events);

    let seen = source_handle.await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].key(), "T1");

    sink_handle.await.unwrap();
    let status = statuses.recv().await.unwrap();
    assert_eq!(status.transaction_id, "T1");
}
