use crate::domain::event::{PaymentConfirmation, PaymentRequest, StreamEvent};
use crate::domain::ports::EventSource;
use crate::error::{JoinError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Reads payment events from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over the
/// deserialized event type. It handles whitespace trimming and flexible
/// record lengths automatically.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes events.
    ///
    /// This allows for processing large files in a streaming fashion without
    /// loading the entire dataset into memory.
    pub fn events<E: DeserializeOwned>(self) -> impl Iterator<Item = Result<E>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(JoinError::from))
    }
}

type RowIter<E> = Box<dyn Iterator<Item = Result<E>> + Send>;

/// Replays a request file and a confirmation file as one interleaved stream.
///
/// Rows are merged by `createdTime` so the arrival order seen by the join
/// approximates event-time order; a request and a confirmation carrying the
/// same timestamp replay request-first. Rows that fail to deserialize or
/// carry an empty `transactionID` are skipped with a warning and never reach
/// the join.
pub struct ReplaySource {
    requests: RowIter<PaymentRequest>,
    confirmations: RowIter<PaymentConfirmation>,
    next_request: Option<PaymentRequest>,
    next_confirmation: Option<PaymentConfirmation>,
    skipped: u64,
}

impl ReplaySource {
    /// Creates a source replaying the two given iterators.
    pub fn new<RI, CI>(requests: RI, confirmations: CI) -> Self
    where
        RI: Iterator<Item = Result<PaymentRequest>> + Send + 'static,
        CI: Iterator<Item = Result<PaymentConfirmation>> + Send + 'static,
    {
        Self {
            requests: Box::new(requests),
            confirmations: Box::new(confirmations),
            next_request: None,
            next_confirmation: None,
            skipped: 0,
        }
    }

    /// Opens the two CSV files and replays them as one stream.
    pub fn from_paths(
        requests: impl AsRef<Path>,
        confirmations: impl AsRef<Path>,
    ) -> Result<Self> {
        let requests = File::open(requests)?;
        let confirmations = File::open(confirmations)?;
        Ok(Self::new(
            EventReader::new(requests).events(),
            EventReader::new(confirmations).events(),
        ))
    }

    /// Number of rows skipped so far because they were malformed or keyless.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn refill(&mut self) {
        if self.next_request.is_none() {
            self.next_request = next_valid(
                self.requests.as_mut(),
                |r| r.transaction_id.as_str(),
                "request",
                &mut self.skipped,
            );
        }
        if self.next_confirmation.is_none() {
            self.next_confirmation = next_valid(
                self.confirmations.as_mut(),
                |c| c.transaction_id.as_str(),
                "confirmation",
                &mut self.skipped,
            );
        }
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    async fn next_event(&mut self) -> Result<Option<StreamEvent>> {
        self.refill();

        let take_request = match (&self.next_request, &self.next_confirmation) {
            (Some(request), Some(confirmation)) => {
                request.created_time <= confirmation.created_time
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return Ok(None),
        };

        let event = if take_request {
            self.next_request.take().map(StreamEvent::Request)
        } else {
            self.next_confirmation.take().map(StreamEvent::Confirmation)
        };
        Ok(event)
    }
}

/// Pulls the next well-formed row off `rows`, skipping and counting rows the
/// join must never see.
fn next_valid<E>(
    rows: &mut (dyn Iterator<Item = Result<E>> + Send),
    key: fn(&E) -> &str,
    stream: &'static str,
    skipped: &mut u64,
) -> Option<E> {
    loop {
        match rows.next()? {
            Ok(event) if !key(&event).is_empty() => return Some(event),
            Ok(_) => {
                *skipped += 1;
                warn!(stream, "skipping row with empty transactionID");
            }
            Err(e) => {
                *skipped += 1;
                warn!(stream, error = %e, "skipping malformed row");
            }
        }
    }
}
