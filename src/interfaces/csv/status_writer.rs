use crate::domain::event::TransactionStatus;
use crate::domain::ports::StatusSink;
use crate::error::{JoinError, Result};
use async_trait::async_trait;
use std::io::Write;
use tokio::sync::Mutex;

/// Writes derived statuses as CSV to any `Write` target (e.g., Stdout, File).
///
/// The header row is emitted before the first status. Every row is flushed
/// as soon as it is written so downstream consumers observe statuses as they
/// are derived rather than at shutdown.
pub struct CsvStatusSink<W: Write + Send> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write + Send> CsvStatusSink<W> {
    /// Creates a new `CsvStatusSink` writing to the given target.
    pub fn new(target: W) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(target)),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| JoinError::IoError(std::io::Error::new(e.error().kind(), e.to_string())))
    }
}

#[async_trait]
impl<W: Write + Send> StatusSink for CsvStatusSink<W> {
    async fn deliver(&self, status: TransactionStatus) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.serialize(status)?;
        writer.flush()?;
        Ok(())
    }
}
