use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
    #[error("Engine closed: {0}")]
    EngineClosed(String),
    #[error("Status sink closed: {0}")]
    SinkClosed(String),
}

pub type Result<T> = std::result::Result<T, JoinError>;
