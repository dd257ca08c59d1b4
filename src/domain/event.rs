use serde::{Deserialize, Serialize};
use std::fmt;

/// A payment initiation event carrying the OTP issued to the customer.
///
/// Produced upstream when a payment is requested. Immutable once created;
/// the engine only reads and correlates it. `created_time` is the event
/// time (epoch milliseconds), distinct from processing time.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct PaymentRequest {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    pub otp: String,
    #[serde(rename = "createdTime")]
    pub created_time: i64,
}

/// The confirmation event echoing back the OTP the customer entered.
///
/// Shares the key space of [`PaymentRequest`]; the two are correlated by
/// `transaction_id`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct PaymentConfirmation {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    pub otp: String,
    #[serde(rename = "createdTime")]
    pub created_time: i64,
}

/// Outcome of comparing the request OTP against the confirmation OTP.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "Success"),
            Status::Failure => write!(f, "Failure"),
        }
    }
}

/// Derived output event for a matched pair. Exists only on the egress
/// stream; never persisted by this engine.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct TransactionStatus {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    pub status: Status,
}

/// An event from either ingress stream, tagged with its origin.
///
/// Ingress adapters hand the engine one multiplexed sequence of these; the
/// tag tells the engine which buffer the event belongs to.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum StreamEvent {
    Request(PaymentRequest),
    Confirmation(PaymentConfirmation),
}

impl StreamEvent {
    /// The join key shared by both streams.
    pub fn key(&self) -> &str {
        match self {
            StreamEvent::Request(r) => &r.transaction_id,
            StreamEvent::Confirmation(c) => &c.transaction_id,
        }
    }

    /// Event time in epoch milliseconds.
    pub fn event_time(&self) -> i64 {
        match self {
            StreamEvent::Request(r) => r.created_time,
            StreamEvent::Confirmation(c) => c.created_time,
        }
    }

    /// Stream name for log lines.
    pub fn stream(&self) -> &'static str {
        match self {
            StreamEvent::Request(_) => "request",
            StreamEvent::Confirmation(_) => "confirmation",
        }
    }
}
