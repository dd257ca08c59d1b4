//! Domain model: payment events, derived statuses and the engine's ports.

pub mod event;
pub mod ports;
