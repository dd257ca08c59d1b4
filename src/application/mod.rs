//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `JoinEngine` which acts as the primary entry point
//! for correlating payment events. It uses an Actor-like pattern with `tokio`
//! channels to manage concurrency and state isolation: keys are hashed onto
//! shard workers, each owning its own windowed buffers.

pub mod engine;
pub mod evaluator;
pub mod window;
