//! Infrastructure adapters implementing the domain ports.
//!
//! Channel-backed adapters move events and statuses between async tasks;
//! file-backed adapters live under [`crate::interfaces`].

pub mod channels;
