//! Interface adapters binding the engine to the outside world.

pub mod csv;
