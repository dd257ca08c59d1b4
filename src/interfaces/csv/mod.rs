//! CSV adapters for replaying event files and writing status output.

pub mod event_reader;
pub mod status_writer;
