//! End-to-End Test Framework for the reactor fabric
//!
//! Runs a real router on an ephemeral port and real reactor nodes against it.
//! Handlers record what they see into a channel so scenarios can assert on
//! exact event sequences.

pub mod fixtures;

pub use fixtures::{init_test_logging, Event, Recorder, RecordingHandler, RunningRouter};
