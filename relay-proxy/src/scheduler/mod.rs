//! Scheduler layer for the proxy
//!
//! Background tasks that keep the execution cache warm while an upstream
//! execution is still running. One supervised task per job, all of them
//! cancelled together on shutdown.

pub mod poller;

pub use poller::{ExecutionPoller, PollOutcome, PollSettings};
