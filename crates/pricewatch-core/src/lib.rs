//! Resilient single-instrument price polling engine.
//!
//! The scheduler drives the fetcher once per nominal interval; the fetcher
//! retries transient failures under an exponential backoff policy and stops
//! immediately on fatal ones. Cancellation is cooperative and observed at
//! every sleep.

pub mod config;
pub mod control;
pub mod fetcher;
pub mod logging;
pub mod report;
pub mod retry;
pub mod scheduler;
pub mod source;
