//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures, bad payloads) and exponential backoff decisions so
//! that the fetcher and scheduler share a consistent policy.

mod classify;
mod error;
mod policy;

pub use classify::{classify, classify_curl_error, classify_status, ErrorClass};
pub use error::FetchError;
pub use policy::{BackoffPolicy, JitterMode};
