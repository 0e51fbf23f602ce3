//! Quote fetch error type for retry classification.

use thiserror::Error;

/// Error returned by a single quote attempt.
///
/// Kept as a typed enum so the retry layer can classify and decide before
/// anything is flattened into a report string.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),

    /// Response arrived but could not be parsed into a price (bad JSON,
    /// missing field, non-numeric value). A data contract violation, not a
    /// transient condition.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Anything that escaped the categories above. Reported distinctly so a
    /// logic bug is not mistaken for infrastructure flakiness.
    #[error("unexpected: {0}")]
    Unexpected(String),
}
