//! Per-tick retry loop: run the quote source until success, a fatal error,
//! or retry exhaustion.

use std::sync::Arc;

use crate::control::{sleep_interruptible, ShutdownToken};
use crate::retry::{classify, BackoffPolicy, ErrorClass, FetchError};
use crate::source::QuoteSource;

/// Terminal outcome of one tick's fetch sequence.
#[derive(Debug)]
pub enum TickOutcome {
    /// A price was retrieved.
    Success(f64),
    /// A fatal error ended the tick early; no further attempts were made.
    Fatal { error: FetchError, attempts: u32 },
    /// Transient failures persisted through the whole retry budget.
    RetriesExhausted { last: FetchError, attempts: u32 },
    /// Shutdown was requested during a backoff sleep; the tick did not
    /// complete and no event should be reported for it.
    Interrupted,
}

/// Run the fetch-and-retry sequence for one tick.
///
/// At most `policy.max_retries` remote calls are made; a fatal classification
/// short-circuits the remaining budget. Each attempt runs the blocking source
/// on the blocking pool; backoff sleeps are interruptible by `token`. The
/// function carries no state across calls.
pub async fn fetch_with_retry(
    source: Arc<dyn QuoteSource>,
    symbol: &str,
    currency: &str,
    policy: &BackoffPolicy,
    token: &ShutdownToken,
) -> TickOutcome {
    let mut attempt = 1u32;
    loop {
        tracing::debug!(attempt, symbol, "fetching quote");
        let src = Arc::clone(&source);
        let (sym, cur) = (symbol.to_string(), currency.to_string());
        let joined = tokio::task::spawn_blocking(move || src.quote(&sym, &cur)).await;

        let error = match joined {
            Ok(Ok(price)) => return TickOutcome::Success(price),
            Ok(Err(e)) => e,
            // A panic inside the source is a bug signal, not an environment one.
            Err(join) => FetchError::Unexpected(join.to_string()),
        };

        match classify(&error) {
            ErrorClass::Fatal => {
                tracing::error!(attempt, %error, "fatal fetch error");
                return TickOutcome::Fatal { error, attempts: attempt };
            }
            ErrorClass::Retryable => {
                if attempt >= policy.max_retries {
                    tracing::error!(attempt, %error, "retry budget exhausted");
                    return TickOutcome::RetriesExhausted { last: error, attempts: attempt };
                }
                let delay = policy.delay(attempt, &mut rand::rng());
                tracing::warn!(attempt, %error, "retrying in {:.1}s", delay.as_secs_f64());
                if !sleep_interruptible(token, delay).await {
                    return TickOutcome::Interrupted;
                }
                attempt += 1;
            }
        }
    }
}
