//! Drift-corrected tick loop: invoke the fetcher once per nominal interval
//! and stop cleanly on shutdown.
//!
//! The next wake time is anchored to `start + n * interval` rather than
//! "now + interval after this tick finished", so fetch and backoff time never
//! accumulates into schedule slip. A tick that overran its slot fires the
//! next tick immediately (sleep floor is zero).

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::Instant;

use crate::config::TrackerConfig;
use crate::control::{sleep_interruptible, ShutdownToken};
use crate::fetcher::{fetch_with_retry, TickOutcome};
use crate::report::{ReportSink, TickEvent};
use crate::retry::BackoffPolicy;
use crate::source::QuoteSource;

/// Drives the fetch-and-retry sequence at a fixed nominal cadence.
///
/// At most one fetch sequence is in flight at any time; the loop exits only
/// on shutdown. A tick that fails is reported and the loop proceeds to the
/// next tick unconditionally.
pub struct Scheduler {
    symbol: String,
    currency: String,
    interval: Duration,
    policy: BackoffPolicy,
    source: Arc<dyn QuoteSource>,
    sink: Box<dyn ReportSink>,
    token: ShutdownToken,
}

impl Scheduler {
    pub fn new(
        cfg: &TrackerConfig,
        source: Arc<dyn QuoteSource>,
        sink: Box<dyn ReportSink>,
        token: ShutdownToken,
    ) -> Self {
        Self {
            symbol: cfg.symbol.to_uppercase(),
            currency: cfg.currency.to_uppercase(),
            interval: cfg.interval(),
            policy: cfg.retry.policy(),
            source,
            sink,
            token,
        }
    }

    /// Run until shutdown is requested. The quote source is dropped on every
    /// exit path when the scheduler itself is dropped.
    pub async fn run(mut self) {
        tracing::info!(
            "tracking {} -> {} every {}s",
            self.symbol,
            self.currency,
            self.interval.as_secs()
        );

        let mut next_tick = Instant::now() + self.interval;
        loop {
            if self.token.is_requested() {
                break;
            }

            let outcome = fetch_with_retry(
                Arc::clone(&self.source),
                &self.symbol,
                &self.currency,
                &self.policy,
                &self.token,
            )
            .await;

            match self.event_for(outcome) {
                Some(event) => self.sink.report(&event),
                // Interrupted mid-tick: no event, unwind now.
                None => break,
            }

            let wait = next_tick
                .checked_duration_since(Instant::now())
                .unwrap_or_default();
            if !sleep_interruptible(&self.token, wait).await {
                break;
            }
            next_tick += self.interval;
        }

        tracing::info!("price tracking stopped");
    }

    fn event_for(&self, outcome: TickOutcome) -> Option<TickEvent> {
        match outcome {
            TickOutcome::Success(price) => Some(TickEvent::Price {
                symbol: self.symbol.clone(),
                currency: self.currency.clone(),
                price,
                timestamp: OffsetDateTime::now_utc(),
            }),
            TickOutcome::Fatal { error, attempts } => Some(TickEvent::Failure {
                symbol: self.symbol.clone(),
                currency: self.currency.clone(),
                cause: error.to_string(),
                attempts,
            }),
            TickOutcome::RetriesExhausted { last, attempts } => Some(TickEvent::Failure {
                symbol: self.symbol.clone(),
                currency: self.currency.clone(),
                cause: format!("retries exhausted: {}", last),
                attempts,
            }),
            TickOutcome::Interrupted => None,
        }
    }
}
