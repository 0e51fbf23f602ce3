//! Per-tick reporting: one structured event per completed tick.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Outcome event for one completed tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    Price {
        symbol: String,
        currency: String,
        price: f64,
        timestamp: OffsetDateTime,
    },
    Failure {
        symbol: String,
        currency: String,
        cause: String,
        attempts: u32,
    },
}

/// Sink for tick events. The scheduler emits exactly one event per completed
/// tick; the sink decides the format.
pub trait ReportSink: Send {
    fn report(&mut self, event: &TickEvent);
}

/// Default sink: one tracing line per tick.
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&mut self, event: &TickEvent) {
        match event {
            TickEvent::Price {
                symbol,
                currency,
                price,
                timestamp,
            } => {
                let ts = timestamp
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| timestamp.unix_timestamp().to_string());
                tracing::info!(%symbol, %currency, price, %ts, "{} -> {}: {:.2}", symbol, currency, price);
            }
            TickEvent::Failure {
                symbol,
                currency,
                cause,
                attempts,
            } => {
                tracing::warn!(%symbol, %currency, attempts, "tick failed: {}", cause);
            }
        }
    }
}
