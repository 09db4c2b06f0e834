//! Liquidation Ingestor (C5 consumer half): a durable, long-lived consumer
//! over the exchange's liquidation push stream (spec.md §4.5).
//!
//! Grounded on the teacher's `DataSourceKillSwitch` (`main.rs`) for the
//! consecutive-failure counter; unlike the teacher's kill switch, this
//! counter is pure observability — spec.md §7 requires the consumer to keep
//! looping on every recoverable error, never disable itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cancellation::CancelToken;
use crate::clock::Clock;
use crate::domain::{Liquidation, RawLiquidation};
use crate::ports::{ExchangeClient, LiquidationRepository};

/// Fixed reconnect backoff (spec.md §6 "default 5s").
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

pub struct LiquidationIngestor {
    consecutive_errors: AtomicU64,
}

impl Default for LiquidationIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl LiquidationIngestor {
    pub fn new() -> Self {
        Self {
            consecutive_errors: AtomicU64::new(0),
        }
    }

    pub fn consecutive_errors(&self) -> u64 {
        self.consecutive_errors.load(Ordering::Relaxed)
    }

    /// Runs until `cancel` fires. Reconnects (via the exchange port) on any
    /// subscribe failure or unexpected channel close, after the fixed
    /// backoff; never terminates on a recoverable error (spec.md §7).
    pub async fn run(
        &self,
        exchange: Arc<dyn ExchangeClient>,
        repository: Arc<dyn LiquidationRepository>,
        clock: Arc<dyn Clock>,
        mut cancel: CancelToken,
    ) {
        info!(exchange = exchange.name(), "liquidation ingestor starting");

        while !cancel.is_cancelled() {
            let mut stream = match exchange.subscribe_liquidations().await {
                Ok(stream) => stream,
                Err(err) => {
                    self.consecutive_errors.fetch_add(1, Ordering::Relaxed);
                    error!(%err, "failed to open liquidation stream");
                    tokio::select! {
                        _ = tokio::time::sleep(RECONNECT_BACKOFF) => continue,
                        _ = cancel.cancelled() => break,
                    }
                }
            };

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("liquidation ingestor cancelled");
                        return;
                    }
                    maybe_event = stream.events.recv() => {
                        match maybe_event {
                            Some(raw) => self.handle_event(raw, repository.as_ref(), clock.as_ref()).await,
                            None => {
                                warn!("liquidation event channel closed; reconnecting");
                                break;
                            }
                        }
                    }
                    maybe_err = stream.errors.recv() => {
                        match maybe_err {
                            Some(Err(err)) => {
                                self.consecutive_errors.fetch_add(1, Ordering::Relaxed);
                                error!(%err, "liquidation stream reported an error");
                            }
                            Some(Ok(())) => {}
                            None => {
                                warn!("liquidation error channel closed; reconnecting");
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("liquidation ingestor stopped");
    }

    async fn handle_event(
        &self,
        raw: RawLiquidation,
        repository: &dyn LiquidationRepository,
        clock: &dyn Clock,
    ) {
        let liquidation = Liquidation::from_raw(raw, clock.now());
        if !liquidation.is_valid() {
            warn!(symbol = %liquidation.symbol, "dropping invalid liquidation");
            return;
        }
        if let Err(err) = repository.create(&liquidation).await {
            error!(%err, symbol = %liquidation.symbol, "failed to persist liquidation");
        } else {
            self.consecutive_errors.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::domain::LiquidationSide;
    use crate::liquidation::InMemoryLiquidationAggregator;
    use chrono::Utc;

    #[tokio::test]
    async fn invalid_event_is_dropped_without_persisting() {
        let ingestor = LiquidationIngestor::new();
        let repo = InMemoryLiquidationAggregator::new();
        let clock = SystemClock;
        let raw = RawLiquidation {
            symbol: String::new(),
            side: LiquidationSide::Sell,
            price: 1.0,
            quantity: 1.0,
            event_time: Utc::now(),
        };
        ingestor.handle_event(raw, &repo, &clock).await;
        assert_eq!(repo.counts(Utc::now()).await.unwrap().ll60, 0);
    }
}
