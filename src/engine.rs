//! Glue (spec.md §2 "Pipeline", §4 end-to-end flow): wires the six core
//! components into the single per-second pipeline and the startup warm-up
//! step. Grounded on the teacher's top-level orchestration in `main.rs`,
//! which owns the same shape (fetch -> compute -> persist -> broadcast)
//! around its book-ticker poll loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::domain::Tick;
use crate::errors::EngineResult;
use crate::indicators::{AggregateIndicatorEngine, PerSymbolIndicatorEngine};
use crate::notify::events::NotificationData;
use crate::notify::NotificationHub;
use crate::ports::{ExchangeClient, LiquidationRepository, TickRepository};
use crate::snapshotter::MarketSnapshotter;

pub struct Engine {
    snapshotter: MarketSnapshotter,
    symbol_engine: PerSymbolIndicatorEngine,
    aggregate_engine: AggregateIndicatorEngine,
    liquidation_repo: Arc<dyn LiquidationRepository>,
    tick_repo: Arc<dyn TickRepository>,
    hub: Arc<NotificationHub>,
    clock: Arc<dyn Clock>,
    fetch_deadline: Duration,
}

impl Engine {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        liquidation_repo: Arc<dyn LiquidationRepository>,
        tick_repo: Arc<dyn TickRepository>,
        hub: Arc<NotificationHub>,
        clock: Arc<dyn Clock>,
        fetch_deadline: Duration,
    ) -> Self {
        Self {
            snapshotter: MarketSnapshotter::new(exchange),
            symbol_engine: PerSymbolIndicatorEngine::new(),
            aggregate_engine: AggregateIndicatorEngine::new(),
            liquidation_repo,
            tick_repo,
            hub,
            clock,
            fetch_deadline,
        }
    }

    /// Seeds the Aggregate Indicator Engine's tick history from persisted
    /// ticks so `avg_ask_change_10` is meaningful immediately after a
    /// restart (spec.md §9 "history must be warmed from storage at
    /// startup").
    pub async fn warm_up(&self) -> EngineResult<()> {
        let since = self.clock.now() - chrono::Duration::minutes(crate::history::HISTORY_LEN as i64);
        let ticks = self.tick_repo.history_since(since).await?;
        debug!(count = ticks.len(), "warming tick history");
        self.aggregate_engine.warm_up(ticks);
        Ok(())
    }

    /// Runs one full pipeline pass (spec.md §2, §4). Invoked once per second
    /// by the Tick Scheduler (C1).
    pub async fn run_once(&self) -> EngineResult<()> {
        let start_time = self.clock.now();

        let raws = self.snapshotter.fetch(self.fetch_deadline).await?;
        let fetched_time = self.clock.now();

        let data = self.symbol_engine.process(&raws, fetched_time);

        // Counted at the tick's start time, matching the window edge used
        // by the ingestor-side aggregator (spec.md §4.5).
        let liquidations = self.liquidation_repo.counts(start_time).await?;

        let created_time = self.clock.now();
        let fetch_duration_ms = (fetched_time - start_time).num_milliseconds();
        let handling_duration_ms = (created_time - fetched_time).num_milliseconds();

        let tick = Tick {
            start_time,
            fetched_time,
            created_time,
            fetch_duration_ms,
            handling_duration_ms,
            avg_ask_change_10: None,
            liquidations,
            avg: Default::default(),
            data,
        };

        let tick = self.aggregate_engine.finish(tick);
        debug_assert!(tick.is_valid(), "tick violated spec.md §8 invariant 4");
        debug!(tickers = tick.tickers_count(), "persisting tick");

        if let Err(err) = self.tick_repo.create(&tick).await {
            warn!(%err, "failed to persist tick; continuing");
        }

        self.hub.publish(NotificationData::Tick(&tick)).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::RawTicker;
    use crate::liquidation::InMemoryLiquidationAggregator;
    use crate::ports::LiquidationStream;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    struct StubExchange {
        tickers: Vec<RawTicker>,
    }

    #[async_trait]
    impl ExchangeClient for StubExchange {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_tickers(&self, _deadline: Duration) -> EngineResult<Vec<RawTicker>> {
            Ok(self.tickers.clone())
        }

        async fn subscribe_liquidations(&self) -> EngineResult<LiquidationStream> {
            let (_tx, events) = tokio::sync::mpsc::channel(1);
            let (_err_tx, errors) = tokio::sync::mpsc::channel(1);
            Ok(LiquidationStream { events, errors })
        }
    }

    #[derive(Default)]
    struct RecordingTickRepository {
        requested_since: parking_lot::Mutex<Option<DateTime<Utc>>>,
        created: parking_lot::Mutex<Option<Tick>>,
    }

    #[async_trait]
    impl TickRepository for RecordingTickRepository {
        async fn create(&self, tick: &Tick) -> EngineResult<()> {
            *self.created.lock() = Some(tick.clone());
            Ok(())
        }

        async fn history_since(&self, since: DateTime<Utc>) -> EngineResult<Vec<Tick>> {
            *self.requested_since.lock() = Some(since);
            Ok(Vec::new())
        }
    }

    /// spec.md §9 "time sources must be injectable" — `Engine` reads `now`
    /// exclusively through its injected [`Clock`], never `Utc::now()`
    /// directly, so swapping in a [`FixedClock`] makes the warm-up window
    /// fully deterministic.
    #[tokio::test]
    async fn warm_up_requests_history_since_fixed_clock_minus_history_len() {
        let fixed_now = Utc.with_ymd_and_opt(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(fixed_now));
        let tick_repo = Arc::new(RecordingTickRepository::default());

        let engine = Engine::new(
            Arc::new(StubExchange { tickers: Vec::new() }),
            Arc::new(InMemoryLiquidationAggregator::new()),
            tick_repo.clone(),
            Arc::new(NotificationHub::new()),
            clock,
            Duration::from_millis(500),
        );

        engine.warm_up().await.unwrap();

        let expected = fixed_now - chrono::Duration::minutes(crate::history::HISTORY_LEN as i64);
        assert_eq!(*tick_repo.requested_since.lock(), Some(expected));
    }

    /// `run_once` stamps every phase of the tick from the same frozen
    /// instant when the clock never advances between phases, proving the
    /// pipeline's timestamps come from `Clock::now`, not the wall clock.
    #[tokio::test]
    async fn run_once_stamps_timestamps_from_fixed_clock() {
        let fixed_now = Utc.with_ymd_and_opt(2026, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(fixed_now));
        let tick_repo = Arc::new(RecordingTickRepository::default());

        let ticker = RawTicker {
            symbol: "BTCUSDT".to_string(),
            bid_price: 100.0,
            ask_price: 100.5,
            bid_qty: 1.0,
            ask_qty: 1.0,
            event_time: fixed_now,
        };

        let engine = Engine::new(
            Arc::new(StubExchange {
                tickers: vec![ticker],
            }),
            Arc::new(InMemoryLiquidationAggregator::new()),
            tick_repo.clone(),
            Arc::new(NotificationHub::new()),
            clock,
            Duration::from_millis(500),
        );

        engine.run_once().await.unwrap();

        let created = tick_repo.created.lock().clone().expect("tick persisted");
        assert_eq!(created.start_time, fixed_now);
        assert_eq!(created.fetched_time, fixed_now);
        assert_eq!(created.created_time, fixed_now);
        assert_eq!(created.fetch_duration_ms, 0);
        assert_eq!(created.handling_duration_ms, 0);
    }
}
