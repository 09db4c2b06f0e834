//! Aggregate Indicator Engine (C4): appends the new tick to tick history and
//! computes market-wide averages against the previous tick (spec.md §4.4).

use crate::domain::{AggregateAverages, Tick};
use crate::history::TickHistory;

use super::math::{clamp, pct};

#[derive(Default)]
pub struct AggregateIndicatorEngine {
    history: parking_lot::Mutex<TickHistory>,
}

impl AggregateIndicatorEngine {
    pub fn new() -> Self {
        Self {
            history: parking_lot::Mutex::new(TickHistory::new()),
        }
    }

    /// Seeds the history at startup from `TickRepository::history_since`
    /// (spec.md §9), oldest first.
    pub fn warm_up(&self, ticks: Vec<Tick>) {
        let mut history = self.history.lock();
        for tick in ticks {
            history.push(tick);
        }
    }

    /// Appends `tick` (already carrying per-symbol data and liquidation
    /// counts) to tick history, computes cross-symbol averages against the
    /// previous tick, and returns the finished tick. Only this engine's
    /// owner call site appends to tick history (spec.md §5).
    pub fn finish(&self, mut tick: Tick) -> Tick {
        let mut history = self.history.lock();

        tick.avg = match history.entries().back() {
            Some(prev) => compute_averages(&tick, prev),
            None => AggregateAverages::default(),
        };

        history.push(tick.clone());
        tick.avg_ask_change_10 = history
            .mean_avg_ask_change(10)
            .map(|mean| crate::indicators::math::round(mean, 6));

        tick
    }
}

fn compute_averages(current: &Tick, prev: &Tick) -> AggregateAverages {
    let mut ask_diff_sum = 0.0;
    let mut bid_diff_sum = 0.0;
    let mut change_1m_sum = 0.0;
    let mut change_20m_sum = 0.0;
    let mut max10_sum = 0.0;
    let mut min10_sum = 0.0;
    let mut count: u64 = 0;

    for (symbol, curr_ticker) in current.data.iter() {
        let Some(prev_ticker) = prev.data.get(symbol) else {
            continue;
        };

        let ask_diff = clamp(pct(curr_ticker.ask, prev_ticker.ask, Some(2)), 1.0);
        let bid_diff = clamp(pct(curr_ticker.bid, prev_ticker.bid, Some(2)), 1.0);
        ask_diff_sum += ask_diff;
        bid_diff_sum += bid_diff;
        change_1m_sum += curr_ticker.change_1m.unwrap_or(0.0);
        change_20m_sum += curr_ticker.change_20m.unwrap_or(0.0);
        if let Some(max10) = curr_ticker.max_10m {
            max10_sum += pct(curr_ticker.ask, max10, None);
        }
        if let Some(min10) = curr_ticker.min_10m {
            min10_sum += pct(curr_ticker.ask, min10, None);
        }
        count += 1;
    }

    if count == 0 {
        return AggregateAverages::default();
    }

    let n = count as f64;
    AggregateAverages {
        ask_change: crate::indicators::math::round(ask_diff_sum / n, 4),
        bid_change: crate::indicators::math::round(bid_diff_sum / n, 4),
        change_1m: crate::indicators::math::round(change_1m_sum / n, 2),
        change_20m: crate::indicators::math::round(change_20m_sum / n, 2),
        max10: crate::indicators::math::round(max10_sum / n, 2),
        min10: crate::indicators::math::round(min10_sum / n, 2),
        tickers_count: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LiquidationCounts, Ticker};
    use chrono::Utc;
    use std::collections::HashMap;

    fn ticker(ask: f64, bid: f64, change_1m: f64, change_20m: f64, max10: f64, min10: f64) -> Ticker {
        Ticker {
            symbol: "BTCUSDT".into(),
            event_time: Utc::now(),
            created_time: Utc::now(),
            ask,
            bid,
            rsi20: None,
            ask_change: None,
            bid_change: None,
            change_1m: Some(change_1m),
            change_20m: Some(change_20m),
            max_1m: ask,
            min_1m: ask,
            max_10m: Some(max10),
            min_10m: Some(min10),
            max10_diff: None,
            min10_diff: None,
        }
    }

    fn bare_tick(data: HashMap<String, Ticker>) -> Tick {
        Tick {
            start_time: Utc::now(),
            fetched_time: Utc::now(),
            created_time: Utc::now(),
            fetch_duration_ms: 0,
            handling_duration_ms: 0,
            avg_ask_change_10: None,
            liquidations: LiquidationCounts::default(),
            avg: AggregateAverages::default(),
            data,
        }
    }

    #[test]
    fn clamp_applies_after_extreme_move() {
        let engine = AggregateIndicatorEngine::new();
        let mut prev_data = HashMap::new();
        prev_data.insert("BTCUSDT".to_string(), ticker(100.0, 99.0, 1.0, 2.0, 100.0, 90.0));
        let prev = bare_tick(prev_data);
        engine.finish(prev);

        let mut curr_data = HashMap::new();
        curr_data.insert("BTCUSDT".to_string(), ticker(1000.0, 99.0, 1.0, 2.0, 1000.0, 90.0));
        let curr = bare_tick(curr_data);
        let result = engine.finish(curr);

        assert!(result.avg.ask_change <= 1.0);
    }

    #[test]
    fn no_overlapping_symbols_yields_zero_count() {
        let engine = AggregateIndicatorEngine::new();
        let mut prev_data = HashMap::new();
        prev_data.insert("ETHUSDT".to_string(), ticker(10.0, 9.0, 0.0, 0.0, 10.0, 9.0));
        engine.finish(bare_tick(prev_data));

        let mut curr_data = HashMap::new();
        curr_data.insert("BTCUSDT".to_string(), ticker(100.0, 99.0, 0.0, 0.0, 100.0, 90.0));
        let result = engine.finish(bare_tick(curr_data));

        assert_eq!(result.avg.tickers_count, 0);
    }
}
