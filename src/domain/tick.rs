use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Symbol, Ticker};

/// Liquidation counts over the windows of spec.md §4.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidationCounts {
    pub ll1: u64,
    pub ll2: u64,
    pub ll5: u64,
    pub ll60: u64,
    pub sl1: u64,
    pub sl2: u64,
    pub sl10: u64,
}

/// Cross-symbol averages computed by the Aggregate Indicator Engine (C4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateAverages {
    pub ask_change: f64,
    pub bid_change: f64,
    pub change_1m: f64,
    pub change_20m: f64,
    pub max10: f64,
    pub min10: f64,
    pub tickers_count: u64,
}

/// One per-second engine snapshot (spec.md §3 "Tick (aggregate snapshot)").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub start_time: DateTime<Utc>,
    pub fetched_time: DateTime<Utc>,
    pub created_time: DateTime<Utc>,
    pub fetch_duration_ms: i64,
    pub handling_duration_ms: i64,
    pub avg_ask_change_10: Option<f64>,
    pub liquidations: LiquidationCounts,
    pub avg: AggregateAverages,
    pub data: HashMap<Symbol, Ticker>,
}

impl Tick {
    pub fn tickers_count(&self) -> usize {
        self.data.len()
    }

    /// spec.md §3 Tick invariant and §8 invariant 4. `tickers_count = |data|`
    /// holds by construction of [`Tick::tickers_count`]; `avg.tickers_count`
    /// is a distinct quantity (the C4 overlap count against the previous
    /// tick, spec.md §4.4) and is not part of this invariant.
    pub fn is_valid(&self) -> bool {
        self.start_time <= self.fetched_time
            && self.fetched_time <= self.created_time
            && self.created_time.timestamp_millis() != 0
    }

    /// A deep copy with `data` cleared, used as the envelope for per-symbol
    /// `TICKER` notification events (spec.md §6 "Derived-event payloads").
    pub fn without_data(&self) -> Tick {
        Tick {
            data: HashMap::new(),
            ..self.clone()
        }
    }
}
