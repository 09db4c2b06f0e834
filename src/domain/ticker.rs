use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Raw top-of-book input from an exchange port (spec.md §3 "Raw ticker").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTicker {
    pub symbol: Symbol,
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_qty: f64,
    pub ask_qty: f64,
    pub event_time: DateTime<Utc>,
}

/// Derived per-symbol snapshot carried inside a [`Tick`](super::Tick).
///
/// Values leaving the engine are always owned copies, never references into
/// `SymbolHistory` — see spec.md §9: later minute compaction must not be
/// able to mutate an already-published `Ticker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Symbol,
    pub event_time: DateTime<Utc>,
    pub created_time: DateTime<Utc>,
    pub ask: f64,
    pub bid: f64,
    pub rsi20: Option<f64>,
    pub ask_change: Option<f64>,
    pub bid_change: Option<f64>,
    pub change_1m: Option<f64>,
    pub change_20m: Option<f64>,
    pub max_1m: f64,
    pub min_1m: f64,
    pub max_10m: Option<f64>,
    pub min_10m: Option<f64>,
    pub max10_diff: Option<f64>,
    pub min10_diff: Option<f64>,
}

impl Ticker {
    /// Build the initial candidate from a raw ticker, before any history
    /// exists for the symbol. `max_1m`/`min_1m` seed from `ask` per spec.md
    /// §4.3's history update discipline ("initialise max_1m = min_1m = ask").
    pub fn seed(raw: &RawTicker, created_time: DateTime<Utc>) -> Self {
        Self {
            symbol: raw.symbol.clone(),
            event_time: raw.event_time,
            created_time,
            ask: raw.ask_price,
            bid: raw.bid_price,
            rsi20: None,
            ask_change: None,
            bid_change: None,
            change_1m: None,
            change_20m: None,
            max_1m: raw.ask_price,
            min_1m: raw.ask_price,
            max_10m: None,
            min_10m: None,
            max10_diff: None,
            min10_diff: None,
        }
    }

    /// spec.md §3 Ticker invariant: `ask > 0 ∧ bid > 0 ∧ bid ≤ ask`.
    pub fn is_valid(&self) -> bool {
        self.ask > 0.0 && self.bid > 0.0 && self.bid <= self.ask
    }
}

/// spec.md §4.2 validation rule, applied before a raw ticker is admitted to
/// a [`Tick`](super::Tick): `symbol ≠ ∅ ∧ ask > 0 ∧ bid > 0 ∧ bid ≤ ask`.
pub fn validate_raw(raw: &RawTicker) -> bool {
    !raw.symbol.is_empty() && raw.ask_price > 0.0 && raw.bid_price > 0.0 && raw.bid_price <= raw.ask_price
}
