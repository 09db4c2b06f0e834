//! Per-Symbol Indicator Engine (C3): maintains per-symbol history and
//! computes rolling statistics for every validated symbol, in parallel,
//! every tick (spec.md §4.3).
//!
//! Grounded on the teacher's `rayon::prelude::*` parallel iteration
//! (`main.rs`) for the worker pool, and its `parking_lot::RwLock`-guarded
//! shared map pattern for the concurrency discipline of spec.md §5: a
//! reader/writer lock over the symbol map, with per-entry mutexes so the
//! map lock itself is held only for the double-checked lookup/insert, not
//! for the whole per-symbol update.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::error;

use crate::domain::{RawTicker, Symbol, Ticker};
use crate::history::SymbolHistory;

use super::math::{pct, round, rsi};

pub struct PerSymbolIndicatorEngine {
    histories: RwLock<HashMap<Symbol, Arc<Mutex<SymbolHistory>>>>,
}

impl Default for PerSymbolIndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PerSymbolIndicatorEngine {
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Locates the per-symbol buffer, creating it lazily on first sighting
    /// (spec.md §3 "Ownership & lifecycle"). Read lock first; escalate to a
    /// write lock under double-check only on a miss.
    fn entry_for(&self, symbol: &str) -> Arc<Mutex<SymbolHistory>> {
        if let Some(existing) = self.histories.read().get(symbol) {
            return existing.clone();
        }
        self.histories
            .write()
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SymbolHistory::new())))
            .clone()
    }

    /// Computes indicators for every raw ticker concurrently, worker count
    /// equal to the host's available parallelism (rayon's global pool).
    /// Results are drained into the returned map on the calling (owner)
    /// thread. A panic computing one symbol is caught, logged, and treated
    /// as a per-symbol failure only (spec.md §4.3).
    pub fn process(&self, raws: &[RawTicker], created_time: DateTime<Utc>) -> HashMap<Symbol, Ticker> {
        let results: Vec<Option<(Symbol, Ticker)>> = raws
            .par_iter()
            .map(|raw| {
                let symbol = raw.symbol.clone();
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    self.compute_one(raw, created_time)
                }));
                match outcome {
                    Ok(Some(ticker)) => Some((symbol, ticker)),
                    Ok(None) => None,
                    Err(_) => {
                        error!(%symbol, "per-symbol indicator computation panicked");
                        None
                    }
                }
            })
            .collect();

        let mut data = HashMap::with_capacity(results.len());
        for (symbol, ticker) in results.into_iter().flatten() {
            data.insert(symbol, ticker);
        }
        data
    }

    fn compute_one(&self, raw: &RawTicker, created_time: DateTime<Utc>) -> Option<Ticker> {
        let entry = self.entry_for(&raw.symbol);
        let mut history = entry.lock();
        let mirrored = history.apply(raw, created_time)?;
        Some(compute_indicators(history.entries(), mirrored))
    }
}

/// Fills in the rolling-indicator fields on `current` using the window
/// rules of spec.md §4.3. `history` must already include `current` as its
/// last entry (post `SymbolHistory::apply`).
fn compute_indicators(history: &std::collections::VecDeque<Ticker>, mut current: Ticker) -> Ticker {
    let n = history.len();

    if n > 10 {
        let prev = &history[n - 2];
        current.change_1m = Some(pct(current.bid, prev.bid, Some(2)));

        let window: Vec<f64> = history.iter().skip(n - 10).map(|t| t.ask).collect();
        let max10 = window.iter().cloned().fold(f64::MIN, f64::max);
        let min10 = window.iter().cloned().fold(f64::MAX, f64::min);
        current.max_10m = Some(max10);
        current.min_10m = Some(min10);
        current.max10_diff = Some(pct(current.ask, max10, Some(2)));
        current.min10_diff = Some(pct(current.ask, min10, Some(2)));
        current.ask_change = Some(pct(current.ask, prev.ask, Some(2)));
        current.bid_change = Some(pct(current.bid, prev.bid, Some(2)));
    }

    if n > 21 {
        let ref20 = &history[n - 21];
        current.change_20m = Some(pct(current.bid, ref20.bid, Some(2)));

        let bids: Vec<f64> = history.iter().skip(n - 20).map(|t| t.bid).collect();
        current.rsi20 = Some(round(rsi(&bids), 1));
    }

    current
}
