//! Per-symbol bounded history (spec.md §3 "Per-symbol history", §4.3 "History
//! update discipline"). Grounded on the teacher's bounded `VecDeque` buffer
//! in `signals/storage.rs` (`SignalStorage`), generalized from a flat
//! eviction-on-push ring to the per-minute compaction spec.md requires.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::domain::{RawTicker, Ticker};

/// Fixed history window shared by per-symbol and tick history (spec.md
/// GLOSSARY "History window H").
pub const HISTORY_LEN: usize = 25;

fn trunc_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    let truncated = secs - secs.rem_euclid(60);
    DateTime::<Utc>::from_timestamp(truncated, 0).unwrap_or(t)
}

/// Bounded, one-entry-per-minute history for a single symbol.
#[derive(Debug, Default)]
pub struct SymbolHistory {
    entries: VecDeque<Ticker>,
}

impl SymbolHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &VecDeque<Ticker> {
        &self.entries
    }

    /// Applies the history update discipline of spec.md §4.3 for one
    /// incoming raw ticker. Returns the mirrored `Ticker` entry — with
    /// `max_1m`/`min_1m` absorbing the new `ask` — that indicator math
    /// should treat as the current ticker, or `None` if the update was
    /// dropped as stale (spec.md §8 invariant 7).
    pub fn apply(&mut self, raw: &RawTicker, created_time: DateTime<Utc>) -> Option<Ticker> {
        let starts_new_minute = match self.entries.back() {
            None => true,
            Some(last) => trunc_minute(last.created_time) != trunc_minute(created_time),
        };

        if starts_new_minute {
            let seeded = Ticker::seed(raw, created_time);
            self.entries.push_back(seeded.clone());
            while self.entries.len() > HISTORY_LEN {
                self.entries.pop_front();
            }
            return Some(seeded);
        }

        // Non-empty guaranteed by `starts_new_minute == false`.
        let last = self.entries.back().expect("history non-empty");
        if last.created_time > created_time {
            return None;
        }

        let last = self.entries.back_mut().expect("history non-empty");
        last.max_1m = last.max_1m.max(raw.ask_price);
        last.min_1m = last.min_1m.min(raw.ask_price);
        last.ask = raw.ask_price;
        last.bid = raw.bid_price;
        last.created_time = created_time;
        last.event_time = raw.event_time;
        Some(last.clone())
    }
}
