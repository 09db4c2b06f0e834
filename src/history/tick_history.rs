//! Bounded tick history (spec.md §3 "Tick history"), appended only by the
//! engine's single owner thread (spec.md §5). Same bounded-`VecDeque` shape
//! as [`SymbolHistory`](super::SymbolHistory), reused here for the
//! aggregate-level history that `AggregateIndicatorEngine` (C4) consumes.

use std::collections::VecDeque;

use crate::domain::Tick;

use super::symbol_history::HISTORY_LEN;

#[derive(Debug, Default)]
pub struct TickHistory {
    entries: VecDeque<Tick>,
}

impl TickHistory {
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

    pub fn entries(&self) -> &VecDeque<Tick> {
        &self.entries
    }

    /// Appends `tick`, evicting the oldest entry past `HISTORY_LEN`
    /// (spec.md §8 invariant 1). Ordering is the caller's responsibility:
    /// the scheduler only ever calls this in non-decreasing `start_time`
    /// order (spec.md §5, §8 invariant 3).
    pub fn push(&mut self, tick: Tick) {
        self.entries.push_back(tick);
        while self.entries.len() > HISTORY_LEN {
            self.entries.pop_front();
        }
    }

    /// `prev = tick_history[-2]`, evaluated *after* the push (spec.md §4.4).
    pub fn previous(&self) -> Option<&Tick> {
        let n = self.entries.len();
        if n >= 2 {
            self.entries.get(n - 2)
        } else {
            None
        }
    }

    /// Mean of `avg.ask_change` over the last `n` ticks, or `None` if fewer
    /// than `n` ticks have been recorded (spec.md §4.4 `avg_ask_change_10`).
    pub fn mean_avg_ask_change(&self, n: usize) -> Option<f64> {
        if self.entries.len() < n || n == 0 {
            return None;
        }
        let sum: f64 = self
            .entries
            .iter()
            .rev()
            .take(n)
            .map(|t| t.avg.ask_change)
            .sum();
        Some(sum / n as f64)
    }
}
