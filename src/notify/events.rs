//! Topic set, event payloads and the closed input sum type for formatters.
//!
//! spec.md §9 calls for dynamic-cast-style `format(data: any)` to be
//! re-expressed as a closed sum type over supported inputs (today, only
//! `Tick`) plus an explicit mismatch-drop — grounded on the teacher's own
//! closed `SignalType`/`PatternType` enums (`models.rs`,
//! `signals/correlator.rs`) rather than any trait-object `dyn Any` dispatch.

use crate::domain::{Tick, Ticker};

/// The closed set of topics a subscription can register for (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Ticker,
    AlertMarketState,
    TickInfo,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Ticker, Topic::AlertMarketState, Topic::TickInfo];
}

/// The only input a formatter is ever asked to render. Adding a new
/// publishable kind means adding a variant here, not widening an `Any`
/// boundary.
#[derive(Debug, Clone)]
pub enum NotificationData<'a> {
    Tick(&'a Tick),
}

/// One emitted notification, ready for a [`NotificationSink`](crate::ports::NotificationSink).
#[derive(Debug, Clone)]
pub enum Event {
    /// One per symbol in the tick (spec.md §6).
    Ticker {
        tick_without_data: Box<Tick>,
        ticker: Box<Ticker>,
    },
    /// Emitted only when a threshold is crossed (spec.md §6).
    AlertMarketState(String),
    /// Fixed-column table row; header row emitted every 10th tick.
    TickInfo(String),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Ticker { .. } => Topic::Ticker,
            Event::AlertMarketState(_) => Topic::AlertMarketState,
            Event::TickInfo(_) => Topic::TickInfo,
        }
    }
}
