//! Core data model: symbols, raw exchange input, derived per-symbol and
//! per-second snapshots. See spec.md §3.

mod liquidation;
mod tick;
mod ticker;

pub use liquidation::{Liquidation, LiquidationSide, RawLiquidation};
pub use tick::{AggregateAverages, LiquidationCounts, Tick};
pub use ticker::{validate_raw, RawTicker, Ticker};

/// Opaque, case-sensitive exchange symbol identifier (e.g. "BTCUSDT").
///
/// A thin `String` newtype rather than an interned id: the teacher repo
/// (`Symbol` enum in `scrapers/binance_book_ticker.rs`) closes the symbol set
/// at compile time because it only ever tracks four pairs. This engine has
/// no fixed symbol universe, so it keeps the exchange's own string.
pub type Symbol = String;
