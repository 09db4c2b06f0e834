use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Liquidation side, per spec.md §3 convention: `SELL` is a forced
/// long-position liquidation, `BUY` is a forced short-position liquidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiquidationSide {
    Buy,
    Sell,
}

/// Raw liquidation event as received from the exchange port's push stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLiquidation {
    pub symbol: Symbol,
    pub side: LiquidationSide,
    pub price: f64,
    pub quantity: f64,
    pub event_time: DateTime<Utc>,
}

/// Validated, persisted liquidation (spec.md §3 "Liquidation (input)").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidation {
    pub symbol: Symbol,
    pub side: LiquidationSide,
    pub price: f64,
    pub quantity: f64,
    pub total: f64,
    pub event_time: DateTime<Utc>,
    pub stored_time: DateTime<Utc>,
}

impl Liquidation {
    pub fn from_raw(raw: RawLiquidation, stored_time: DateTime<Utc>) -> Self {
        Self {
            symbol: raw.symbol,
            side: raw.side,
            price: raw.price,
            quantity: raw.quantity,
            total: raw.price * raw.quantity,
            event_time: raw.event_time,
            stored_time,
        }
    }

    /// spec.md §4.5 validation rule.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
            && self.price >= 0.0
            && self.quantity >= 0.0
            && self.event_time.timestamp_millis() != 0
            && self.stored_time.timestamp_millis() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_price_times_quantity() {
        let raw = RawLiquidation {
            symbol: "BTCUSDT".into(),
            side: LiquidationSide::Sell,
            price: 100.0,
            quantity: 2.5,
            event_time: Utc::now(),
        };
        let liq = Liquidation::from_raw(raw, Utc::now());
        assert_eq!(liq.total, 250.0);
    }

    #[test]
    fn rejects_empty_symbol() {
        let liq = Liquidation {
            symbol: String::new(),
            side: LiquidationSide::Buy,
            price: 1.0,
            quantity: 1.0,
            total: 1.0,
            event_time: Utc::now(),
            stored_time: Utc::now(),
        };
        assert!(!liq.is_valid());
    }
}
