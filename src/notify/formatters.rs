//! Concrete [`Formatter`] implementations for the three closed topics
//! (spec.md §4.6, §6). Grounded on the teacher's signal-description
//! formatting in `signals/detector.rs` (building human-readable strings from
//! structured data) and its periodic `tokio::time::interval` polling style
//! in `main.rs` for the "every 10th tick" header cadence.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::notify::events::{Event, NotificationData, Topic};
use crate::ports::Formatter;

/// Emits one [`Event::Ticker`] per symbol present in the tick.
pub struct TickerFormatter;

impl Formatter for TickerFormatter {
    fn format(&self, data: &NotificationData<'_>) -> Vec<Event> {
        let NotificationData::Tick(tick) = data;
        let envelope = tick.without_data();
        tick.data
            .values()
            .map(|ticker| Event::Ticker {
                tick_without_data: Box::new(envelope.clone()),
                ticker: Box::new(ticker.clone()),
            })
            .collect()
    }
}

/// Default alert thresholds (spec.md §6).
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub avg_change_1m: f64,
    pub avg_change_20m: f64,
    pub ticker_change_1m: f64,
    pub ll5: u64,
    pub ll60: u64,
    pub sl10: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            avg_change_1m: 2.0,
            avg_change_20m: 5.0,
            ticker_change_1m: 15.0,
            ll5: 500,
            ll60: 2000,
            sl10: 30,
        }
    }
}

/// Emits a single preformatted `ALERT_MARKET_STATE` event only when one of
/// the spec.md §6 thresholds is crossed; otherwise emits nothing.
pub struct AlertFormatter {
    thresholds: AlertThresholds,
}

impl AlertFormatter {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }
}

impl Formatter for AlertFormatter {
    fn format(&self, data: &NotificationData<'_>) -> Vec<Event> {
        let NotificationData::Tick(tick) = data;
        let t = &self.thresholds;

        let market_wide = tick.avg.change_1m.abs() >= t.avg_change_1m
            || tick.avg.change_20m.abs() >= t.avg_change_20m;
        let single_symbol = tick.data.values().any(|ticker| {
            ticker
                .change_1m
                .map(|c| c.abs() >= t.ticker_change_1m)
                .unwrap_or(false)
        });
        let liquidation_spike = tick.liquidations.ll5 > t.ll5
            || tick.liquidations.ll60 > t.ll60
            || tick.liquidations.sl10 > t.sl10;

        if !(market_wide || single_symbol || liquidation_spike) {
            return Vec::new();
        }

        let header = if market_wide || single_symbol {
            "Significant Market Move"
        } else {
            "Liquidation Spike"
        };
        let body = format!(
            "{header}: avg.change_1m={:.2} avg.change_20m={:.2} LL5={} LL60={} SL10={}",
            tick.avg.change_1m,
            tick.avg.change_20m,
            tick.liquidations.ll5,
            tick.liquidations.ll60,
            tick.liquidations.sl10
        );
        vec![Event::AlertMarketState(body)]
    }
}

/// Renders a fixed-column table row; a header row is emitted every 10th
/// tick (spec.md §6). The counter is process-lifetime state, matching the
/// single-owner-thread contract ticks are produced under (spec.md §5).
pub struct TickInfoFormatter {
    tick_count: AtomicU64,
}

impl Default for TickInfoFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickInfoFormatter {
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
        }
    }

    const HEADER: &'static str = "start_time            | tickers | avg.ask_change | avg.change_1m | LL60 | SL10";

    fn row(tick: &crate::domain::Tick) -> String {
        format!(
            "{:<23}| {:<8}| {:<15.4}| {:<15.2}| {:<5}| {:<5}",
            tick.start_time.to_rfc3339(),
            tick.avg.tickers_count,
            tick.avg.ask_change,
            tick.avg.change_1m,
            tick.liquidations.ll60,
            tick.liquidations.sl10,
        )
    }
}

impl Formatter for TickInfoFormatter {
    fn format(&self, data: &NotificationData<'_>) -> Vec<Event> {
        let NotificationData::Tick(tick) = data;
        let n = self.tick_count.fetch_add(1, Ordering::SeqCst);
        let mut out = Vec::with_capacity(2);
        if n % 10 == 0 {
            out.push(Event::TickInfo(Self::HEADER.to_string()));
        }
        out.push(Event::TickInfo(Self::row(tick)));
        out
    }
}

/// Convenience for wiring default formatters per topic.
pub fn default_formatter(topic: Topic) -> std::sync::Arc<dyn Formatter> {
    match topic {
        Topic::Ticker => std::sync::Arc::new(TickerFormatter),
        Topic::AlertMarketState => std::sync::Arc::new(AlertFormatter::new(AlertThresholds::default())),
        Topic::TickInfo => std::sync::Arc::new(TickInfoFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AggregateAverages, LiquidationCounts, Tick};
    use chrono::Utc;
    use std::collections::HashMap;

    fn tick_with(avg_change_1m: f64) -> Tick {
        Tick {
            start_time: Utc::now(),
            fetched_time: Utc::now(),
            created_time: Utc::now(),
            fetch_duration_ms: 0,
            handling_duration_ms: 0,
            avg_ask_change_10: None,
            liquidations: LiquidationCounts::default(),
            avg: AggregateAverages {
                change_1m: avg_change_1m,
                ..Default::default()
            },
            data: HashMap::new(),
        }
    }

    #[test]
    fn alert_silent_below_threshold() {
        let formatter = AlertFormatter::new(AlertThresholds::default());
        let tick = tick_with(1.5);
        assert!(formatter.format(&NotificationData::Tick(&tick)).is_empty());
    }

    #[test]
    fn alert_fires_at_threshold() {
        let formatter = AlertFormatter::new(AlertThresholds::default());
        let tick = tick_with(2.0);
        let events = formatter.format(&NotificationData::Tick(&tick));
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::AlertMarketState(body) => assert!(body.starts_with("Significant Market Move")),
            _ => panic!("expected AlertMarketState"),
        }
    }

    #[test]
    fn tick_info_emits_header_every_tenth_row() {
        let formatter = TickInfoFormatter::new();
        let tick = tick_with(0.0);
        for i in 0..10 {
            let events = formatter.format(&NotificationData::Tick(&tick));
            if i == 0 {
                assert_eq!(events.len(), 2);
            } else {
                assert_eq!(events.len(), 1);
            }
        }
        let events = formatter.format(&NotificationData::Tick(&tick));
        assert_eq!(events.len(), 2);
    }
}
