//! Console `NotificationSink` (spec.md §6 `notify.stdout`). The only sink
//! with no external system to integrate with, so it lives directly in this
//! crate rather than behind an out-of-scope boundary.

use async_trait::async_trait;

use crate::errors::EngineResult;
use crate::notify::events::Event;
use crate::ports::NotificationSink;

pub struct StdoutSink;

#[async_trait]
impl NotificationSink for StdoutSink {
    async fn send(&self, event: &Event) -> EngineResult<()> {
        match event {
            Event::Ticker { ticker, .. } => {
                println!("TICKER {} ask={} bid={}", ticker.symbol, ticker.ask, ticker.bid);
            }
            Event::AlertMarketState(body) => println!("ALERT_MARKET_STATE {body}"),
            Event::TickInfo(row) => println!("{row}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tick;
    use chrono::Utc;

    #[tokio::test]
    async fn send_never_errors() {
        let sink = StdoutSink;
        let tick = Tick {
            start_time: Utc::now(),
            fetched_time: Utc::now(),
            created_time: Utc::now(),
            fetch_duration_ms: 0,
            handling_duration_ms: 0,
            avg_ask_change_10: None,
            liquidations: Default::default(),
            avg: Default::default(),
            data: Default::default(),
        };
        let event = Event::Ticker {
            tick_without_data: Box::new(tick.without_data()),
            ticker: Box::new(crate::domain::Ticker {
                symbol: "BTCUSDT".into(),
                event_time: Utc::now(),
                created_time: Utc::now(),
                ask: 100.0,
                bid: 99.0,
                rsi20: None,
                ask_change: None,
                bid_change: None,
                change_1m: None,
                change_20m: None,
                max_1m: 100.0,
                min_1m: 100.0,
                max_10m: None,
                min_10m: None,
                max10_diff: None,
                min10_diff: None,
            }),
        };
        assert!(sink.send(&event).await.is_ok());
    }
}
