//! Market Snapshotter (C2): obtains a coherent order-book-top snapshot and
//! validates it before admission to a Tick (spec.md §4.2).

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::{validate_raw, RawTicker};
use crate::errors::EngineResult;
use crate::ports::ExchangeClient;

pub struct MarketSnapshotter {
    exchange: Arc<dyn ExchangeClient>,
}

impl MarketSnapshotter {
    pub fn new(exchange: Arc<dyn ExchangeClient>) -> Self {
        Self { exchange }
    }

    /// Delegates to the exchange port; failure aborts the current tick
    /// (spec.md §4.2). Tickers failing the validation rule (`symbol ≠ ∅ ∧
    /// ask > 0 ∧ bid > 0 ∧ bid ≤ ask`) are logged and dropped rather than
    /// failing the whole fetch.
    pub async fn fetch(&self, deadline: Duration) -> EngineResult<Vec<RawTicker>> {
        let raws = self.exchange.fetch_tickers(deadline).await?;
        let mut valid = Vec::with_capacity(raws.len());
        for raw in raws {
            if validate_raw(&raw) {
                valid.push(raw);
            } else {
                warn!(symbol = %raw.symbol, "dropping invalid raw ticker");
            }
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawLiquidation;
    use crate::errors::EngineResult as Result_;
    use crate::ports::LiquidationStream;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;

    struct StubExchange {
        tickers: Vec<RawTicker>,
    }

    #[async_trait]
    impl ExchangeClient for StubExchange {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_tickers(&self, _deadline: Duration) -> Result_<Vec<RawTicker>> {
            Ok(self.tickers.clone())
        }

        async fn subscribe_liquidations(&self) -> Result_<LiquidationStream> {
            let (_tx, events) = mpsc::channel::<RawLiquidation>(1);
            let (_etx, errors) = mpsc::channel(1);
            Ok(LiquidationStream { events, errors })
        }
    }

    fn raw(symbol: &str, bid: f64, ask: f64) -> RawTicker {
        RawTicker {
            symbol: symbol.to_string(),
            bid_price: bid,
            ask_price: ask,
            bid_qty: 1.0,
            ask_qty: 1.0,
            event_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn drops_invalid_tickers_keeps_valid() {
        let exchange = Arc::new(StubExchange {
            tickers: vec![raw("BTCUSDT", 99.0, 100.0), raw("ETHUSDT", 2.0, 1.0)],
        });
        let snapshotter = MarketSnapshotter::new(exchange);
        let valid = snapshotter.fetch(Duration::from_secs(1)).await.unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].symbol, "BTCUSDT");
    }
}
