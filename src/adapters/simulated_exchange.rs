//! Synthetic `ExchangeClient` (spec.md §1 Non-goals exclude concrete
//! exchange adapters — Binance/Bybit/OKX wire protocols are external
//! collaborators out of scope). This generator gives the binary something
//! runnable without one, the way the teacher's own `BinancePriceFeed`
//! exposes a `disabled()` no-op variant when no external feed is configured.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::domain::{LiquidationSide, RawLiquidation, RawTicker};
use crate::errors::EngineResult;
use crate::ports::{ExchangeClient, LiquidationStream};

/// Synthetic symbol universe for local runs/demos.
const SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT"];
const BASE_PRICE: &[f64] = &[65_000.0, 3_200.0, 140.0];

pub struct SimulatedExchange {
    tick: AtomicU64,
    rng: Mutex<StdRng>,
}

impl Default for SimulatedExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedExchange {
    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl ExchangeClient for SimulatedExchange {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch_tickers(&self, _deadline: Duration) -> EngineResult<Vec<RawTicker>> {
        let n = self.tick.fetch_add(1, Ordering::Relaxed) as f64;
        let now = Utc::now();
        let mut rng = self.rng.lock();
        let tickers = SYMBOLS
            .iter()
            .zip(BASE_PRICE.iter())
            .map(|(symbol, base)| {
                let drift = (n * 0.01).sin() * base * 0.002;
                let jitter = rng.gen_range(-1.0..=1.0) * base * 0.0005;
                let mid = base + drift + jitter;
                let spread = base * 0.0001;
                RawTicker {
                    symbol: symbol.to_string(),
                    bid_price: mid - spread,
                    ask_price: mid + spread,
                    bid_qty: 1.0,
                    ask_qty: 1.0,
                    event_time: now,
                }
            })
            .collect();
        Ok(tickers)
    }

    async fn subscribe_liquidations(&self) -> EngineResult<LiquidationStream> {
        let (tx, events) = mpsc::channel(16);
        let (_err_tx, errors) = mpsc::channel(1);

        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            loop {
                tokio::time::sleep(Duration::from_secs(7)).await;
                let idx = rng.gen_range(0..SYMBOLS.len());
                let side = if rng.gen_bool(0.5) {
                    LiquidationSide::Sell
                } else {
                    LiquidationSide::Buy
                };
                let event = RawLiquidation {
                    symbol: SYMBOLS[idx].to_string(),
                    side,
                    price: BASE_PRICE[idx],
                    quantity: rng.gen_range(0.1..1.1),
                    event_time: Utc::now(),
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(LiquidationStream { events, errors })
    }
}
