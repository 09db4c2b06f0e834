use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{RawLiquidation, RawTicker};
use crate::errors::EngineResult;

/// Channel pair returned by [`ExchangeClient::subscribe_liquidations`].
///
/// The port is expected to self-heal: reconnect with bounded backoff
/// (default 5s) and enforce a read deadline per message (default 60-120s),
/// per spec.md §6. Consumers (C5) only observe `events`/`errors`; they never
/// see reconnect attempts directly.
pub struct LiquidationStream {
    pub events: mpsc::Receiver<RawLiquidation>,
    pub errors: mpsc::Receiver<EngineResult<()>>,
}

/// The one external collaborator this crate depends on for market data
/// (spec.md §6). Concrete adapters (Binance/Bybit/OKX HTTP + websocket
/// clients) are out of scope; only the contract is specified here.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the full order-book top for every tradable symbol. Must
    /// complete within `deadline` or return an `EngineError::Exchange`.
    async fn fetch_tickers(&self, deadline: Duration) -> EngineResult<Vec<RawTicker>>;

    /// Open the persistent liquidation push stream.
    async fn subscribe_liquidations(&self) -> EngineResult<LiquidationStream>;
}
