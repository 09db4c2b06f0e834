use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Liquidation, LiquidationCounts, Tick};
use crate::errors::EngineResult;

/// Tick persistence port (spec.md §6). `history_since` is consulted once at
/// startup to warm the in-memory history (spec.md §9) and must return ticks
/// ordered ascending by `created_time`.
#[async_trait]
pub trait TickRepository: Send + Sync {
    async fn create(&self, tick: &Tick) -> EngineResult<()>;
    async fn history_since(&self, since: DateTime<Utc>) -> EngineResult<Vec<Tick>>;
}

/// Liquidation persistence + windowed-count port (spec.md §4.5, §6).
#[async_trait]
pub trait LiquidationRepository: Send + Sync {
    async fn create(&self, liquidation: &Liquidation) -> EngineResult<()>;
    async fn counts(&self, at: DateTime<Utc>) -> EngineResult<LiquidationCounts>;
}
