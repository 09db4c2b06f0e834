//! In-memory liquidation window + counts query (spec.md §4.5, §3
//! "Liquidation window"). This is the default persistence backend named in
//! spec.md §6 ("in-memory is the default"); it doubles as the
//! `LiquidationRepository` port implementation since, for this backend, the
//! store and the windowed-count reader are the same data structure.
//!
//! Grounded on the teacher's bounded `VecDeque` buffer
//! (`signals/storage.rs`), generalized to purge by event age rather than by
//! a fixed element count.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::{Liquidation, LiquidationCounts, LiquidationSide};
use crate::errors::EngineResult;
use crate::ports::LiquidationRepository;

/// Windows, in seconds, named in spec.md §4.5.
const LL1_SECS: i64 = 1;
const LL2_SECS: i64 = 2;
const LL5_SECS: i64 = 5;
const LL60_SECS: i64 = 60;
const SL1_SECS: i64 = 1;
const SL2_SECS: i64 = 2;
const SL10_SECS: i64 = 10;

#[derive(Default)]
pub struct InMemoryLiquidationAggregator {
    entries: Mutex<VecDeque<Liquidation>>,
}

impl InMemoryLiquidationAggregator {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl LiquidationRepository for InMemoryLiquidationAggregator {
    async fn create(&self, liquidation: &Liquidation) -> EngineResult<()> {
        self.entries.lock().push_back(liquidation.clone());
        Ok(())
    }

    async fn counts(&self, at: DateTime<Utc>) -> EngineResult<LiquidationCounts> {
        let mut entries = self.entries.lock();

        // Opportunistic purge of anything older than the widest window
        // (spec.md §4.5 "the aggregator may purge entries older than 60s").
        let cutoff = at - chrono::Duration::seconds(LL60_SECS);
        entries.retain(|l| l.event_time >= cutoff);

        let mut counts = LiquidationCounts::default();
        for liquidation in entries.iter() {
            let age_secs = (at - liquidation.event_time).num_milliseconds() as f64 / 1000.0;
            if age_secs < 0.0 {
                continue;
            }
            match liquidation.side {
                LiquidationSide::Sell => {
                    if age_secs <= LL1_SECS as f64 {
                        counts.ll1 += 1;
                    }
                    if age_secs <= LL2_SECS as f64 {
                        counts.ll2 += 1;
                    }
                    if age_secs <= LL5_SECS as f64 {
                        counts.ll5 += 1;
                    }
                    if age_secs <= LL60_SECS as f64 {
                        counts.ll60 += 1;
                    }
                }
                LiquidationSide::Buy => {
                    if age_secs <= SL1_SECS as f64 {
                        counts.sl1 += 1;
                    }
                    if age_secs <= SL2_SECS as f64 {
                        counts.sl2 += 1;
                    }
                    if age_secs <= SL10_SECS as f64 {
                        counts.sl10 += 1;
                    }
                }
            }
        }
        Ok(counts)
    }
}
