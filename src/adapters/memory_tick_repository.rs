//! Default `TickRepository` backend (spec.md §6 "in-memory is the
//! default"). Grounded on the same bounded-`VecDeque` shape the rest of the
//! crate uses for history (`crate::history`), guarded by a `parking_lot::Mutex`
//! the way the teacher's signal storage guards its own in-process buffer.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::Tick;
use crate::errors::EngineResult;
use crate::history::HISTORY_LEN;
use crate::ports::TickRepository;

#[derive(Default)]
pub struct MemoryTickRepository {
    entries: Mutex<VecDeque<Tick>>,
}

impl MemoryTickRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(HISTORY_LEN)),
        }
    }
}

#[async_trait]
impl TickRepository for MemoryTickRepository {
    async fn create(&self, tick: &Tick) -> EngineResult<()> {
        let mut entries = self.entries.lock();
        entries.push_back(tick.clone());
        while entries.len() > HISTORY_LEN {
            entries.pop_front();
        }
        Ok(())
    }

    async fn history_since(&self, since: DateTime<Utc>) -> EngineResult<Vec<Tick>> {
        let entries = self.entries.lock();
        Ok(entries
            .iter()
            .filter(|t| t.created_time >= since)
            .cloned()
            .collect())
    }
}
