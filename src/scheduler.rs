//! Tick Scheduler (C1): drives exactly one tick attempt per second, aligned
//! to the next whole second after startup (spec.md §4.1). Grounded on the
//! teacher's `tokio::time::interval`-based polling loops in `main.rs`
//! (`MissedTickBehavior::Skip` is used there for the 60s REST fallback),
//! reused here for the spec's "late fires are not batched" requirement.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::cancellation::CancelToken;
use crate::clock::{Clock, SystemClock};
use crate::errors::EngineError;

pub struct TickScheduler {
    error_tx: mpsc::UnboundedSender<EngineError>,
    clock: Arc<dyn Clock>,
}

impl TickScheduler {
    /// Uses [`SystemClock`] for second-boundary alignment, the way every
    /// other component reads "now" through the injected [`Clock`] (spec.md
    /// §9). A non-default clock can be supplied via
    /// [`TickScheduler::with_clock`] for tests that need deterministic
    /// alignment.
    pub fn new(error_tx: mpsc::UnboundedSender<EngineError>) -> Self {
        Self::with_clock(error_tx, Arc::new(SystemClock))
    }

    pub fn with_clock(error_tx: mpsc::UnboundedSender<EngineError>, clock: Arc<dyn Clock>) -> Self {
        Self { error_tx, clock }
    }

    /// Runs until `cancel` fires. `tick_fn` is invoked once per second. A
    /// pipeline invocation is never retried within the same second; an
    /// overrun simply delays the next fire rather than queuing (spec.md §9
    /// "single-slot fire-and-forget", `MissedTickBehavior::Skip`).
    pub async fn run<F, Fut>(&self, mut cancel: CancelToken, mut tick_fn: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), EngineError>>,
    {
        let millis_into_second = self.clock.now().timestamp_subsec_millis().min(999) as u64;
        tokio::time::sleep(Duration::from_millis(1000 - millis_into_second)).await;

        let mut interval = tokio::time::interval_at(Instant::now(), Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("tick scheduler starting");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("tick scheduler cancelled");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(err) = tick_fn().await {
                        error!(%err, "tick pipeline failed");
                        let _ = self.error_tx.send(err);
                    }
                }
            }
        }
    }
}
