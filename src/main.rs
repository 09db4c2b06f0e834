use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tick_engine::adapters::{MemoryTickRepository, SimulatedExchange, SqliteTickRepository, StdoutSink};
use tick_engine::cancellation::cancel_pair;
use tick_engine::clock::SystemClock;
use tick_engine::config::Config;
use tick_engine::engine::Engine;
use tick_engine::liquidation::{InMemoryLiquidationAggregator, LiquidationIngestor};
use tick_engine::notify::formatters::{default_formatter, AlertThresholds};
use tick_engine::notify::hub::{NotificationHub, RateLimited};
use tick_engine::notify::events::Topic;
use tick_engine::ports::{ExchangeClient, NotificationSink, TickRepository};
use tick_engine::scheduler::TickScheduler;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    let config = Config::parse();
    config
        .validate()
        .context("configuration validation failed")?;

    info!(env = %config.env, service = %config.service_name, "tick engine starting");

    let exchange: Arc<dyn ExchangeClient> = if config.exchange_simulated_enabled {
        Arc::new(SimulatedExchange::new())
    } else {
        anyhow::bail!(
            "no concrete Binance/Bybit/OKX adapter ships in this crate; enable exchange.simulated"
        );
    };

    let tick_repo: Arc<dyn TickRepository> = if config.repository_sqlite_enabled {
        Arc::new(
            SqliteTickRepository::open(&config.repository_sqlite_path)
                .context("failed to open sqlite tick repository")?,
        )
    } else {
        Arc::new(MemoryTickRepository::new())
    };

    let liquidation_repo = Arc::new(InMemoryLiquidationAggregator::new());
    let clock = Arc::new(SystemClock);

    let hub = Arc::new(NotificationHub::new());
    if config.notify_stdout_enabled {
        let sink: Arc<dyn NotificationSink> = Arc::new(StdoutSink);
        for topic in Topic::ALL {
            hub.subscribe(topic, sink.clone(), default_formatter(topic));
        }
    }
    if config.notify_telegram_bot_token.is_some() {
        let sink: Arc<dyn NotificationSink> = Arc::new(RateLimited::new(
            StdoutSink,
            Duration::from_secs(config.notify_telegram_interval_secs),
        ));
        hub.subscribe(
            Topic::AlertMarketState,
            sink,
            Arc::new(tick_engine::notify::formatters::AlertFormatter::new(
                AlertThresholds::default(),
            )),
        );
    }

    let engine = Arc::new(Engine::new(
        exchange.clone(),
        liquidation_repo.clone(),
        tick_repo,
        hub,
        clock.clone(),
        Duration::from_millis(config.fetch_deadline_ms),
    ));
    engine.warm_up().await.context("history warm-up failed")?;

    let (cancel_handle, cancel_token) = cancel_pair();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();

    let scheduler_engine = engine.clone();
    let scheduler_cancel = cancel_token.clone();
    let scheduler_clock = clock.clone();
    let scheduler_handle = tokio::spawn(async move {
        let scheduler = TickScheduler::with_clock(error_tx, scheduler_clock);
        scheduler
            .run(scheduler_cancel, || {
                let engine = scheduler_engine.clone();
                async move { engine.run_once().await }
            })
            .await;
    });

    let ingestor = Arc::new(LiquidationIngestor::new());
    let ingestor_exchange = exchange.clone();
    let ingestor_repo = liquidation_repo.clone();
    let ingestor_clock = clock.clone();
    let ingestor_cancel = cancel_token.clone();
    let ingestor_handle = {
        let ingestor = ingestor.clone();
        tokio::spawn(async move {
            ingestor
                .run(ingestor_exchange, ingestor_repo, ingestor_clock, ingestor_cancel)
                .await;
        })
    };

    let error_logger = tokio::spawn(async move {
        while let Some(err) = error_rx.recv().await {
            error!(%err, "tick pipeline reported an error");
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutdown signal received");
    cancel_handle.cancel();

    let _ = scheduler_handle.await;
    let _ = ingestor_handle.await;
    error_logger.abort();

    warn!(
        consecutive_liquidation_errors = ingestor.consecutive_errors(),
        "tick engine stopped"
    );
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tick_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
