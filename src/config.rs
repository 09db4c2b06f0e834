//! Configuration surface (spec.md §6). Grounded on the teacher's `env::var`
//! reads scattered through `main.rs` (`BINANCE_ENABLED`, `DB_PATH`, etc.),
//! consolidated here into one `clap::Parser` struct with the `env` feature
//! so every field is settable by flag or environment variable, matching the
//! teacher's env-first configuration style without the ad hoc scattering.

use clap::Parser;

use crate::errors::{EngineError, EngineResult};

#[derive(Debug, Clone, Parser)]
#[command(name = "tick-engine", about = "Crypto derivatives tick ingest engine")]
pub struct Config {
    /// Deployment label for logging/metrics (spec.md §6 root.ENV).
    #[arg(long, env = "ENV", default_value = "development")]
    pub env: String,

    /// Instance identifier; qualifies storage namespaces (spec.md §6 root.SERVICE_NAME).
    #[arg(long, env = "SERVICE_NAME", default_value = "tick-engine")]
    pub service_name: String,

    #[arg(long, env = "REPOSITORY_MONGO_ENABLED", default_value_t = false)]
    pub repository_mongo_enabled: bool,
    #[arg(long, env = "REPOSITORY_MONGO_URL")]
    pub repository_mongo_url: Option<String>,

    #[arg(long, env = "REPOSITORY_SQLITE_ENABLED", default_value_t = false)]
    pub repository_sqlite_enabled: bool,
    #[arg(long, env = "REPOSITORY_SQLITE_PATH", default_value = "tick-engine.db")]
    pub repository_sqlite_path: String,

    #[arg(long, env = "EXCHANGE_BINANCE_ENABLED", default_value_t = false)]
    pub exchange_binance_enabled: bool,
    #[arg(long, env = "EXCHANGE_BYBIT_ENABLED", default_value_t = false)]
    pub exchange_bybit_enabled: bool,
    #[arg(long, env = "EXCHANGE_OKX_ENABLED", default_value_t = false)]
    pub exchange_okx_enabled: bool,

    /// No production exchange adapter ships in this crate (spec.md §1
    /// Non-goals); enabling this runs the bundled synthetic generator so the
    /// pipeline is exercisable without external credentials.
    #[arg(long, env = "EXCHANGE_SIMULATED_ENABLED", default_value_t = true)]
    pub exchange_simulated_enabled: bool,

    #[arg(long, env = "NOTIFY_REDIS_URL")]
    pub notify_redis_url: Option<String>,
    #[arg(long, env = "NOTIFY_REDIS_TOPICS")]
    pub notify_redis_topics: Option<String>,

    #[arg(long, env = "NOTIFY_TELEGRAM_BOT_TOKEN")]
    pub notify_telegram_bot_token: Option<String>,
    #[arg(long, env = "NOTIFY_TELEGRAM_CHAT_ID")]
    pub notify_telegram_chat_id: Option<String>,
    /// Minimum send spacing in seconds (spec.md §6 notify.telegram.INTERVAL).
    #[arg(long, env = "NOTIFY_TELEGRAM_INTERVAL_SECS", default_value_t = 30)]
    pub notify_telegram_interval_secs: u64,

    #[arg(long, env = "NOTIFY_STDOUT_ENABLED", default_value_t = true)]
    pub notify_stdout_enabled: bool,

    #[arg(long, env = "TELEMETRY_DATADOG_ENABLED", default_value_t = false)]
    pub telemetry_datadog_enabled: bool,
    #[arg(long, env = "TELEMETRY_DATADOG_AGENT_HOST")]
    pub telemetry_datadog_agent_host: Option<String>,
    #[arg(long, env = "TELEMETRY_DATADOG_AGENT_PORT")]
    pub telemetry_datadog_agent_port: Option<u16>,

    /// Per-tick exchange fetch deadline (spec.md §4.2).
    #[arg(long, env = "FETCH_DEADLINE_MS", default_value_t = 2_000)]
    pub fetch_deadline_ms: u64,
}

impl Config {
    /// Fatal startup validation (spec.md §7 "Configuration failure"):
    /// exactly one exchange source enabled, at most one persistence backend.
    pub fn validate(&self) -> EngineResult<()> {
        let exchanges_enabled = [
            self.exchange_binance_enabled,
            self.exchange_bybit_enabled,
            self.exchange_okx_enabled,
            self.exchange_simulated_enabled,
        ]
        .iter()
        .filter(|&&enabled| enabled)
        .count();
        if exchanges_enabled != 1 {
            return Err(EngineError::Configuration(format!(
                "exactly one exchange source must be enabled, found {exchanges_enabled}"
            )));
        }

        let repositories_enabled = [self.repository_mongo_enabled, self.repository_sqlite_enabled]
            .iter()
            .filter(|&&enabled| enabled)
            .count();
        if repositories_enabled > 1 {
            return Err(EngineError::Configuration(format!(
                "at most one persistence backend may be enabled, found {repositories_enabled}"
            )));
        }

        if self.repository_mongo_enabled && self.repository_mongo_url.is_none() {
            return Err(EngineError::Configuration(
                "repository.mongo enabled without REPOSITORY_MONGO_URL".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            env: "test".into(),
            service_name: "tick-engine".into(),
            repository_mongo_enabled: false,
            repository_mongo_url: None,
            repository_sqlite_enabled: false,
            repository_sqlite_path: "x.db".into(),
            exchange_binance_enabled: false,
            exchange_bybit_enabled: false,
            exchange_okx_enabled: false,
            exchange_simulated_enabled: true,
            notify_redis_url: None,
            notify_redis_topics: None,
            notify_telegram_bot_token: None,
            notify_telegram_chat_id: None,
            notify_telegram_interval_secs: 30,
            notify_stdout_enabled: true,
            telemetry_datadog_enabled: false,
            telemetry_datadog_agent_host: None,
            telemetry_datadog_agent_port: None,
            fetch_deadline_ms: 2000,
        }
    }

    #[test]
    fn rejects_no_exchange_enabled() {
        let mut cfg = base();
        cfg.exchange_simulated_enabled = false;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_multiple_exchanges_enabled() {
        let mut cfg = base();
        cfg.exchange_binance_enabled = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_two_persistence_backends() {
        let mut cfg = base();
        cfg.repository_mongo_enabled = true;
        cfg.repository_mongo_url = Some("mongodb://localhost".into());
        cfg.repository_sqlite_enabled = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_default_config() {
        assert!(base().validate().is_ok());
    }
}
