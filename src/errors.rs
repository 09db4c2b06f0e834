//! Error taxonomy, per spec.md §7. Domain-level enum grounded the way
//! `cybotrade-tardis-rs` and `brbtavares-tucano` type their port errors with
//! `thiserror`; `main.rs`-level wiring still uses `anyhow::Context` the way
//! the teacher repo (`cooprefr-bettersys`) does at its call sites.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Transient exchange failure: HTTP fetch or websocket hiccup.
    #[error("exchange failure ({source_name}): {message}")]
    Exchange { source_name: String, message: String },

    /// Malformed raw ticker or invalid liquidation.
    #[error("validation failure: {0}")]
    Validation(String),

    /// Document/SQL write error.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Formatter/sink error.
    #[error("notification failure: {0}")]
    Notification(String),

    /// Fatal at startup (e.g. no exchange enabled).
    #[error("configuration failure: {0}")]
    Configuration(String),

    /// Context cancelled; propagated to all loops.
    #[error("cancelled")]
    Cancelled,
}

pub type EngineResult<T> = Result<T, EngineError>;
