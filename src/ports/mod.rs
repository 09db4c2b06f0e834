//! External collaborator contracts (spec.md §6). These traits are the only
//! thing this crate specifies for exchange clients, repositories and
//! notification sinks — concrete adapters are external collaborators, out
//! of scope per spec.md §1, except for the minimal in-memory/stdout/sqlite
//! defaults under `crate::adapters` needed to make the engine runnable.

mod exchange;
mod notification;
mod repository;

pub use exchange::{ExchangeClient, LiquidationStream};
pub use notification::{Formatter, NotificationSink};
pub use repository::{LiquidationRepository, TickRepository};
