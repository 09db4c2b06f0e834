//! Default implementations of the external-collaborator ports (spec.md §6).
//! Concrete production exchange/notification integrations are out of scope;
//! these are the minimal defaults needed to run the engine end-to-end.

pub mod memory_tick_repository;
pub mod simulated_exchange;
pub mod sqlite_tick_repository;
pub mod stdout_sink;

pub use memory_tick_repository::MemoryTickRepository;
pub use simulated_exchange::SimulatedExchange;
pub use sqlite_tick_repository::SqliteTickRepository;
pub use stdout_sink::StdoutSink;
