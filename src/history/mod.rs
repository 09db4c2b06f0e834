pub mod symbol_history;
pub mod tick_history;

pub use symbol_history::{SymbolHistory, HISTORY_LEN};
pub use tick_history::TickHistory;
