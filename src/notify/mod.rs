pub mod events;
pub mod formatters;
pub mod hub;

pub use hub::{NotificationHub, RateLimited};
