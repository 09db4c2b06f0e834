use async_trait::async_trait;

use crate::errors::EngineResult;
use crate::notify::events::{Event, NotificationData};

/// A notification destination (spec.md §6). Concrete sinks (message bus,
/// chat bot) are external collaborators and out of scope; only the console
/// sink is implemented directly in this crate (see `crate::adapters::stdout`)
/// since it has no external system to integrate with.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Each call is bounded by a 5s deadline at the Hub (spec.md §4.6); the
    /// sink itself does not need to enforce it.
    async fn send(&self, event: &Event) -> EngineResult<()>;
}

/// Renders a [`NotificationData`] into zero or more events for one topic's
/// subscription. Implementations must ignore input variants they don't
/// support rather than panicking (spec.md §9 "explicit mismatch-drop").
pub trait Formatter: Send + Sync {
    fn format(&self, data: &NotificationData<'_>) -> Vec<Event>;
}
