//! Minimal cooperative cancellation signal threaded through every
//! long-lived loop (spec.md §5 "Cancellation"). A `watch` channel rather
//! than an external crate, matching the teacher's preference for small
//! `tokio::sync` primitives over extra dependencies where the standard
//! library/`tokio` already covers the need.

use tokio::sync::watch;

#[derive(Clone)]
pub struct CancelHandle(watch::Sender<bool>);

#[derive(Clone)]
pub struct CancelToken(watch::Receiver<bool>);

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelToken(rx))
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation has been signalled. Safe to await
    /// repeatedly and to race against other branches in `tokio::select!`.
    pub async fn cancelled(&mut self) {
        let _ = self.0.wait_for(|cancelled| *cancelled).await;
    }
}
