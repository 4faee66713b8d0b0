//! Cooperative shutdown handle
//!
//! A [`Shutdown`] is cloned into every component of a running export. The
//! signal handler calls [`Shutdown::interrupt`]; the coordinator calls
//! [`Shutdown::cancel`] on the first reported error. Neither can be undone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared cancellation token plus an "interrupted by the user" flag
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    interrupted: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create a handle that has not fired
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an external interrupt and cancel every job
    ///
    /// The interrupted flag is set before the token fires, so anything woken
    /// by the cancellation already sees it.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.token.cancel();
    }

    /// Cancel every job without marking the run as interrupted
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested for any reason
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether an external interrupt was received
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// The underlying token, for `select!` on [`CancellationToken::cancelled`]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_has_not_fired() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_cancelled());
        assert!(!shutdown.is_interrupted());
    }

    #[test]
    fn test_cancel_does_not_mark_interrupted() {
        let shutdown = Shutdown::new();
        shutdown.cancel();
        assert!(shutdown.is_cancelled());
        assert!(!shutdown.is_interrupted());
    }

    #[test]
    fn test_interrupt_is_visible_through_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        clone.interrupt();
        assert!(shutdown.is_cancelled());
        assert!(shutdown.is_interrupted());

        // Firing again is harmless
        shutdown.cancel();
        assert!(shutdown.is_interrupted());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();
        let handle = tokio::spawn(async move { waiter.token().cancelled().await });
        shutdown.cancel();
        handle.await.unwrap();
    }
}
