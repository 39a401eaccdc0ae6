//! Cancellation for in-flight simulated calls.
//!
//! A [`CancelHandle`] is held by whoever started an operation (a checkout
//! step, a login form). Handing out [`CancelToken`]s lets the operation
//! notice when the shopper navigates away. Dropping the handle counts as
//! cancelling, so a discarded view never leaves a call running.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A token observing this handle.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
            _keepalive: None,
        }
    }

    /// Signal cancellation to every token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
    _keepalive: Option<Arc<watch::Sender<bool>>>,
}

impl CancelToken {
    /// A token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _keepalive: Some(Arc::new(tx)),
        }
    }

    /// Whether cancellation has been signalled or the handle dropped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once the operation should stop.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // wait_for errors once the sender is gone, which also means cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_cancel_wakes_token() {
        let handle = CancelHandle::new();
        let token = handle.token();
        assert!(!token.is_cancelled());

        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .ok();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let handle = CancelHandle::new();
        let token = handle.token();
        drop(handle);
        assert!(token.is_cancelled());
        let woke = tokio::time::timeout(Duration::from_secs(1), token.cancelled()).await;
        assert!(woke.is_ok());
    }

    #[tokio::test]
    async fn test_never_stays_pending() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
        let woke = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(woke.is_err());
    }
}
