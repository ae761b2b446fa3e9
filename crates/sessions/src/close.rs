//! A per-session close signal: lets the upstream iterator (C3) and the
//! audio drainer race a "queue has items" wakeup against "the session is
//! closing" rather than relying on thrown control flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct CloseSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    closed: AtomicBool,
    notify: Notify,
}

impl CloseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Idempotent: firing twice is a no-op on the second call.
    pub fn fire(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub async fn wait(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_immediately_once_fired() {
        let signal = CloseSignal::new();
        signal.fire();
        signal.wait().await;
        assert!(signal.is_closed());
    }

    #[test]
    fn fire_twice_is_idempotent() {
        let signal = CloseSignal::new();
        signal.fire();
        signal.fire();
        assert!(signal.is_closed());
    }

    #[test]
    fn not_closed_by_default() {
        assert!(!CloseSignal::new().is_closed());
    }
}
