//! Request-scoped cancellation and deadlines

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Handed to every provider and resource call. Clones share one cancellation
/// signal; a deadline counts as cancellation once it has passed.
#[derive(Clone)]
pub struct Context {
    deadline: Option<Instant>,
    signal: Arc<watch::Sender<bool>>,
}

impl Context {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            deadline: None,
            signal: Arc::new(signal),
        }
    }

    /// Derives a context that also expires after `timeout`. Cancelling the
    /// derived context does not cancel the parent.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };

        let (signal, _) = watch::channel(self.is_cancelled());
        Self {
            deadline: Some(deadline),
            signal: Arc::new(signal),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn cancelled(&self) {
        let mut rx = self.signal.subscribe();
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = rx.wait_for(|c| *c) => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => {
                // The sender lives as long as self, so this only returns on cancel
                let _ = rx.wait_for(|c| *c).await;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timeout_expires_context() {
        let ctx = Context::new().with_timeout(Duration::from_millis(20));
        assert!(!ctx.is_cancelled());
        assert!(ctx.deadline().is_some());

        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_shared_between_clones() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());

        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.cancelled().await })
        };
        ctx.clone().cancel();
        waiter.await.unwrap();

        assert!(ctx.is_cancelled());
    }

    #[test]
    fn derived_context_keeps_earlier_deadline() {
        let parent = Context::new().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
