// src/context.rs

//! Cancellation context bound to a supervised process.
//!
//! A [`Context`] fires once, either because its [`CancelHandle`] was used or
//! because its deadline passed. The first cause wins and is reported by
//! [`Context::err`] and [`Context::done`] from then on.
//!
//! Internally this is a `tokio::sync::watch` channel carrying
//! `Option<ContextError>` plus an optional deadline, so any number of clones
//! can await the same signal.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context fired.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Clone)]
pub struct Context {
    tx: Arc<watch::Sender<Option<ContextError>>>,
    deadline: Option<Instant>,
}

/// Explicit cancel side of a [`Context`].
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<Option<ContextError>>>,
}

impl Context {
    /// A context that only fires through its cancel handle.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, _rx) = watch::channel(None);
        let tx = Arc::new(tx);
        let ctx = Self {
            tx: Arc::clone(&tx),
            deadline: None,
        };
        (ctx, CancelHandle { tx })
    }

    /// A context that fires at `deadline` at the latest.
    pub fn with_deadline(deadline: Instant) -> (Self, CancelHandle) {
        let (mut ctx, handle) = Self::with_cancel();
        ctx.deadline = Some(deadline);
        (ctx, handle)
    }

    /// A context that fires `timeout` from now at the latest.
    ///
    /// A timeout too large to represent as an instant leaves the context
    /// without a deadline.
    pub fn with_timeout(timeout: Duration) -> (Self, CancelHandle) {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::with_cancel(),
        }
    }

    /// A context that never fires on its own and cannot be cancelled.
    pub fn background() -> Self {
        Self::with_cancel().0
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cause of firing, or `None` while the context is still live.
    pub fn err(&self) -> Option<ContextError> {
        let current = *self.tx.borrow();
        if current.is_some() {
            return current;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.fire(ContextError::DeadlineExceeded);
                *self.tx.borrow()
            }
            _ => None,
        }
    }

    /// Resolve once the context fires.
    ///
    /// Cancel-safe; pending forever for a context with neither a deadline nor
    /// a reachable cancel handle.
    pub async fn done(&self) -> ContextError {
        let mut rx = self.tx.subscribe();
        let cancelled = async move {
            loop {
                let current = *rx.borrow_and_update();
                if let Some(cause) = current {
                    return cause;
                }
                // The sender lives as long as `self`, so this never errors
                // while we are being polled.
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    cause = cancelled => cause,
                    _ = tokio::time::sleep_until(deadline) => {
                        self.fire(ContextError::DeadlineExceeded);
                        self.err().unwrap_or(ContextError::DeadlineExceeded)
                    }
                }
            }
            None => cancelled.await,
        }
    }

    fn fire(&self, cause: ContextError) {
        fire(&self.tx, cause);
    }
}

impl CancelHandle {
    /// Fire the context. No-op if it already fired.
    pub fn cancel(&self) {
        fire(&self.tx, ContextError::Cancelled);
    }
}

fn fire(tx: &watch::Sender<Option<ContextError>>, cause: ContextError) {
    tx.send_if_modified(|current| {
        if current.is_some() {
            return false;
        }
        *current = Some(cause);
        true
    });
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.deadline)
            .field("err", &*self.tx.borrow())
            .finish()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_fires_all_clones() {
        let (ctx, handle) = Context::with_cancel();
        let clone = ctx.clone();
        assert_eq!(ctx.err(), None);

        let waiter = tokio::spawn(async move { clone.done().await });
        handle.cancel();

        assert_eq!(waiter.await.unwrap(), ContextError::Cancelled);
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_with_deadline_exceeded() {
        let (ctx, _handle) = Context::with_timeout(Duration::from_millis(100));
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn first_cause_wins() {
        let (ctx, handle) = Context::with_timeout(Duration::from_millis(50));
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
        assert_eq!(ctx.done().await, ContextError::Cancelled);
    }

    #[tokio::test]
    async fn unrepresentable_timeout_means_no_deadline() {
        let (ctx, handle) = Context::with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ctx.deadline(), None);
        assert_eq!(ctx.err(), None);

        handle.cancel();
        assert_eq!(ctx.done().await, ContextError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn background_never_fires() {
        let ctx = Context::background();
        let res = tokio::time::timeout(Duration::from_secs(3600), ctx.done()).await;
        assert!(res.is_err());
        assert_eq!(ctx.err(), None);
    }
}
