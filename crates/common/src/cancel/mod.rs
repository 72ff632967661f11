//! Request-scoped cancellation
//!
//! A `Cancellation` fires when its `CancelHandle` is triggered or when an
//! optional deadline passes. Store calls are raced against it so an abort
//! surfaces as `AppError::Cancelled` instead of a partial result.

use crate::errors::{AppError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Caller side of a cancellation token
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace never fails, even with no live receivers
        self.sender.send_replace(true);
    }
}

/// Engine side of a cancellation token
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    signal: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// A token that never fires
    pub fn none() -> Self {
        Self::default()
    }

    /// A token fired by the returned handle
    pub fn new() -> (CancelHandle, Self) {
        let (sender, receiver) = watch::channel(false);
        (
            CancelHandle { sender },
            Self {
                signal: Some(receiver),
                deadline: None,
            },
        )
    }

    /// Fire automatically once `timeout` has elapsed
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn is_cancelled(&self) -> bool {
        let signalled = self.signal.as_ref().map(|rx| *rx.borrow()).unwrap_or(false);
        let expired = self.deadline.map(|d| Instant::now() >= d).unwrap_or(false);
        signalled || expired
    }

    /// Fail fast if the token already fired
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(self.error());
        }
        Ok(())
    }

    /// Run `fut` unless the token fires first
    pub async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.fired() => Err(self.error()),
            out = fut => out,
        }
    }

    /// Resolves when the token fires; pending forever for `none()`
    pub async fn fired(&self) {
        let signal = async {
            match &self.signal {
                Some(rx) => {
                    let mut rx = rx.clone();
                    loop {
                        let fired = *rx.borrow_and_update();
                        if fired {
                            return;
                        }
                        if rx.changed().await.is_err() {
                            // handle dropped without cancelling
                            std::future::pending::<()>().await;
                        }
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = signal => {}
            _ = deadline => {}
        }
    }

    fn error(&self) -> AppError {
        let expired = self.deadline.map(|d| Instant::now() >= d).unwrap_or(false);
        AppError::Cancelled {
            reason: if expired {
                "deadline exceeded".to_string()
            } else {
                "cancelled by caller".to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_none_never_fires() {
        let cancel = Cancellation::none();
        assert!(!cancel.is_cancelled());
        let out = cancel.guard(async { Ok(5) }).await.unwrap();
        assert_eq!(out, 5);
    }

    #[tokio::test]
    async fn test_handle_cancels_pending_work() {
        let (handle, cancel) = Cancellation::new();

        let work = cancel.guard(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });
        handle.cancel();

        let err = work.await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled { .. }));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_deadline_fires() {
        let cancel = Cancellation::none().with_timeout(Duration::from_millis(10));

        let err = cancel
            .guard(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        match err {
            AppError::Cancelled { reason } => assert_eq!(reason, "deadline exceeded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (handle, cancel) = Cancellation::new();
        drop(handle);
        assert!(cancel.check().is_ok());
        assert_eq!(cancel.guard(async { Ok("done") }).await.unwrap(), "done");
    }
}
