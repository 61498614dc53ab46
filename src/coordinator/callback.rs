//! Single-assignment completion handles
//!
//! The herder hands out a [`PendingOperation`] for every asynchronous query and
//! keeps the matching [`Callback`]. Completing the callback resolves the
//! operation exactly once. If the callback is dropped without being completed,
//! the waiter observes [`WaitError::Interrupted`].

use crate::common::{Error, Result};
use futures_util::future::{self, BoxFuture, FutureExt};
use std::time::Duration;
use tokio::sync::oneshot;

/// Why waiting on a [`PendingOperation`] did not produce a value.
#[derive(thiserror::Error, Debug)]
pub enum WaitError {
    #[error("operation did not complete within {0:?}")]
    TimedOut(Duration),

    #[error("operation was abandoned before completing")]
    Interrupted,

    #[error(transparent)]
    Failed(Error),
}

/// Completer side of a pending operation.
pub struct Callback<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> Callback<T> {
    /// Resolve the operation. Returns false if nobody is waiting any more
    /// (the request already timed out).
    pub fn complete(self, result: Result<T>) -> bool {
        self.tx.send(result).is_ok()
    }

    pub fn succeed(self, value: T) -> bool {
        self.complete(Ok(value))
    }

    pub fn fail(self, error: Error) -> bool {
        self.complete(Err(error))
    }
}

/// Waiter side of a pending operation.
pub struct PendingOperation<T> {
    inner: BoxFuture<'static, std::result::Result<T, WaitError>>,
}

/// Create a linked callback / pending operation pair.
pub fn callback<T: Send + 'static>() -> (Callback<T>, PendingOperation<T>) {
    let (tx, rx) = oneshot::channel();
    let inner = rx
        .map(|received| match received {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(WaitError::Failed(e)),
            Err(_) => Err(WaitError::Interrupted),
        })
        .boxed();
    (Callback { tx }, PendingOperation { inner })
}

impl<T: Send + 'static> PendingOperation<T> {
    /// An operation that is already resolved.
    pub fn ready(result: Result<T>) -> Self {
        Self {
            inner: future::ready(result.map_err(WaitError::Failed)).boxed(),
        }
    }

    /// Transform the success value once it arrives.
    pub fn map<R, F>(self, f: F) -> PendingOperation<R>
    where
        R: Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        PendingOperation {
            inner: self.inner.map(|result| result.map(f)).boxed(),
        }
    }

    /// Wait for the operation to resolve, giving up after `timeout`.
    ///
    /// Giving up does not cancel the work behind the operation; a late
    /// completion is simply dropped.
    pub async fn wait(self, timeout: Duration) -> std::result::Result<T, WaitError> {
        match tokio::time::timeout(timeout, self.inner).await {
            Ok(result) => result,
            Err(_) => Err(WaitError::TimedOut(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_completed_from_another_task() {
        let (cb, pending) = callback::<Vec<String>>();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cb.succeed(vec!["conn1".to_string()]);
        });
        let value = pending.wait(TIMEOUT).await.unwrap();
        assert_eq!(value, vec!["conn1".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_is_delivered() {
        let (cb, pending) = callback::<u32>();
        assert!(cb.fail(Error::NotLeader("http://leader:8083".into())));
        match pending.wait(TIMEOUT).await {
            Err(WaitError::Failed(Error::NotLeader(url))) => assert_eq!(url, "http://leader:8083"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let (_cb, pending) = callback::<u32>();
        let result = pending.wait(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(WaitError::TimedOut(_))));
    }

    #[tokio::test]
    async fn test_dropped_callback_interrupts() {
        let (cb, pending) = callback::<u32>();
        drop(cb);
        let result = pending.wait(TIMEOUT).await;
        assert!(matches!(result, Err(WaitError::Interrupted)));
    }

    #[tokio::test]
    async fn test_late_completion_is_discarded() {
        let (cb, pending) = callback::<u32>();
        let _ = pending.wait(Duration::from_millis(5)).await;
        assert!(!cb.succeed(1));
    }

    #[tokio::test]
    async fn test_ready_and_map() {
        let pending = PendingOperation::ready(Ok(2u32)).map(|n| n * 21);
        assert_eq!(pending.wait(TIMEOUT).await.unwrap(), 42);

        let failed = PendingOperation::<u32>::ready(Err(Error::RebalanceNeeded("x".into())))
            .map(|n| n + 1);
        assert!(matches!(
            failed.wait(TIMEOUT).await,
            Err(WaitError::Failed(Error::RebalanceNeeded(_)))
        ));
    }
}
