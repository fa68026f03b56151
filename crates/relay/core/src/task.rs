//! A group of tasks sharing one cancellation token.

use std::{error::Error as StdError, future::Future};

use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Boxed error returned by a failed task.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Outcome of a task that did not complete successfully.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The task stopped because the group was cancelled.
    #[error("task cancelled")]
    Cancelled,

    /// The task failed.
    #[error("{task} failed: {source}")]
    Failed {
        /// Name of the failed task.
        task: String,
        /// Failure cause.
        #[source]
        source: BoxError,
    },

    /// The task panicked or was aborted.
    #[error("task join error: {0}")]
    Join(String),
}

impl TaskError {
    /// Creates a [`TaskError::Failed`].
    pub fn failed(task: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Failed { task: task.into(), source: source.into() }
    }

    /// Returns true for errors caused by cancellation.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Tasks that live and die together.
///
/// The first task returning an error other than [`TaskError::Cancelled`] cancels the shared
/// token, asking every other task to wind down.
#[derive(Debug)]
pub struct TaskGroup {
    tasks: JoinSet<Result<(), TaskError>>,
    cancel: CancellationToken,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    /// Creates an empty group with a fresh token.
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// Creates an empty group driven by the given token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self { tasks: JoinSet::new(), cancel }
    }

    /// Returns the group token. Tasks select on it at every suspension point.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels the group.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the group was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of tasks still owned by the group.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the group owns no task.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawns a named task into the group.
    pub fn spawn<F>(&mut self, name: impl Into<String>, task: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let name = name.into();
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            let result = task.await;
            match &result {
                Ok(()) => debug!(target: "relay::task", task = %name, "Task completed"),
                Err(err) if err.is_cancelled() => {
                    debug!(target: "relay::task", task = %name, "Task stopped on cancellation")
                }
                Err(err) => {
                    error!(target: "relay::task", task = %name, %err, "Task failed, cancelling task group");
                    cancel.cancel();
                }
            }
            result
        });
    }

    /// Waits for every task to finish.
    ///
    /// Returns the first failure, preferring real failures over cancellations.
    pub async fn wait(mut self) -> Result<(), TaskError> {
        let mut first: Option<TaskError> = None;

        while let Some(joined) = self.tasks.join_next().await {
            let result = joined.unwrap_or_else(|err| Err(TaskError::Join(err.to_string())));
            let Err(err) = result else { continue };

            self.cancel.cancel();
            match &first {
                None => first = Some(err),
                Some(prev) if prev.is_cancelled() && !err.is_cancelled() => first = Some(err),
                Some(_) => {}
            }
        }

        first.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_all_ok() {
        let mut group = TaskGroup::new();
        for _ in 0..3 {
            group.spawn("ok", async { Ok(()) });
        }
        assert_eq!(group.len(), 3);
        let token = group.token();
        assert!(group.wait().await.is_ok());
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_failure_cancels_siblings() {
        let mut group = TaskGroup::new();
        let token = group.token();
        group.spawn("waiter", async move {
            token.cancelled().await;
            Err(TaskError::Cancelled)
        });
        group.spawn("failing", async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(TaskError::failed("failing", "rpc unavailable"))
        });

        let err = group.wait().await.unwrap_err();
        assert!(matches!(err, TaskError::Failed { ref task, .. } if task == "failing"));
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let mut group = TaskGroup::new();
        let token = group.token();
        let observer = group.token();
        group.spawn("panicking", async move {
            if token.is_cancelled() {
                return Ok(());
            }
            panic!("boom")
        });
        assert!(matches!(group.wait().await, Err(TaskError::Join(_))));
        assert!(observer.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_only() {
        let mut group = TaskGroup::new();
        let token = group.token();
        group.spawn("waiter", async move {
            token.cancelled().await;
            Err(TaskError::Cancelled)
        });
        group.cancel();
        assert!(group.is_cancelled());
        assert!(matches!(group.wait().await, Err(TaskError::Cancelled)));
    }
}
