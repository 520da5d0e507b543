//! Task batches: a fixed set of independent async operations with
//! all-or-nothing outcome.
//!
//! Every task is spawned onto a `JoinSet` in declared order, so all of them are
//! in flight before any one has to finish. The batch resolves when every task
//! has produced a value, or as soon as one fails. A task that panics or is
//! cancelled by the runtime fails with `TaskError::Aborted`. Outstanding tasks
//! are aborted and drained before `run` returns, so a returned batch never
//! leaves work running behind it.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::{pin, Pin};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::TaskError;

pub type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

#[derive(Debug, Error)]
pub enum BatchError<K: fmt::Debug> {
    /// The first task to fail. Other outcomes in the same batch are not collected.
    #[error("{tag:?} task failed: {source}")]
    TaskFailed {
        tag: K,
        #[source]
        source: TaskError,
    },

    #[error("batch interrupted before all tasks settled")]
    Interrupted,
}

/// Ordered, tagged list of tasks launched together.
pub struct TaskBatch<K, T> {
    tasks: Vec<(K, TaskFuture<T>)>,
    task_timeout: Option<Duration>,
}

impl<K, T> Default for TaskBatch<K, T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            task_timeout: None,
        }
    }
}

impl<K, T> TaskBatch<K, T>
where
    K: Clone + fmt::Debug,
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Every task fails with `TaskError::TimedOut` once it has run for `limit`.
    pub fn with_task_timeout(mut self, limit: Option<Duration>) -> Self {
        self.task_timeout = limit;
        self
    }

    pub fn push<F>(mut self, tag: K, task: F) -> Self
    where
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        self.tasks.push((tag, Box::pin(task)));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs every task to completion. Values come back in declared order,
    /// paired with their tags. Must be called from within a tokio runtime.
    pub async fn run(self) -> Result<Vec<(K, T)>, BatchError<K>> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Like `run`, but gives up with `BatchError::Interrupted` as soon as
    /// `interrupt` resolves. Interruption wins over tasks settling at the same time.
    pub async fn run_until<I>(self, interrupt: I) -> Result<Vec<(K, T)>, BatchError<K>>
    where
        I: Future<Output = ()>,
    {
        if self.tasks.is_empty() {
            return Ok(Vec::new());
        }

        let timeout = self.task_timeout;
        let mut tags = Vec::with_capacity(self.tasks.len());
        let mut set = JoinSet::new();
        // Panicked tasks only report their runtime id.
        let mut index_of = HashMap::new();
        for (index, (tag, task)) in self.tasks.into_iter().enumerate() {
            tags.push(tag);
            let task = with_deadline(task, timeout);
            let handle = set.spawn(async move { (index, task.await) });
            index_of.insert(handle.id(), index);
        }

        let mut values: Vec<Option<T>> = tags.iter().map(|_| None).collect();
        let mut remaining = tags.len();
        let mut interrupt = pin!(interrupt);

        let outcome = loop {
            tokio::select! {
                biased;

                () = &mut interrupt => break Err(None),

                joined = set.join_next() => match joined {
                    None => break Ok(()),
                    Some(Ok((index, Ok(value)))) => {
                        debug!("Task {:?} settled", tags[index]);
                        values[index] = Some(value);
                        remaining -= 1;
                    }
                    Some(Ok((index, Err(source)))) => break Err(Some((index, source))),
                    Some(Err(join_error)) => {
                        let index = index_of.get(&join_error.id()).copied().unwrap_or_default();
                        break Err(Some((index, TaskError::Aborted(join_error.to_string()))));
                    }
                },
            }
        };

        // Cancel whatever is still outstanding before reporting.
        set.abort_all();
        while set.join_next().await.is_some() {}

        match outcome {
            Ok(()) => Ok(tags
                .into_iter()
                .zip(values)
                .filter_map(|(tag, value)| value.map(|v| (tag, v)))
                .collect()),
            Err(Some((index, source))) => {
                let tag = tags[index].clone();
                warn!("Task {tag:?} failed, discarding batch: {source}");
                Err(BatchError::TaskFailed { tag, source })
            }
            Err(None) => {
                warn!("Batch interrupted with {remaining} task(s) outstanding");
                Err(BatchError::Interrupted)
            }
        }
    }
}

fn with_deadline<T>(task: TaskFuture<T>, limit: Option<Duration>) -> TaskFuture<T>
where
    T: Send + 'static,
{
    match limit {
        Some(limit) => Box::pin(async move {
            tokio::time::timeout(limit, task)
                .await
                .unwrap_or(Err(TaskError::TimedOut(limit)))
        }),
        None => task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    use crate::analysis_client::ApiError;

    fn failure(message: &str) -> TaskError {
        TaskError::Api(ApiError::Status {
            status: 502,
            message: message.to_string(),
        })
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_immediately() {
        let batch: TaskBatch<&str, u32> = TaskBatch::new();
        assert!(batch.run().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_values_keep_declared_order() {
        let (tx, rx) = oneshot::channel::<u32>();
        let batch = TaskBatch::new()
            .push("slow", async move { rx.await.map_err(|e| TaskError::Aborted(e.to_string())) })
            .push("fast", async move {
                tx.send(1).ok();
                Ok(2)
            });

        let values = batch.run().await.unwrap();
        assert_eq!(values, vec![("slow", 1), ("fast", 2)]);
    }

    #[tokio::test]
    async fn test_all_tasks_start_before_any_finishes() {
        let started = Arc::new(AtomicUsize::new(0));
        let mut batch = TaskBatch::new();
        for tag in 0..3 {
            let started = Arc::clone(&started);
            batch = batch.push(tag, async move {
                started.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(started.load(Ordering::SeqCst))
            });
        }

        let values = batch.run().await.unwrap();
        assert!(values.iter().all(|(_, seen)| *seen == 3));
    }

    #[tokio::test]
    async fn test_first_failure_to_settle_wins() {
        let (_keep_pending, never) = oneshot::channel::<u32>();
        let batch = TaskBatch::new()
            .push("first_in_list", async move {
                never.await.map_err(|e| TaskError::Aborted(e.to_string()))
            })
            .push("second_in_list", async move {
                tokio::task::yield_now().await;
                Err(failure("upstream down"))
            })
            .push("third_in_list", async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(failure("never observed"))
            });

        match batch.run().await {
            Err(BatchError::TaskFailed { tag, source }) => {
                assert_eq!(tag, "second_in_list");
                assert!(source.to_string().contains("upstream down"));
            }
            other => panic!("expected task failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_discards_completed_values() {
        let batch = TaskBatch::new()
            .push("ok", async { Ok(1) })
            .push("bad", async { Err(failure("boom")) });

        assert!(matches!(
            batch.run().await,
            Err(BatchError::TaskFailed { tag: "bad", .. })
        ));
    }

    #[tokio::test]
    async fn test_outstanding_tasks_are_dropped_on_failure() {
        struct DropFlag(Arc<AtomicUsize>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicUsize::new(0));
        let flag = DropFlag(Arc::clone(&dropped));
        let batch = TaskBatch::new()
            .push("hangs", async move {
                let _flag = flag;
                std::future::pending::<()>().await;
                Ok(0)
            })
            .push("fails", async { Err(failure("boom")) });

        assert!(batch.run().await.is_err());
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_timeout_fails_the_batch() {
        let batch = TaskBatch::new()
            .with_task_timeout(Some(Duration::from_secs(30)))
            .push("quick", async { Ok(1) })
            .push("stuck", async {
                std::future::pending::<()>().await;
                Ok(2)
            });

        match batch.run().await {
            Err(BatchError::TaskFailed {
                tag,
                source: TaskError::TimedOut(limit),
            }) => {
                assert_eq!(tag, "stuck");
                assert_eq!(limit, Duration::from_secs(30));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_interrupt_abandons_batch() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let batch = TaskBatch::new().push("hangs", async {
            std::future::pending::<()>().await;
            Ok(1)
        });

        stop_tx.send(()).unwrap();
        let result = batch
            .run_until(async move {
                stop_rx.await.ok();
            })
            .await;
        assert!(matches!(result, Err(BatchError::Interrupted)));
    }

    async fn explode() -> Result<u32, TaskError> {
        tokio::task::yield_now().await;
        panic!("collaborator blew up")
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported_as_aborted() {
        let batch = TaskBatch::new()
            .push("steady", async { Ok(1) })
            .push("explodes", explode());

        match batch.run().await {
            Err(BatchError::TaskFailed {
                tag,
                source: TaskError::Aborted(message),
            }) => {
                assert_eq!(tag, "explodes");
                assert!(message.contains("panicked"));
            }
            other => panic!("expected aborted task, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_task_batch_is_a_plain_await() {
        let batch = TaskBatch::new().push("only", async { Ok("value") });
        assert_eq!(batch.run().await.unwrap(), vec![("only", "value")]);
    }
}
