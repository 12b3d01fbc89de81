//! Concurrent fan-out of independent work units
//!
//! A [`TaskGroup`] spawns one task per [`WorkUnit`], waits for every task to
//! return, and only then drains the failures they reported. A failing task
//! never cancels its siblings, so work that already started is not wasted.

use crate::error::{Error, Result, StageError, TaskFailure};
use crate::types::WorkUnit;
use futures::future::join_all;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

/// The fan-out phases of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Per-pack record fetch
    Records,
    /// Per-pack image fetch, archive and cleanup
    Images,
    /// Archive expansion
    Unpack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Records => "record fetch",
            Stage::Images => "image fetch",
            Stage::Unpack => "archive expansion",
        })
    }
}

/// Position of a task within its stage, for `[i/n]` log prefixes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the task
    pub index: usize,
    /// Number of tasks in the stage
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.index, self.total)
    }
}

/// Runs a fixed set of work units concurrently and aggregates their failures
#[derive(Clone, Debug)]
pub struct TaskGroup {
    stage: Stage,
    limit: Option<usize>,
}

impl TaskGroup {
    /// Create an unbounded group for `stage`
    pub fn new(stage: Stage) -> Self {
        Self { stage, limit: None }
    }

    /// Cap the number of tasks running at once (None = unbounded)
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|n| n.max(1));
        self
    }

    /// The stage this group runs
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run `task` once per unit and wait for all of them
    ///
    /// Returns `Ok(())` when every task succeeded (trivially so for zero
    /// units). Otherwise returns a [`StageError`] holding every failure in the
    /// order it was drained from the collector, which does not follow task
    /// index or start order. Panicking tasks are reported as failures too.
    pub async fn run<F, Fut>(
        &self,
        units: Vec<WorkUnit>,
        task: F,
    ) -> std::result::Result<(), StageError>
    where
        F: Fn(Progress, WorkUnit) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let total = units.len();
        if total == 0 {
            debug!(stage = %self.stage, "no work units, nothing to do");
            return Ok(());
        }

        info!(stage = %self.stage, tasks = total, limit = ?self.limit, "starting stage");

        let (tx, mut rx) = mpsc::channel::<TaskFailure>(total);
        let limiter = self.limit.map(|n| Arc::new(Semaphore::new(n)));
        let mut handles = Vec::with_capacity(total);

        for (i, unit) in units.into_iter().enumerate() {
            let tx = tx.clone();
            let task = task.clone();
            let limiter = limiter.clone();
            let id = unit.id.clone();
            let title = unit.title.clone();
            let progress = Progress {
                index: i + 1,
                total,
            };

            let handle = tokio::spawn(async move {
                // Held until the task returns
                let _permit = match limiter {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };

                if let Err(source) = task(progress, unit.clone()).await {
                    let failure = TaskFailure {
                        id: unit.id,
                        title: unit.title,
                        source,
                    };
                    // Capacity equals the task count and each task sends at most once.
                    tx.send(failure).await.ok();
                }
            });
            handles.push((id, title, handle));
        }
        drop(tx);

        // Join barrier: every task has returned before anything is drained.
        let (labels, handles): (Vec<_>, Vec<_>) = handles
            .into_iter()
            .map(|(id, title, handle)| ((id, title), handle))
            .unzip();
        let panicked: Vec<TaskFailure> = join_all(handles)
            .await
            .into_iter()
            .zip(labels)
            .filter_map(|(joined, (id, title))| {
                joined.err().map(|e| TaskFailure {
                    id,
                    title,
                    source: Error::TaskPanicked(e.to_string()),
                })
            })
            .collect();

        let mut failures = Vec::new();
        while let Some(failure) = rx.recv().await {
            failures.push(failure);
        }
        failures.extend(panicked);

        if failures.is_empty() {
            info!(stage = %self.stage, tasks = total, "stage completed");
            return Ok(());
        }

        warn!(
            stage = %self.stage,
            failed = failures.len(),
            succeeded = total - failures.len(),
            total,
            "stage completed with failures"
        );
        Err(StageError {
            stage: self.stage,
            total,
            failures,
        })
    }
}
