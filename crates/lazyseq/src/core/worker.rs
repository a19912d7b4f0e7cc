//! Module for waiting on a group of background propagation tasks.

use std::future::Future;
use futures::future::join_all;
use tokio::task::JoinHandle;
use crate::error::{Result, SeqError};

/// A set of spawned tasks that are awaited together, like a wait group.
///
/// Every task runs to completion even when another one fails; [`WorkerGroup::wait`]
/// reports the first failure in spawn order.
///
/// # Example
///
/// ```ignore
/// let mut workers = WorkerGroup::new();
/// for input in inputs {
///     let grad = grad.clone();
///     workers.spawn(async move { input.propagate(stream, &grad).await });
/// }
/// workers.wait().await?;
/// ```
#[derive(Default)]
pub(crate) struct WorkerGroup {
    /// Handles of the spawned tasks, in spawn order
    handles: Vec<JoinHandle<Result<()>>>,
}

impl WorkerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` onto the runtime as part of this group.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.handles.push(tokio::spawn(task));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every task to finish.
    ///
    /// A panicked task is reported as [`SeqError::Worker`].
    pub async fn wait(self) -> Result<()> {
        let mut res = Ok(());
        for joined in join_all(self.handles).await {
            let outcome = joined.unwrap_or_else(|e| Err(SeqError::worker(e.to_string())));
            if res.is_ok() {
                res = outcome;
            }
        }
        res
    }
}
