//! Serial task scheduling
//!
//! Runs deferred async tasks strictly one after another: task `n + 1` is not
//! started until task `n` has finished. Used both for files within a run and
//! for chunks within a file.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A deferred task. Nothing runs until the scheduler calls it.
pub type Task<'a, T, E> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T, E>> + Send + 'a>;

/// Wrap an async closure as a [`Task`]
pub fn task<'a, T, E, F, Fut>(f: F) -> Task<'a, T, E>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = Result<T, E>> + Send + 'a,
{
    Box::new(move || f().boxed())
}

/// What to do with the remaining tasks after one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Do not start any further task
    #[default]
    Stop,
    /// Keep going with the next task
    Continue,
}

/// Outcome of a series run
#[derive(Debug)]
pub struct SeriesReport<T, E> {
    /// Results of the tasks that ran, in order
    pub outcomes: Vec<Result<T, E>>,
    /// Tasks never started, because of a failure or cancellation
    pub not_started: usize,
    /// True if cancellation stopped the series
    pub cancelled: bool,
}

impl<T, E> SeriesReport<T, E> {
    /// True if every task ran and succeeded
    pub fn is_complete(&self) -> bool {
        self.not_started == 0 && !self.cancelled && self.outcomes.iter().all(Result::is_ok)
    }

    /// Collapse into the successful values, or the first error
    pub fn into_result(self) -> Result<Vec<T>, E> {
        self.outcomes.into_iter().collect()
    }
}

/// Runs tasks in series
#[derive(Debug, Clone, Default)]
pub struct SerialScheduler {
    on_failure: OnFailure,
    cancel: Option<CancellationToken>,
}

impl SerialScheduler {
    pub fn new(on_failure: OnFailure) -> Self {
        Self {
            on_failure,
            cancel: None,
        }
    }

    /// Check `token` before starting each task
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub async fn run<'a, T, E>(&self, tasks: Vec<Task<'a, T, E>>) -> SeriesReport<T, E> {
        let total = tasks.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut cancelled = false;

        for task in tasks {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                cancelled = true;
                break;
            }
            let result = task().await;
            let failed = result.is_err();
            outcomes.push(result);
            if failed && self.on_failure == OnFailure::Stop {
                break;
            }
        }

        let not_started = total - outcomes.len();
        if not_started > 0 {
            debug!(not_started, cancelled, "series stopped early");
        }
        SeriesReport {
            outcomes,
            not_started,
            cancelled,
        }
    }
}

/// Run `tasks` in order, stopping at the first failure
pub async fn series<'a, T, E>(tasks: Vec<Task<'a, T, E>>) -> Result<Vec<T>, E> {
    SerialScheduler::new(OnFailure::Stop)
        .run(tasks)
        .await
        .into_result()
}
