use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, Instrument};

use crate::app::{CalibrError, Result};
use crate::domain::FetchTask;
use crate::fetcher::{DailyFetcher, FetchOutcome};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// One worker per date, bounded by the pool size
    #[default]
    Parallel,
    /// One date at a time, in range order
    Sequential,
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyMode::Parallel => write!(f, "parallel"),
            ConcurrencyMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// How every task of a run concluded, sorted by date.
#[derive(Debug, Default)]
pub struct RunReport {
    pub saved: Vec<(NaiveDate, FetchOutcome)>,
    pub failed: Vec<(NaiveDate, CalibrError)>,
    /// Workers that panicked or were cancelled before reporting back
    pub aborted: usize,
}

impl RunReport {
    fn record(&mut self, date: NaiveDate, result: Result<FetchOutcome>) {
        match result {
            Ok(outcome) => self.saved.push((date, outcome)),
            Err(e) => self.failed.push((date, e)),
        }
    }

    fn sort(&mut self) {
        self.saved.sort_by_key(|(date, _)| *date);
        self.failed.sort_by_key(|(date, _)| *date);
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.aborted == 0
    }

    pub fn total_attempts(&self) -> u32 {
        self.saved.iter().map(|(_, o)| o.attempts).sum()
    }
}

/// Drives a batch of [`FetchTask`]s to completion.
pub struct FetchCoordinator<S: Store + Send + Sync + 'static> {
    daily: Arc<DailyFetcher<S>>,
    mode: ConcurrencyMode,
    workers: usize,
    deadline: Option<Duration>,
}

impl<S: Store + Send + Sync + 'static> FetchCoordinator<S> {
    pub fn new(daily: DailyFetcher<S>, mode: ConcurrencyMode) -> Self {
        Self {
            daily: Arc::new(daily),
            mode,
            workers: 0,
            deadline: None,
        }
    }

    /// Cap on simultaneous workers in parallel mode; 0 means one per task.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Abort the whole run once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Run every task and wait for all of them to conclude.
    ///
    /// Dropping the returned future aborts all in-flight workers.
    pub async fn run(&self, tasks: Vec<FetchTask>) -> Result<RunReport> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run_to_completion(tasks))
                .await
                .map_err(|_| CalibrError::DeadlineElapsed(deadline)),
            None => Ok(self.run_to_completion(tasks).await),
        }
    }

    async fn run_to_completion(&self, tasks: Vec<FetchTask>) -> RunReport {
        let mut report = match self.mode {
            ConcurrencyMode::Parallel => self.run_parallel(tasks).await,
            ConcurrencyMode::Sequential => self.run_sequential(tasks).await,
        };
        report.sort();
        report
    }

    async fn run_sequential(&self, tasks: Vec<FetchTask>) -> RunReport {
        let mut report = RunReport::default();

        for task in tasks {
            info!("Processing {}", task.date().format("%d/%m/%Y"));
            let result = self.daily.fetch_and_store(&task).await;
            report.record(task.date(), result);
        }

        report
    }

    async fn run_parallel(&self, tasks: Vec<FetchTask>) -> RunReport {
        let limit = match self.workers {
            0 => tasks.len(),
            n => n,
        };
        let semaphore = Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS)));
        let mut set = JoinSet::new();

        for task in tasks {
            let daily = self.daily.clone();
            let semaphore = semaphore.clone();
            let span = tracing::info_span!("fetch", date = %task.date());

            set.spawn(
                async move {
                    let result = match semaphore.acquire().await {
                        Ok(_permit) => daily.fetch_and_store(&task).await,
                        Err(_) => Err(CalibrError::Other("Worker pool closed".into())),
                    };
                    (task.date(), result)
                }
                .instrument(span),
            );
        }

        let mut report = RunReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((date, result)) => report.record(date, result),
                Err(e) => {
                    error!("Task join error: {}", e);
                    report.aborted += 1;
                }
            }
        }

        report
    }
}
