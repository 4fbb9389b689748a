use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::app::Result;
use crate::domain::FetchTask;
use crate::fetcher::{Fetcher, RetryDecision, RetryPolicy};
use crate::store::Store;

/// Result of a task that ended in a saved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub path: PathBuf,
    pub attempts: u32,
}

/// Fetches one day's payload and stores it, retrying per its policy.
pub struct DailyFetcher<S: Store> {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    store: Arc<S>,
    policy: RetryPolicy,
}

impl<S: Store> DailyFetcher<S> {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, store: Arc<S>, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            store,
            policy,
        }
    }

    /// Run attempts until one succeeds or the policy gives up.
    ///
    /// Attempts are strictly sequential. The error of the last attempt is
    /// returned when the policy gives up.
    pub async fn fetch_and_store(&self, task: &FetchTask) -> Result<FetchOutcome> {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            info!("Trying to download {}...", task.file_name());

            let err = match self.attempt(task).await {
                Ok(path) => {
                    info!("File {} saved", path.display());
                    return Ok(FetchOutcome {
                        path,
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            };

            match self.policy.decide(attempt, &err) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        "Failed to download {} (attempt {}): {}, retrying...",
                        task.file_name(),
                        attempt,
                        err
                    );
                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::GiveUp => {
                    error!(
                        "Giving up on {} after {} attempt(s): {}",
                        task.file_name(),
                        attempt,
                        err
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, task: &FetchTask) -> Result<PathBuf> {
        let body = self.fetcher.fetch(task.remote_url()).await?;
        let payload: Value = serde_json::from_slice(&body)?;
        self.store.put(task.file_name(), &payload)
    }
}
