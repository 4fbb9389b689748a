pub mod coordinator;
pub mod daily;
pub mod http_fetcher;
pub mod retry;

use async_trait::async_trait;

use crate::app::Result;

pub use coordinator::{ConcurrencyMode, FetchCoordinator, RunReport};
pub use daily::{DailyFetcher, FetchOutcome};
pub use retry::{Backoff, RetryDecision, RetryPolicy};

#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the raw response body of a successful response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
