use std::sync::Arc;

use url::Url;

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::{date_range, FetchTask};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::{DailyFetcher, FetchCoordinator, Fetcher, RetryPolicy};
use crate::store::FileStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<FileStore>,
    pub coordinator: FetchCoordinator<FileStore>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.headers, config.fetch.timeout())?);
        Self::with_fetcher(config, fetcher)
    }

    /// Wire everything around an existing fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        Url::parse(&config.fetch.base_url)?;

        let store = Arc::new(FileStore::new(&config.fetch.output_dir)?);
        let daily = DailyFetcher::new(
            fetcher,
            store.clone(),
            RetryPolicy::from(&config.retry),
        );
        let coordinator = FetchCoordinator::new(daily, config.fetch.mode)
            .with_workers(config.fetch.workers)
            .with_deadline(config.fetch.deadline());

        Ok(Self {
            config,
            store,
            coordinator,
        })
    }

    /// Tasks for the configured date range, in date order.
    pub fn tasks(&self) -> Vec<FetchTask> {
        FetchTask::for_dates(
            &self.config.fetch.base_url,
            date_range(self.config.fetch.start, self.config.fetch.days),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CalibrError;
    use crate::fetcher::testing::ScriptedFetcher;
    use crate::fetcher::ConcurrencyMode;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.fetch.output_dir = dir.join("loaded");
        config
    }

    #[test]
    fn test_tasks_follow_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = config(tmp.path());
        config.fetch.start = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        config.fetch.days = 2;
        config.fetch.base_url = "http://localhost:3000/db_api_REST/calibr".into();

        let ctx = AppContext::new(config).unwrap();
        let tasks = ctx.tasks();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].file_name(), "2023-03-31.json");
        assert_eq!(
            tasks[1].remote_url(),
            "http://localhost:3000/db_api_REST/calibr/day/2023-04-01"
        );
        assert!(tmp.path().join("loaded").is_dir());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let tmp = TempDir::new().unwrap();
        let mut config = config(tmp.path());
        config.fetch.base_url = "not a url".into();

        assert!(matches!(
            AppContext::new(config),
            Err(CalibrError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_header() {
        let tmp = TempDir::new().unwrap();
        let mut config = config(tmp.path());
        config.headers.insert("User-Agent".into(), "line\nbreak".into());

        assert!(matches!(AppContext::new(config), Err(CalibrError::Config(_))));
    }

    #[tokio::test]
    async fn test_end_to_end_single_day() {
        let tmp = TempDir::new().unwrap();
        let config = config(tmp.path());
        let fetcher = Arc::new(ScriptedFetcher::with_fallback(r#"{"sensor":1,"value":23.5}"#));

        let ctx = AppContext::with_fetcher(config, fetcher).unwrap();
        assert_eq!(ctx.coordinator.mode(), ConcurrencyMode::Parallel);

        let report = ctx.coordinator.run(ctx.tasks()).await.unwrap();
        assert!(report.is_complete());

        let files: Vec<_> = std::fs::read_dir(tmp.path().join("loaded"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, vec!["2023-03-18.json"]);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("loaded/2023-03-18.json")).unwrap(),
            "{\n  \"sensor\": 1,\n  \"value\": 23.5\n}"
        );
    }
}
