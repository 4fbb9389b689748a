//! # calibr-sync
//!
//! Downloads daily sensor-calibration records from an HTTP JSON API and
//! keeps one pretty-printed JSON file per calendar day.
//!
//! ## Architecture
//!
//! ```text
//! DateRange → FetchTask per day → FetchCoordinator → DailyFetcher → Store
//! ```
//!
//! - [`domain`]: date ranges and the per-day [`FetchTask`](domain::FetchTask)
//! - [`fetcher`]: HTTP fetching, retry policy, per-day worker and coordinator
//! - [`store`]: atomic one-file-per-day persistence
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch the configured range (defaults to a single day)
//! calibr-sync
//!
//! # Fetch two days one after another, waiting 500ms between retries
//! calibr-sync fetch --start 2023-03-31 -n 2 --mode sequential --retry-delay-ms 500
//!
//! # Show which files a range maps to
//! calibr-sync dates --start 2023-03-08 -n 7
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// the store and the coordinator from a resolved [`Config`](config::Config).
pub mod app;

/// Command-line interface using clap.
///
/// - `fetch` - Download the configured range (default)
/// - `dates` - List days, URLs and target files
/// - `config path|show` - Inspect the configuration
pub mod cli;

/// Configuration loaded from `~/.config/calibr-sync/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`DateRange`](domain::DateRange): consecutive calendar days
/// - [`FetchTask`](domain::FetchTask): URL and output file of one day
pub mod domain;

/// Fetching, retrying and orchestration.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for raw HTTP fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`RetryPolicy`](fetcher::RetryPolicy): attempt limit, backoff, 404 handling
/// - [`DailyFetcher`](fetcher::DailyFetcher): fetch, parse and store one day
/// - [`FetchCoordinator`](fetcher::FetchCoordinator): parallel or sequential runs
pub mod fetcher;

/// Persistence of daily payloads.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`FileStore`](store::FileStore): one JSON file per day, written atomically
pub mod store;
