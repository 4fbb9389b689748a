pub mod date_range;
pub mod task;

pub use date_range::{date_range, parse_date, DateRange};
pub use task::FetchTask;
