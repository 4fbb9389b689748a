use chrono::NaiveDate;

use crate::domain::date_range::DATE_FORMAT;

/// One day's worth of work: where to fetch it from and where it lands.
///
/// Every field is derived from the calendar date and the base URL, so two
/// tasks for different dates never share an output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    date: NaiveDate,
    remote_url: String,
    file_name: String,
}

impl FetchTask {
    pub fn new(base_url: &str, date: NaiveDate) -> Self {
        let day = date.format(DATE_FORMAT).to_string();
        Self {
            date,
            remote_url: format!("{}/day/{}", base_url.trim_end_matches('/'), day),
            file_name: format!("{}.json", day),
        }
    }

    pub fn for_dates(base_url: &str, dates: impl IntoIterator<Item = NaiveDate>) -> Vec<Self> {
        dates
            .into_iter()
            .map(|date| Self::new(base_url, date))
            .collect()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Output key inside the store, `YYYY-MM-DD.json`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::date_range;

    const BASE: &str = "http://webrobo.mgul.ac.ru:3000/db_api_REST/calibr";

    #[test]
    fn test_names_derived_from_date() {
        let task = FetchTask::new(BASE, NaiveDate::from_ymd_opt(2023, 3, 18).unwrap());
        assert_eq!(task.file_name(), "2023-03-18.json");
        assert_eq!(
            task.remote_url(),
            "http://webrobo.mgul.ac.ru:3000/db_api_REST/calibr/day/2023-03-18"
        );
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        let a = FetchTask::new("http://host/api/", date);
        let b = FetchTask::new("http://host/api", date);
        assert_eq!(a, b);
        assert_eq!(a.remote_url(), "http://host/api/day/2023-01-05");
    }

    #[test]
    fn test_same_date_same_task() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        assert_eq!(FetchTask::new(BASE, date), FetchTask::new(BASE, date));
    }

    #[test]
    fn test_distinct_dates_never_collide() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        let tasks = FetchTask::for_dates(BASE, date_range(start, 60));
        let mut names: Vec<_> = tasks.iter().map(|t| t.file_name().to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 60);
    }
}
