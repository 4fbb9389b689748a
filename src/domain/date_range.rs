use chrono::NaiveDate;

use crate::app::{CalibrError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Consecutive calendar days starting at a given date.
///
/// Yields `start, start + 1 day, ...` for `count` days. A count of zero
/// is an empty range.
#[derive(Debug, Clone)]
pub struct DateRange {
    next: Option<NaiveDate>,
    remaining: usize,
}

impl DateRange {
    pub fn new(start: NaiveDate, count: usize) -> Self {
        Self {
            next: Some(start),
            remaining: count,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 {
            return None;
        }
        let date = self.next?;
        self.next = date.succ_opt();
        self.remaining -= 1;
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (0, Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}

pub fn date_range(start: NaiveDate, count: usize) -> DateRange {
    DateRange::new(start, count)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| CalibrError::InvalidDate(format!("{}: {}", s, e)))
}
