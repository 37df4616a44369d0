use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Format of the reporting period arguments.
pub const PERIOD_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid {which} date '{value}': expected DD-MM-YYYY (e.g. 01-03-2024)")]
    InvalidDate { which: &'static str, value: String },
}

/// One reporting period.
///
/// Timestamps are compared against midnight of `start` and `end`, so a value
/// later on the end day already falls after the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Parses `DD-MM-YYYY` start and end strings. No other layout is accepted.
    pub fn parse(start: &str, end: &str) -> Result<Self, PeriodError> {
        Ok(DateRange::new(parse_period_date(start, "start")?, parse_period_date(end, "end")?))
    }

    pub fn start_at(self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    pub fn end_at(self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN)
    }

    pub fn contains(self, at: NaiveDateTime) -> bool {
        at >= self.start_at() && at <= self.end_at()
    }

    pub fn is_after_end(self, at: NaiveDateTime) -> bool {
        at > self.end_at()
    }

    pub fn is_inverted(self) -> bool {
        self.start > self.end
    }
}

fn parse_period_date(value: &str, which: &'static str) -> Result<NaiveDate, PeriodError> {
    NaiveDate::parse_from_str(value.trim(), PERIOD_DATE_FORMAT).map_err(|_| PeriodError::InvalidDate {
        which,
        value: value.to_string(),
    })
}
