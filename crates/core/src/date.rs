use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::table::Cell;

/// How an ambiguous numeric date such as `03/04/2024` is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    /// `03/04/2024` is March 4.
    #[default]
    MonthFirst,
    /// `03/04/2024` is April 3.
    DayFirst,
}

const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d",
    "%Y.%m.%d",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%m/%d/%y",
    "%m-%d-%y",
];

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
];

const TEXTUAL_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%y",
    "%d %b %y",
];

// `%Y` also reads `24` as year 24; such readings are left to the `%y` formats.
const MIN_YEAR: i32 = 1900;

// 9999-12-31 in the 1900 date system.
const MAX_SERIAL: f64 = 2_958_466.0;

/// Parses a date or datetime string leniently. Returns `None` instead of failing.
///
/// ISO forms are tried first. Numeric forms follow `order`, falling back to the
/// other order when the preferred reading is impossible (`25/03/2024` is still
/// March 25 under [`DateOrder::MonthFirst`]).
pub fn parse_datetime(s: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (preferred, fallback) = match order {
        DateOrder::MonthFirst => (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS),
        DateOrder::DayFirst => (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS),
    };

    ISO_FORMATS
        .iter()
        .chain(preferred)
        .chain(fallback)
        .chain(TEXTUAL_FORMATS)
        .find_map(|fmt| parse_with(s, fmt))
}

fn parse_with(s: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, fmt)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, fmt).ok().map(|d| d.and_time(NaiveTime::MIN)))
        .filter(|dt| dt.year() >= MIN_YEAR)
}

/// Converts a spreadsheet serial day number (1900 date system) to a datetime.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..MAX_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as i64;
    let secs = (serial.fract() * 86_400.0).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    epoch.checked_add_signed(TimeDelta::days(days) + TimeDelta::seconds(secs))
}

/// Reads any cell as a datetime; unusable values become `None`.
pub fn coerce_datetime(cell: &Cell, order: DateOrder) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_datetime(s, order),
        Cell::Number(n) => from_excel_serial(*n),
        Cell::Bool(_) | Cell::Empty => None,
    }
}

/// Same as [`coerce_datetime`] but yields a cell: `DateTime` or `Empty`.
pub fn coerce(cell: &Cell, order: DateOrder) -> Cell {
    coerce_datetime(cell, order).map_or(Cell::Empty, Cell::DateTime)
}
