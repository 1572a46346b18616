/// Calendar-month arithmetic.
///
/// Months are represented as `chrono::NaiveDate` values pinned to day 1 with
/// no time-of-day component. Everything here is pure; there is no clock and
/// no timezone handling, since the store records whole months only.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

use crate::model::SeriesError;

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Strips the time-of-day from a timestamp, keeping year, month, and day.
pub fn normalize_to_date(datetime: NaiveDateTime) -> NaiveDate {
    datetime.date()
}

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month, so with_day(1) cannot fail here.
    date.with_day(1).unwrap_or(date)
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

/// Advances `date` by exactly one calendar month, rolling December over into
/// January of the following year.
///
/// Days that do not exist in the next month are clamped to its last day by
/// chrono (Jan 31 -> Feb 28/29). The only failure is running off the end of
/// chrono's supported calendar.
pub fn increment_month(date: NaiveDate) -> Result<NaiveDate, SeriesError> {
    date.checked_add_months(Months::new(1))
        .ok_or(SeriesError::MonthOverflow(date))
}

/// Number of whole month steps from `start` to `end`, ignoring days.
///
/// Negative when `end` precedes `start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Builds the first day of a month from numeric year and month strings, as
/// submitted by the query forms.
///
/// Years before 1 are rejected. Beyond that the year is only bounded by what
/// chrono can represent; callers that care about the dataset span must check
/// it themselves.
pub fn to_month_date(year: &str, month: &str) -> Result<NaiveDate, SeriesError> {
    let y: i32 = year
        .trim()
        .parse()
        .map_err(|e| SeriesError::ParseError(format!("invalid year '{}': {}", year, e)))?;
    if y < 1 {
        return Err(SeriesError::ParseError(format!("year out of range: {}", year)));
    }
    let m: u32 = month
        .trim()
        .parse()
        .map_err(|e| SeriesError::ParseError(format!("invalid month '{}': {}", month, e)))?;

    NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(|| {
        SeriesError::ParseError(format!("month out of range: {}-{}", year, month))
    })
}

/// Parses a `YYYY-MM` string, as used in the configuration file.
pub fn parse_year_month(text: &str) -> Result<NaiveDate, SeriesError> {
    let (year, month) = text
        .split_once('-')
        .ok_or_else(|| SeriesError::ParseError(format!("expected YYYY-MM, got '{}'", text)))?;
    to_month_date(year, month)
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Iterator over the first day of every month in `[start, end]`.
///
/// Yields nothing when `start > end`. Stops early, rather than panicking, if
/// the calendar overflows.
pub struct MonthIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl MonthIter {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let start = first_of_month(start);
        let end = first_of_month(end);
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for MonthIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = increment_month(current)
            .ok()
            .filter(|next| *next <= self.end);
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
