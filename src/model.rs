/// Record, PlayerCountRow, and the error types shared across the crate.
///
/// This module defines the shared domain model imported by all other modules.
/// Apart from normalizing a record's month on construction it holds no logic
/// and performs no I/O.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::months::{first_of_month, normalize_to_date};

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One monthly player-count observation for a single game.
///
/// `month` is always the first day of the calendar month; any day or time
/// component handed to the constructor is discarded. Placeholder records
/// (months where the game was not in the tracked top list) carry a stat of 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    title: String,
    month: NaiveDate,
    stat: f64,
}

impl Record {
    pub fn new(title: impl Into<String>, month: NaiveDate, stat: f64) -> Self {
        Self {
            title: title.into(),
            month: first_of_month(month),
            stat,
        }
    }

    /// A zero-valued record standing in for a month absent from the store.
    pub fn placeholder(title: impl Into<String>, month: NaiveDate) -> Self {
        Self::new(title, month, 0.0)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn stat(&self) -> f64 {
        self.stat
    }
}

/// A raw `(stat, month timestamp, title)` row exactly as the query layer
/// returns it from the `comparegames` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCountRow {
    pub stat: f64,
    pub month: NaiveDateTime,
    pub title: String,
}

impl From<PlayerCountRow> for Record {
    fn from(row: PlayerCountRow) -> Self {
        Record::new(row.title, normalize_to_date(row.month), row.stat)
    }
}

/// Converts query rows into records, preserving row order.
pub fn records_from_rows(rows: Vec<PlayerCountRow>) -> Vec<Record> {
    rows.into_iter().map(Record::from).collect()
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by month construction and series alignment.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// A year or month string was not a valid integer, or the month was
    /// outside 1-12.
    ParseError(String),
    /// `align_records` was given no records, so there is no title to stamp
    /// onto placeholders.
    EmptyInput,
    /// The requested range starts after it ends.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// A record in the input belongs to a different game.
    TitleMismatch { expected: String, found: String },
    /// Two input records fall in the same calendar month.
    DuplicateMonth(NaiveDate),
    /// Advancing past this month leaves chrono's supported calendar range.
    MonthOverflow(NaiveDate),
}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SeriesError::EmptyInput => write!(f, "Cannot align an empty series without a title"),
            SeriesError::InvalidRange { start, end } => {
                write!(f, "Invalid range: start {} is after end {}", start, end)
            }
            SeriesError::TitleMismatch { expected, found } => {
                write!(f, "Title mismatch: expected '{}', found '{}'", expected, found)
            }
            SeriesError::DuplicateMonth(month) => {
                write!(f, "Duplicate record for month {}", month.format("%Y-%m"))
            }
            SeriesError::MonthOverflow(month) => {
                write!(f, "Month overflow: cannot advance past {}", month)
            }
        }
    }
}

impl std::error::Error for SeriesError {}

/// Errors from the PostgreSQL-backed store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Could not open a connection to the database.
    Connection(String),
    /// A query failed to execute or returned rows of the wrong shape.
    Query(String),
    /// A table the service reads from does not exist.
    MissingTable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "Query error: {}", msg),
            StoreError::MissingTable(table) => write!(f, "Missing table: {}", table),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<postgres::Error> for StoreError {
    fn from(err: postgres::Error) -> Self {
        if err.is_closed() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

/// Errors surfaced by the query service to its callers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    Store(StoreError),
    Series(SeriesError),
    /// The store holds no rows at all for this title.
    UnknownTitle(String),
    /// The store holds no top-games list for this month.
    NoData { year: i32, month: u32 },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Store(err) => write!(f, "{}", err),
            QueryError::Series(err) => write!(f, "{}", err),
            QueryError::UnknownTitle(title) => write!(f, "No data for game: {}", title),
            QueryError::NoData { year, month } => {
                write!(f, "No data available for {:04}-{:02}", year, month)
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Store(err) => Some(err),
            QueryError::Series(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::Store(err)
    }
}

impl From<SeriesError> for QueryError {
    fn from(err: SeriesError) -> Self {
        QueryError::Series(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
