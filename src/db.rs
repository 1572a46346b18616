/// PostgreSQL access for monthly player counts.
///
/// The schema is owned by the import scripts, not this service:
///
/// - `comparegames(avgplayers, gamedate, gametitle)`: one row per game per
///   month the game was in the tracked top list.
/// - `topgames(gametitle, gamedate, peakplayers, ...)`: the top list itself.
///
/// Rows are returned as-is; gap filling happens in `analysis::series`.

use chrono::NaiveDate;
use postgres::{Client, NoTls};

use crate::logging::{self, Component};
use crate::model::{PlayerCountRow, StoreError};

/// Tables the service reads from.
pub const REQUIRED_TABLES: &[&str] = &["comparegames", "topgames"];

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Read-only source of monthly player counts.
///
/// Implemented by `PgStore` for production and by in-memory fakes in tests.
pub trait PlayerCountStore {
    /// Rows for `title` with months in `[start, end]`, most recent first.
    fn monthly_averages(
        &mut self,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PlayerCountRow>, StoreError>;

    /// Every row for `title`, most recent first.
    fn all_monthly_averages(&mut self, title: &str) -> Result<Vec<PlayerCountRow>, StoreError>;

    /// Titles in the top list for `month`, highest peak player count first.
    fn top_titles(&mut self, month: NaiveDate) -> Result<Vec<String>, StoreError>;
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Opens a connection to `url` without TLS (the database runs locally).
pub fn connect(url: &str) -> Result<Client, StoreError> {
    Client::connect(url, NoTls).map_err(|e| StoreError::Connection(e.to_string()))
}

/// Opens a connection and checks that every table in `tables` exists in the
/// public schema.
pub fn connect_and_verify(url: &str, tables: &[&str]) -> Result<Client, StoreError> {
    let mut client = connect(url)?;

    for table in tables {
        let row = client.query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )",
            &[table],
        )?;
        let exists: bool = row.try_get(0)?;
        if !exists {
            logging::error(Component::Store, None, &format!("table '{}' not found", table));
            return Err(StoreError::MissingTable((*table).to_string()));
        }
    }

    logging::debug(Component::Store, None, &format!("verified {} tables", tables.len()));
    Ok(client)
}

// ---------------------------------------------------------------------------
// PostgreSQL store
// ---------------------------------------------------------------------------

pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects to `url` and verifies the required tables.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        connect_and_verify(url, REQUIRED_TABLES).map(Self::new)
    }

    fn rows_to_counts(rows: Vec<postgres::Row>) -> Result<Vec<PlayerCountRow>, StoreError> {
        rows.into_iter()
            .map(|row| -> Result<PlayerCountRow, StoreError> {
                Ok(PlayerCountRow {
                    stat: row.try_get(0)?,
                    month: row.try_get(1)?,
                    title: row.try_get(2)?,
                })
            })
            .collect()
    }
}

impl PlayerCountStore for PgStore {
    fn monthly_averages(
        &mut self,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PlayerCountRow>, StoreError> {
        let rows = self.client.query(
            "SELECT avgplayers::float8, gamedate::timestamp, gametitle
             FROM comparegames
             WHERE (gamedate::date BETWEEN $1 AND $2) AND gametitle = $3
             ORDER BY gamedate DESC",
            &[&start, &end, &title],
        )?;

        logging::debug(Component::Store, Some(title), &format!("fetched {} rows in range", rows.len()));
        Self::rows_to_counts(rows)
    }

    fn all_monthly_averages(&mut self, title: &str) -> Result<Vec<PlayerCountRow>, StoreError> {
        let rows = self.client.query(
            "SELECT avgplayers::float8, gamedate::timestamp, gametitle
             FROM comparegames
             WHERE gametitle = $1
             ORDER BY gamedate DESC",
            &[&title],
        )?;

        logging::debug(Component::Store, Some(title), &format!("fetched {} rows", rows.len()));
        Self::rows_to_counts(rows)
    }

    fn top_titles(&mut self, month: NaiveDate) -> Result<Vec<String>, StoreError> {
        let rows = self.client.query(
            "SELECT gametitle FROM topgames
             WHERE gamedate::date = $1
             ORDER BY peakplayers DESC",
            &[&month],
        )?;

        rows.into_iter()
            .map(|row| row.try_get::<_, String>(0).map_err(StoreError::from))
            .collect()
    }
}
