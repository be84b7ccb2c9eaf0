//! The local weather cache.
//!
//! A single SQLite table holds at most one row per city. Rows are never
//! updated; stale ones are purged and a fresh fetch inserts a new row.
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::{fmt, fs, path::Path};

use crate::{WeatherError, WeatherRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS weather (
    city            TEXT    NOT NULL UNIQUE COLLATE NOCASE,
    observed_at     INTEGER NOT NULL,
    temperature_c   REAL    NOT NULL,
    wind_speed_mps  REAL    NOT NULL
)"#;

const COLUMNS: &str = "city, observed_at, temperature_c, wind_speed_mps";

/// Columns the cache listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    City,
    ObservedAt,
    Temperature,
    WindSpeed,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::City => "city",
            SortField::ObservedAt => "observed_at",
            SortField::Temperature => "temperature_c",
            SortField::WindSpeed => "wind_speed_mps",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Owns the connection to the cache database.
#[derive(Debug)]
pub struct WeatherStore {
    conn: Connection,
}

impl WeatherStore {
    /// Open (or create) the database at `target`, creating missing parent directories.
    /// `:memory:` gives a private in-memory database.
    pub fn open(target: impl AsRef<Path>) -> Result<Self, WeatherError> {
        let target = target.as_ref();
        tracing::debug!(path = %target.display(), "opening weather cache");
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WeatherError::StorageDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(target)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, WeatherError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the cache table if it is not there yet.
    pub fn ensure_schema(&self) -> Result<(), WeatherError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Delete every row older than `ttl_seconds` relative to `now` (Unix seconds).
    ///
    /// Returns the number of rows removed.
    pub fn purge_expired(&self, ttl_seconds: i64, now: i64) -> Result<usize, WeatherError> {
        let cutoff = now.saturating_sub(ttl_seconds);
        let removed = self
            .conn
            .execute("DELETE FROM weather WHERE observed_at < ?1", params![cutoff])?;
        if removed > 0 {
            tracing::debug!(removed, cutoff, "purged expired weather rows");
        }
        Ok(removed)
    }

    /// Look up the cached row for a city. Matching ignores ASCII case.
    pub fn find(&self, city: &str) -> Result<Option<WeatherRecord>, WeatherError> {
        let sql = format!("SELECT {COLUMNS} FROM weather WHERE city = ?1");
        let row = self
            .conn
            .query_row(&sql, params![city], RawRow::from_row)
            .optional()?;

        row.map(RawRow::into_record).transpose()
    }

    /// Insert a new row. Fails if the city is already cached.
    pub fn insert(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        let sql = format!("INSERT INTO weather ({COLUMNS}) VALUES (?1, ?2, ?3, ?4)");
        self.conn.execute(
            &sql,
            params![
                record.city(),
                record.observed_at(),
                record.temperature_c(),
                record.wind_speed_mps()
            ],
        )?;
        tracing::info!(
            city = record.city(),
            observed_at = record.observed_at(),
            "cached weather"
        );
        Ok(())
    }

    /// Every cached row, ascending by `field`.
    pub fn list_all_ordered_by(
        &self,
        field: SortField,
    ) -> Result<Vec<WeatherRecord>, WeatherError> {
        let sql = format!("SELECT {COLUMNS} FROM weather ORDER BY {} ASC", field.column());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    /// Number of cached rows.
    pub fn len(&self) -> Result<usize, WeatherError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM weather", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> Result<bool, WeatherError> {
        Ok(self.len()? == 0)
    }
}

/// Column values as read from SQLite, before record validation.
struct RawRow {
    city: String,
    observed_at: i64,
    temperature_c: f64,
    wind_speed_mps: f64,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            city: row.get(0)?,
            observed_at: row.get(1)?,
            temperature_c: row.get(2)?,
            wind_speed_mps: row.get(3)?,
        })
    }

    fn into_record(self) -> Result<WeatherRecord, WeatherError> {
        WeatherRecord::new(self.city, self.observed_at, self.temperature_c, self.wind_speed_mps)
    }
}
