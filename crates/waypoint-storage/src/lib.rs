use rusqlite::{Connection, params};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use waypoint_core::{TourKey, TourProgress};

mod schema;

const SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Other error: {0}")]
    Other(String),
}

/// Where tour progress is kept between sessions.
///
/// Writes are merged with what is already stored, so the highest index never
/// decreases and a completed tour stays completed.
pub trait ProgressStore {
    /// Stored progress, or [`TourProgress::untouched`] if the tour never ran.
    fn progress(&self, key: &TourKey) -> Result<TourProgress, StorageError>;

    /// Merge `progress` into the stored record and return the result.
    fn set_progress(&self, progress: &TourProgress) -> Result<TourProgress, StorageError>;

    /// Forget a tour. Returns whether anything was stored.
    fn reset(&self, key: &TourKey) -> Result<bool, StorageError>;

    /// Every stored record, ordered by tour key.
    fn all(&self) -> Result<Vec<TourProgress>, StorageError>;
}

/// Process-local store, handy for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    records: RefCell<HashMap<TourKey, TourProgress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn progress(&self, key: &TourKey) -> Result<TourProgress, StorageError> {
        Ok(self
            .records
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_else(|| TourProgress::untouched(key.clone())))
    }

    fn set_progress(&self, progress: &TourProgress) -> Result<TourProgress, StorageError> {
        let mut records = self.records.borrow_mut();
        let merged = match records.get(&progress.tour_key) {
            Some(stored) => stored.merge(progress),
            None => progress.clone(),
        };
        records.insert(merged.tour_key.clone(), merged.clone());
        Ok(merged)
    }

    fn reset(&self, key: &TourKey) -> Result<bool, StorageError> {
        Ok(self.records.borrow_mut().remove(key).is_some())
    }

    fn all(&self) -> Result<Vec<TourProgress>, StorageError> {
        let mut all: Vec<_> = self.records.borrow().values().cloned().collect();
        all.sort_by(|a, b| a.tour_key.cmp(&b.tour_key));
        Ok(all)
    }
}

/// Progress kept in a SQLite database file.
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        // Several IDE windows may share one settings directory.
        let _ = conn.busy_timeout(Duration::from_millis(2_500));
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    pub fn new_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StorageError> {
        schema::create_tables(&self.conn)?;
        schema::apply_schema_migrations(self)
    }

    fn schema_version(&self) -> Result<u32, StorageError> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version.max(0) as u32)
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StorageError> {
        self.conn
            .pragma_update(None, "user_version", version.to_string())?;
        Ok(())
    }

    fn progress_from_row(row: &rusqlite::Row) -> rusqlite::Result<TourProgress> {
        Ok(TourProgress {
            tour_key: TourKey(row.get(0)?),
            highest_index_reached: row.get(1)?,
            total_length: row.get(2)?,
            completed: row.get::<_, i64>(3)? != 0,
        })
    }
}

impl ProgressStore for SqliteProgressStore {
    fn progress(&self, key: &TourKey) -> Result<TourProgress, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT tour_key, highest_index, total_length, completed
             FROM tour_progress WHERE tour_key = ?1",
        )?;
        let mut rows = stmt.query(params![key.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Self::progress_from_row(row)?),
            None => Ok(TourProgress::untouched(key.clone())),
        }
    }

    fn set_progress(&self, progress: &TourProgress) -> Result<TourProgress, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tour_progress (tour_key, highest_index, total_length, completed)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(tour_key) DO UPDATE SET
                highest_index = max(highest_index, excluded.highest_index),
                total_length = max(total_length, excluded.total_length),
                completed = max(completed, excluded.completed)",
            params![
                progress.tour_key.as_str(),
                progress.highest_index_reached,
                progress.total_length,
                progress.completed as i64
            ],
        )?;
        let merged = tx.query_row(
            "SELECT tour_key, highest_index, total_length, completed
             FROM tour_progress WHERE tour_key = ?1",
            params![progress.tour_key.as_str()],
            Self::progress_from_row,
        )?;
        tx.commit()?;
        debug!(
            tour = %merged.tour_key,
            highest_index = merged.highest_index_reached,
            completed = merged.completed,
            "Stored tour progress"
        );
        Ok(merged)
    }

    fn reset(&self, key: &TourKey) -> Result<bool, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM tour_progress WHERE tour_key = ?1",
            params![key.as_str()],
        )?;
        Ok(removed > 0)
    }

    fn all(&self) -> Result<Vec<TourProgress>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT tour_key, highest_index, total_length, completed
             FROM tour_progress ORDER BY tour_key",
        )?;
        let rows = stmt.query_map([], Self::progress_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests;
