//! Persistence module split across logical submodules.
//!
//! The UI never talks to `rusqlite` directly; it goes through [`CoffeeStore`]
//! so the main view and the edit dialog can be driven against any store.

mod coffee;
mod connection;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

use crate::models::{CoffeeDraft, CoffeeRecord, RecordGrid};

pub use coffee::{create_coffee, fetch_coffee, fetch_grid, update_coffee};
pub use connection::{ensure_schema, open_database};

/// Everything the TUI needs from the database. All statements behind this
/// trait use bound parameters.
pub trait CoffeeStore {
    /// Full scan of the table, stringified for display.
    fn fetch_grid(&self) -> Result<RecordGrid>;

    /// Point lookup by id; `Ok(None)` when no row matches.
    fn fetch_coffee(&self, id: i64) -> Result<Option<CoffeeRecord>>;

    /// Insert a validated record and return it with its new id.
    fn create_coffee(&mut self, draft: &CoffeeDraft) -> Result<CoffeeRecord>;

    /// Replace the six fields of the record `id`.
    fn update_coffee(&mut self, id: i64, draft: &CoffeeDraft) -> Result<()>;
}

/// [`CoffeeStore`] over a single SQLite connection held for the lifetime of
/// the application. Each write runs in its own transaction, which is rolled
/// back when the statement fails.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the database file at `path`, creating it and the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        open_database(path).map(Self::new)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        ensure_schema(&conn)?;
        Ok(Self::new(conn))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CoffeeStore for SqliteStore {
    fn fetch_grid(&self) -> Result<RecordGrid> {
        fetch_grid(&self.conn)
    }

    fn fetch_coffee(&self, id: i64) -> Result<Option<CoffeeRecord>> {
        fetch_coffee(&self.conn, id)
    }

    fn create_coffee(&mut self, draft: &CoffeeDraft) -> Result<CoffeeRecord> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;
        let record = create_coffee(&tx, draft)?;
        tx.commit().context("failed to commit new coffee record")?;

        debug!(id = record.id, "inserted coffee record");
        Ok(record)
    }

    fn update_coffee(&mut self, id: i64, draft: &CoffeeDraft) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;
        update_coffee(&tx, id, draft)?;
        tx.commit().context("failed to commit coffee record update")?;

        debug!(id, "updated coffee record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CoffeeDraft {
        CoffeeDraft {
            name: "Arabica".into(),
            roasting: "Light".into(),
            kind: "Bean".into(),
            description: "Fruity".into(),
            cost: 9.5,
            volume: 0.25,
        }
    }

    fn row_count(store: &SqliteStore) -> i64 {
        store
            .connection()
            .query_row("SELECT COUNT(*) FROM coffee", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_and_update() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let record = store.create_coffee(&draft()).unwrap();
        assert_eq!(row_count(&store), 1);

        let mut changed = draft();
        changed.roasting = "Dark".into();
        store.update_coffee(record.id, &changed).unwrap();

        let loaded = store.fetch_coffee(record.id).unwrap().unwrap();
        assert_eq!(loaded.roasting, "Dark");
        assert_eq!(row_count(&store), 1);
    }

    #[test]
    fn test_failed_insert_is_rolled_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER second_insert_fails AFTER INSERT ON coffee
                 WHEN NEW.id > 1
                 BEGIN SELECT RAISE(ABORT, 'catalog is full'); END;",
            )
            .unwrap();

        store.create_coffee(&draft()).unwrap();
        let err = store.create_coffee(&draft()).unwrap_err();

        assert!(format!("{err:#}").contains("catalog is full"));
        assert_eq!(row_count(&store), 1);
        assert!(store.connection().is_autocommit());
    }

    #[test]
    fn test_update_missing_record_fails() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert!(store.update_coffee(7, &draft()).is_err());
        assert_eq!(row_count(&store), 0);
    }
}
