use crate::db::models::{KeyValue, Tab};
use crate::db::schema::SQLITE_INIT;
use crate::error::JournalError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Pool, Sqlite};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Repository over the `tabs` and `key_values` tables.
///
/// Statements run directly on the pool; multi-step operations are not wrapped
/// in a transaction, so a failure part way through leaves earlier steps applied.
#[derive(Clone)]
pub struct JournalStore {
    pool: SqlitePool,
}

impl JournalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file and initialize the schema.
    pub async fn open(path: &Path) -> Result<Self, JournalError> {
        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Single-connection in-memory database, mostly for tests.
    pub async fn open_in_memory() -> Result<Self, JournalError> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), JournalError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// All tabs in the order SQLite returns them.
    pub async fn list_tabs(&self) -> Result<Vec<Tab>, JournalError> {
        let rows = sqlx::query("SELECT id, name FROM tabs")
            .fetch_all(&self.pool)
            .await?;
        Ok(decode_rows(rows))
    }

    pub async fn create_tab(&self, name: &str) -> Result<Tab, JournalError> {
        let result = sqlx::query("INSERT INTO tabs (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(Tab {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Delete the tab's key-values, then the tab row itself.
    pub async fn delete_tab(&self, id: i64) -> Result<(), JournalError> {
        sqlx::query("DELETE FROM key_values WHERE tab_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM tabs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns the number of rows touched; zero is not an error.
    pub async fn rename_tab(&self, id: i64, name: &str) -> Result<u64, JournalError> {
        let result = sqlx::query("UPDATE tabs SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_key_values(&self, tab_id: i64) -> Result<Vec<KeyValue>, JournalError> {
        let rows = sqlx::query("SELECT id, tab_id, key, value FROM key_values WHERE tab_id = ?")
            .bind(tab_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(decode_rows(rows))
    }

    /// Drop every key-value of the tab and insert the given map in its place.
    pub async fn replace_key_values(
        &self,
        tab_id: i64,
        key_values: &HashMap<String, String>,
    ) -> Result<(), JournalError> {
        sqlx::query("DELETE FROM key_values WHERE tab_id = ?")
            .bind(tab_id)
            .execute(&self.pool)
            .await?;

        for (key, value) in key_values {
            sqlx::query("INSERT INTO key_values (tab_id, key, value) VALUES (?, ?, ?)")
                .bind(tab_id)
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Decode rows, skipping any that do not fit the model.
fn decode_rows<T>(rows: Vec<SqliteRow>) -> Vec<T>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    rows.iter()
        .filter_map(|row| {
            T::from_row(row)
                .inspect_err(|e| debug!(error = %e, "skipping undecodable row"))
                .ok()
        })
        .collect()
}
