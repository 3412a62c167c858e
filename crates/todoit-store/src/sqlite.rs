//! SQLite store backed by an `sqlx` connection pool.
//!
//! The table is created on connect when it does not exist yet. `id` is an
//! `AUTOINCREMENT` rowid, which keeps SQLite from reusing the id of a deleted
//! row. `status` holds the raw `ToDoStatus` value.

use crate::interface::{Store, StoreResult, StoreTx};
use core::str::FromStr;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use todoit_core::{
    StoreError,
    types::{NewToDoItem, ToDoId, ToDoItem, status_from_raw},
};
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todo_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    status INTEGER NOT NULL DEFAULT 0
)";

const SELECT_ONE: &str = "SELECT id, title, description, status FROM todo_items WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, title, description, status FROM todo_items ORDER BY id";

#[derive(sqlx::FromRow)]
struct ToDoRow {
    id: i64,
    title: String,
    description: String,
    status: i32,
}

impl TryFrom<ToDoRow> for ToDoItem {
    type Error = StoreError;

    fn try_from(row: ToDoRow) -> Result<Self, Self::Error> {
        let status = status_from_raw(row.status).ok_or_else(|| StoreError::Corrupt {
            reason: format!("item {} has unknown status {}", row.id, row.status),
        })?;
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
        })
    }
}

/// A [`Store`] persisting items to SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url` (e.g. `sqlite://todoit.db`), creating the database
    /// file if it is missing.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url).map_err(StoreError::backend)?;
        Self::connect_with(options, max_connections).await
    }

    /// Connects with explicit options. `create_if_missing` is always set.
    ///
    /// Every pooled connection to `sqlite::memory:` opens its own private
    /// database, so in-memory URLs are only coherent with a pool of one.
    pub async fn connect_with(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> StoreResult<Self> {
        let options = options.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(StoreError::backend)?;

        let store = Self::from_pool(pool).await?;
        info!(max_connections, "Connected to SQLite store");
        Ok(store)
    }

    /// Wraps an existing pool, creating the table if needed.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        debug!("todo_items table ready");
        Ok(())
    }
}

impl Store for SqliteStore {
    type Tx = SqliteTx;

    async fn begin(&self) -> StoreResult<SqliteTx> {
        // Take the write lock up front: two deferred transactions upgrading
        // from a read lock fail with SQLITE_BUSY instead of waiting.
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(StoreError::backend)?;
        Ok(SqliteTx { tx })
    }

    async fn find_by_id(&self, id: ToDoId) -> StoreResult<Option<ToDoItem>> {
        sqlx::query_as::<_, ToDoRow>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?
            .map(ToDoItem::try_from)
            .transpose()
    }

    async fn list_all(&self) -> StoreResult<Vec<ToDoItem>> {
        sqlx::query_as::<_, ToDoRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(ToDoItem::try_from)
            .collect()
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("SQLite store closed");
    }
}

/// Transaction over a [`SqliteStore`]. Rolled back by `sqlx` when dropped
/// without [`persist`](StoreTx::persist).
pub struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTx for SqliteTx {
    async fn find_by_id(&mut self, id: ToDoId) -> StoreResult<Option<ToDoItem>> {
        sqlx::query_as::<_, ToDoRow>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?
            .map(ToDoItem::try_from)
            .transpose()
    }

    async fn insert(&mut self, item: NewToDoItem) -> StoreResult<ToDoItem> {
        let id = sqlx::query("INSERT INTO todo_items (title, description, status) VALUES (?, ?, ?)")
            .bind(&item.title)
            .bind(&item.description)
            .bind(i32::from(item.status))
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?
            .last_insert_rowid();
        Ok(item.with_id(id))
    }

    async fn update(&mut self, item: &ToDoItem) -> StoreResult<()> {
        let affected =
            sqlx::query("UPDATE todo_items SET title = ?, description = ?, status = ? WHERE id = ?")
                .bind(&item.title)
                .bind(&item.description)
                .bind(i32::from(item.status))
                .bind(item.id)
                .execute(&mut *self.tx)
                .await
                .map_err(StoreError::backend)?
                .rows_affected();
        if affected == 0 {
            return Err(StoreError::Stale { id: item.id });
        }
        Ok(())
    }

    async fn remove(&mut self, item: &ToDoItem) -> StoreResult<()> {
        let affected = sqlx::query("DELETE FROM todo_items WHERE id = ?")
            .bind(item.id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::Stale { id: item.id });
        }
        Ok(())
    }

    async fn persist(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::backend)
    }
}
