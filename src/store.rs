//! DuckDB persistence gateway for price records.
//!
//! A [`Database`] is opened once per process and hands out one
//! [`StoreConnection`] per request. Connections are cloned from a root
//! handle, so every request talks to the same database through its own
//! connection and runs its own transaction.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use duckdb::{params, Connection as DuckDbConnection, Transaction};
use tracing::{debug, info, warn};

use crate::config::AggregateScope;
use crate::error::{PricesError, Result};
use crate::models::{round_cents, ImportSummary, PriceRecord};

const CREATE_SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS prices (
        id BIGINT PRIMARY KEY,
        created_date DATE NOT NULL,
        name VARCHAR NOT NULL,
        category VARCHAR NOT NULL,
        price DECIMAL(18, 2) NOT NULL
    )
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO prices (id, created_date, name, category, price)
    VALUES (?, CAST(? AS DATE), ?, ?, ?)
"#;

const SELECT_ALL_SQL: &str = r#"
    SELECT
        id,
        CAST(created_date AS VARCHAR) AS created_date,
        name,
        category,
        CAST(price AS DOUBLE) AS price
    FROM prices
"#;

const STORE_TOTALS_SQL: &str = r#"
    SELECT
        COUNT(*) AS total_items,
        COUNT(DISTINCT category) AS total_categories,
        CAST(COALESCE(SUM(price), 0) AS DOUBLE) AS total_price
    FROM prices
"#;

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Process-lifetime handle on the price store.
pub struct Database {
    root: Mutex<DuckDbConnection>,
    location: String,
}

impl Database {
    /// Open (or create) an on-disk database and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(path)?;
        Self::init(conn, path.display().to_string())
    }

    /// Open a private in-memory database. Its contents live as long as the
    /// returned handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Self::init(conn, ":memory:".to_string())
    }

    /// Open the database, retrying up to `attempts` times with `backoff`
    /// between failures. `None` opens an in-memory database.
    ///
    /// Another process holding the database file's lock is the usual reason
    /// an open fails transiently.
    pub fn open_with_retry(path: Option<&Path>, attempts: u32, backoff: Duration) -> Result<Self> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            let opened = match path {
                Some(p) => Self::open(p),
                None => Self::open_in_memory(),
            };
            match opened {
                Ok(db) => {
                    db.ping()?;
                    info!(location = %db.location, "price store is ready");
                    return Ok(db);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        "price store not ready, retrying in {:?} ({}/{}): {}",
                        backoff, attempt, attempts, e
                    );
                    thread::sleep(backoff);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(PricesError::Internal(format!(
                        "price store not ready after {attempts} attempts: {e}"
                    )))
                }
            }
        }
    }

    fn init(conn: DuckDbConnection, location: String) -> Result<Self> {
        conn.execute_batch(CREATE_SCHEMA_SQL)?;
        debug!(%location, "price schema ensured");
        Ok(Self {
            root: Mutex::new(conn),
            location,
        })
    }

    /// Open a new connection to the same database for one unit of work.
    pub fn connect(&self) -> Result<StoreConnection> {
        let root = self
            .root
            .lock()
            .map_err(|_| PricesError::Internal("database lock poisoned".into()))?;
        let conn = root.try_clone()?;
        Ok(StoreConnection { conn })
    }

    /// Health check: run `SELECT 1` on a fresh connection.
    pub fn ping(&self) -> Result<()> {
        self.connect()?.ping()
    }

    /// `:memory:` or the filesystem path the database was opened from.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The on-disk path, if this is not an in-memory database.
    pub fn path(&self) -> Option<PathBuf> {
        (self.location != ":memory:").then(|| PathBuf::from(&self.location))
    }
}

// ---------------------------------------------------------------------------
// StoreConnection
// ---------------------------------------------------------------------------

/// One connection to the price store, owned by a single request.
pub struct StoreConnection {
    conn: DuckDbConnection,
}

impl StoreConnection {
    pub fn ping(&self) -> Result<()> {
        let _: i32 = self.conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(())
    }

    /// Number of persisted records.
    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))?)
    }

    /// Open the transaction that will hold every insert of one import.
    pub fn begin_import(&mut self, scope: AggregateScope) -> Result<ImportTransaction<'_>> {
        let tx = self.conn.transaction()?;
        Ok(ImportTransaction {
            tx,
            scope,
            items: 0,
            categories: HashSet::new(),
            total_price: 0.0,
        })
    }

    /// Feed every persisted record to `visit`, each exactly once and in no
    /// particular order. Stops at the first error `visit` returns.
    ///
    /// Returns the number of records visited.
    pub fn query_all<F>(&self, mut visit: F) -> Result<usize>
    where
        F: FnMut(PriceRecord) -> Result<()>,
    {
        let mut stmt = self.conn.prepare(SELECT_ALL_SQL)?;
        let mut rows = stmt.query([])?;
        let mut visited = 0;

        while let Some(row) = rows.next()? {
            let record = PriceRecord {
                id: row.get(0)?,
                created_date: row.get(1)?,
                name: row.get(2)?,
                category: row.get(3)?,
                price: row.get(4)?,
            };
            visit(record)?;
            visited += 1;
        }

        Ok(visited)
    }
}

// ---------------------------------------------------------------------------
// ImportTransaction
// ---------------------------------------------------------------------------

/// An open import transaction.
///
/// Nothing inserted through it is visible to other connections until
/// [`commit`](Self::commit) succeeds. Dropping it without committing rolls
/// every insert back.
pub struct ImportTransaction<'a> {
    tx: Transaction<'a>,
    scope: AggregateScope,
    items: i64,
    categories: HashSet<String>,
    total_price: f64,
}

impl ImportTransaction<'_> {
    /// Insert one record. Duplicate ids and unparsable dates are rejected by
    /// the store.
    ///
    /// The price is rounded to cents before it is bound, so the running total
    /// adds up exactly what the column holds.
    pub fn insert(&mut self, record: &PriceRecord) -> Result<()> {
        let price = round_cents(record.price);
        self.tx.execute(
            INSERT_SQL,
            params![
                record.id,
                record.created_date,
                record.name,
                record.category,
                price
            ],
        )?;

        self.items += 1;
        self.total_price += price;
        if !self.categories.contains(&record.category) {
            self.categories.insert(record.category.clone());
        }
        Ok(())
    }

    /// Rows inserted so far in this transaction.
    pub fn inserted(&self) -> i64 {
        self.items
    }

    /// Compute the summary for the configured scope, then commit.
    pub fn commit(self) -> Result<ImportSummary> {
        let summary = match self.scope {
            AggregateScope::Batch => ImportSummary::new(
                self.items,
                self.categories.len() as i64,
                self.total_price,
            ),
            AggregateScope::Store => {
                let (items, categories, price): (i64, i64, f64) =
                    self.tx.query_row(STORE_TOTALS_SQL, [], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                    })?;
                ImportSummary::new(items, categories, price)
            }
        };

        self.tx.commit()?;
        Ok(summary)
    }

    pub fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
