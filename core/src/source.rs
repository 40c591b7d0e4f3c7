//! SQLite access layer.
//!
//! RULE: only this module talks to the database. Pipeline stages consume
//! row-sets; they never execute SQL themselves.
//!
//! Every fetch acquires one scoped connection from the provider, runs one
//! statement, and releases the connection on every exit path when it drops.
//! No pooling, no reuse across calls, no retries.

use rusqlite::{Connection, OpenFlags};

use crate::{
    error::{LensError, LensResult},
    rowset::{RowSet, Value},
};

/// Capability to open a scoped connection to the relational source.
///
/// Connection parameters (path, credentials) live with the implementor;
/// the pipeline only requires a live connection or a reported failure.
pub trait ConnectionProvider {
    fn connect(&self) -> LensResult<Connection>;
}

/// Provider for a SQLite database file, or a shared-memory URI in tests.
pub struct SqliteProvider {
    path: String,
}

impl SqliteProvider {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl ConnectionProvider for SqliteProvider {
    fn connect(&self) -> LensResult<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(LensError::Connectivity)
    }
}

/// The row-set fetcher and table-catalog lister.
pub struct DataSource<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> DataSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run one read-only query and collect the full result set.
    pub fn try_fetch(&self, sql: &str) -> LensResult<RowSet> {
        let conn = self.provider.connect()?;
        let mut stmt = conn.prepare(sql).map_err(LensError::Query)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let width = columns.len();

        let mut out = RowSet::new(columns);
        let mut rows = stmt.query([]).map_err(LensError::Query)?;
        while let Some(row) = rows.next().map_err(LensError::Query)? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                let v: rusqlite::types::Value = row.get(i).map_err(LensError::Query)?;
                cells.push(Value::from(v));
            }
            out.push_row(cells);
        }
        Ok(out)
    }

    /// Dashboard boundary: any failure is logged and collapses to the empty
    /// row-set, the uniform no-data signal downstream stages expect.
    pub fn fetch(&self, sql: &str) -> RowSet {
        match self.try_fetch(sql) {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("query failed: {e}");
                RowSet::empty()
            }
        }
    }

    pub fn try_table_names(&self) -> LensResult<Vec<String>> {
        let conn = self.provider.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(LensError::Query)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(LensError::Query)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(LensError::Query)?;
        Ok(names)
    }

    /// Catalog listing; empty on any failure.
    pub fn table_names(&self) -> Vec<String> {
        match self.try_table_names() {
            Ok(names) => names,
            Err(e) => {
                log::error!("could not list tables: {e}");
                Vec::new()
            }
        }
    }
}
