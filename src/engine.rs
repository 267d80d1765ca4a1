//! Engine Module
//!
//! The storage engine that every container sits on.
//!
//! ## Responsibilities
//! - Open or create the backing SQLite database
//! - Create the schema on every open (never destructive)
//! - Run reads against the live connection
//! - Run each logical write inside one transaction that commits before
//!   returning, or rolls back on any error

use std::path::Path;

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

use crate::config::{Config, Layout, Location};
use crate::error::{FileboxError, Result};
use crate::schema::Tables;

/// The storage engine
///
/// ## Concurrency Model: single owner
///
/// The engine owns exactly one connection for its whole lifetime; there is
/// no pooling. `Engine` is `Send` but not `Sync`, and writes take
/// `&mut self`, so one value cannot be shared between threads without the
/// caller adding its own lock. Two engines opened on the same file are
/// two independent writers: SQLite's file locking is the only coordination
/// and a blocked writer fails with a database error (or waits up to
/// [`Config::busy_timeout`] when one is set). Keeping a single writer per
/// container is the caller's job.
#[derive(Debug)]
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Table names resolved at open time
    tables: Tables,

    /// The one connection used for every operation
    conn: Connection,
}

impl Engine {
    /// Open or create a container with the given config
    ///
    /// On startup:
    /// 1. Validate table names
    /// 2. Open/create the database (file or memory)
    /// 3. Apply the busy timeout, if any
    /// 4. Create missing tables and check existing ones
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Reject table names that cannot be spliced into SQL
        config.validate()?;
        let tables = Tables::from_config(&config);
        let location = config.location.describe();

        // Step 2: Open the connection
        let conn = match &config.location {
            Location::Path(path) => Connection::open(path),
            Location::Memory => Connection::open_in_memory(),
        }
        .map_err(|e| open_error(&location, e))?;

        // Step 3: Busy timeout
        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout)?;
        }

        // Step 4: Schema (SQLite defers file creation until first write,
        // so an unusable path can still surface here)
        tables.ensure(&conn).map_err(|e| match e {
            FileboxError::Database(inner) => open_error(&location, inner),
            other => other,
        })?;

        tracing::info!(
            location = %location,
            layout = ?config.layout,
            "Container opened"
        );

        Ok(Self {
            config,
            tables,
            conn,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified database file and layout
    pub fn open_path(path: &Path, layout: Layout) -> Result<Self> {
        let config = Config::builder().path(path).layout(layout).build();
        Self::open(config)
    }

    /// Run a read against the connection
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, &Tables) -> Result<T>,
    {
        f(&self.conn, &self.tables)
    }

    /// Run one logical write as a single transaction
    ///
    /// The transaction starts `IMMEDIATE` so the write lock is taken up
    /// front. `Ok` commits before returning; `Err` (or a panic) drops the
    /// transaction, which rolls everything back.
    pub fn write<T, F>(&mut self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>, &Tables) -> Result<T>,
    {
        let tables = &self.tables;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        match f(&tx, tables) {
            Ok(value) => {
                tx.commit()?;
                tracing::trace!(op, "Committed");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(op, error = %e, "Rolling back");
                drop(tx);
                Err(e)
            }
        }
    }

    /// Close the container, surfacing any error from SQLite
    pub fn close(self) -> Result<()> {
        let location = self.config.location.describe();
        self.conn.close().map_err(|(_, e)| FileboxError::from(e))?;
        tracing::debug!(location = %location, "Container closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the resolved table names
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Get the schema layout
    pub fn layout(&self) -> Layout {
        self.tables.layout()
    }
}

/// Failures to reach the database file are I/O errors; anything else
/// (corrupt header, constraint in DDL, ...) keeps its own classification.
fn open_error(location: &str, e: rusqlite::Error) -> FileboxError {
    match e.sqlite_error_code() {
        Some(ErrorCode::CannotOpen)
        | Some(ErrorCode::PermissionDenied)
        | Some(ErrorCode::ReadOnly)
        | Some(ErrorCode::SystemIoFailure) => FileboxError::Open {
            location: location.to_string(),
            source: e,
        },
        _ => FileboxError::from(e),
    }
}
