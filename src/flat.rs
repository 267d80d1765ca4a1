//! Flat FileBox
//!
//! The first-generation layout: one `files` table, no groups, and file
//! names unique across the whole container. A second put under an existing
//! name fails with a constraint violation; nothing is ever overwritten.

use std::fs;
use std::path::Path;

use rusqlite::{params, OptionalExtension};

use crate::config::{Config, Layout};
use crate::engine::Engine;
use crate::error::{FileboxError, Result};

/// Container using the flat layout
#[derive(Debug)]
pub struct FlatBox {
    engine: Engine,
}

impl FlatBox {
    /// Open or create a flat container; the config's layout is forced to [`Layout::Flat`]
    pub fn open(config: Config) -> Result<Self> {
        let config = Config {
            layout: Layout::Flat,
            ..config
        };
        Ok(Self {
            engine: Engine::open(config)?,
        })
    }

    /// Open or create a flat container in a database file
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Open a private in-memory flat container
    pub fn in_memory() -> Result<Self> {
        Self::open(Config::builder().in_memory().build())
    }

    /// Store `data` as `name`
    pub fn put(&mut self, name: &str, data: &[u8]) -> Result<i64> {
        self.engine.write("put", |tx, tables| {
            tx.execute(
                &format!("INSERT INTO {}(name, data) VALUES (?1, ?2)", tables.files()),
                params![name, data],
            )?;
            let id = tx.last_insert_rowid();
            tracing::debug!(file = name, id, bytes = data.len(), "File stored");
            Ok(id)
        })
    }

    /// Read the contents stored as `name`
    pub fn get(&self, name: &str) -> Result<Vec<u8>> {
        self.engine.read(|conn, tables| {
            let data: Option<Option<Vec<u8>>> = conn
                .query_row(
                    &format!("SELECT data FROM {} WHERE name = ?1", tables.files()),
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            data.map(Option::unwrap_or_default)
                .ok_or_else(|| FileboxError::FileNotFound {
                    group: None,
                    name: name.to_string(),
                })
        })
    }

    /// Delete `name`; returns how many rows went away (0 or 1)
    pub fn remove(&mut self, name: &str) -> Result<usize> {
        self.engine.write("remove", |tx, tables| {
            let removed = tx.execute(
                &format!("DELETE FROM {} WHERE name = ?1", tables.files()),
                params![name],
            )?;
            tracing::debug!(file = name, removed, "File removed");
            Ok(removed)
        })
    }

    /// All stored names in insertion order
    pub fn list_names(&self) -> Result<Vec<String>> {
        self.engine.read(|conn, tables| {
            let mut stmt =
                conn.prepare_cached(&format!("SELECT name FROM {} ORDER BY id", tables.files()))?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

            let mut names = Vec::new();
            for r in rows {
                names.push(r?);
            }
            Ok(names)
        })
    }

    // =========================================================================
    // Filesystem helpers
    // =========================================================================

    /// Read `fs_path` from disk and store its contents as `name`
    pub fn put_path(&mut self, fs_path: &Path, name: &str) -> Result<i64> {
        let data = fs::read(fs_path)?;
        self.put(name, &data)
    }

    /// Write the contents stored as `name` to `fs_path` (created or truncated)
    pub fn get_to_path(&self, name: &str, fs_path: &Path) -> Result<()> {
        let data = self.get(name)?;
        fs::write(fs_path, data)?;
        Ok(())
    }

    /// Get the underlying engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Close the container
    pub fn close(self) -> Result<()> {
        self.engine.close()
    }
}
