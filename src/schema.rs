//! Schema Module
//!
//! Table names resolved from [`Config`] plus the DDL for each layout.
//!
//! ## Grouped layout
//! ```text
//! groups                       files
//! ┌────┬────────────────┐      ┌────┬─────┬──────┬──────┐
//! │ id │ name (UNIQUE)  │◄─────│ id │ gid │ name │ data │
//! └────┴────────────────┘      └────┴─────┴──────┴──────┘
//! ```
//! `gid` is a plain integer: there is no foreign key and no
//! `(gid, name)` uniqueness. Both are caller-side invariants.
//!
//! ## Flat layout
//! ```text
//! files
//! ┌────┬────────────────┬──────┐
//! │ id │ name (UNIQUE)  │ data │
//! └────┴────────────────┴──────┘
//! ```

use std::collections::HashSet;

use rusqlite::Connection;

use crate::config::{Config, Layout};
use crate::error::{FileboxError, Result};

/// Table names for one container, fixed at open time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    layout: Layout,
    groups: String,
    files: String,
}

impl Tables {
    pub fn from_config(config: &Config) -> Self {
        Self {
            layout: config.layout,
            groups: config.groups_table.clone(),
            files: config.files_table.clone(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn groups(&self) -> &str {
        &self.groups
    }

    pub fn files(&self) -> &str {
        &self.files
    }

    /// `CREATE ... IF NOT EXISTS` statements for this layout
    pub fn ddl(&self) -> String {
        match self.layout {
            Layout::Flat => format!(
                "CREATE TABLE IF NOT EXISTS {files} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name VARCHAR UNIQUE,
                    data BLOB
                );",
                files = self.files
            ),
            Layout::Grouped => format!(
                "CREATE TABLE IF NOT EXISTS {groups} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name VARCHAR UNIQUE
                );
                CREATE TABLE IF NOT EXISTS {files} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    gid INTEGER,
                    name VARCHAR,
                    data BLOB
                );
                CREATE INDEX IF NOT EXISTS idx_{files}_name ON {files}(name);",
                groups = self.groups,
                files = self.files
            ),
        }
    }

    /// Create missing tables, then make sure existing ones have the expected shape
    ///
    /// A grouped `files` table also has `id`, `name` and `data`, so the flat
    /// check additionally rejects a `gid` column and requires `name` to be
    /// backed by a unique index. Otherwise flat puts would land in a table
    /// that accepts duplicate names.
    pub(crate) fn ensure(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(&self.ddl())?;

        match self.layout {
            Layout::Flat => {
                let present = self.check_columns(conn, &self.files, &["id", "name", "data"])?;
                if present.contains("gid") {
                    return Err(self.mismatch(&self.files, "unexpected column: gid"));
                }
                if !has_unique_index(conn, &self.files, "name")? {
                    return Err(self.mismatch(&self.files, "column 'name' is not unique"));
                }
            }
            Layout::Grouped => {
                self.check_columns(conn, &self.groups, &["id", "name"])?;
                self.check_columns(conn, &self.files, &["id", "gid", "name", "data"])?;
            }
        }
        Ok(())
    }

    fn check_columns(
        &self,
        conn: &Connection,
        table: &str,
        expected: &[&str],
    ) -> Result<HashSet<String>> {
        let present = table_columns(conn, table)?;
        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|col| !present.contains(*col))
            .collect();

        if missing.is_empty() {
            Ok(present)
        } else {
            Err(self.mismatch(table, &format!("missing columns: {}", missing.join(", "))))
        }
    }

    fn mismatch(&self, table: &str, detail: &str) -> FileboxError {
        FileboxError::Config(format!(
            "table '{}' does not match the {:?} layout ({})",
            table, self.layout, detail
        ))
    }
}

/// True when a full (non-partial) unique index covers exactly `column`
fn has_unique_index(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table))?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(1)?,
            row.get::<_, bool>(2)?,
            row.get::<_, bool>(4)?,
        ))
    })?;

    let mut unique = Vec::new();
    for r in rows {
        let (index, is_unique, is_partial) = r?;
        if is_unique && !is_partial {
            unique.push(index);
        }
    }

    for index in unique {
        let mut info = conn.prepare(&format!(
            "PRAGMA index_info(\"{}\")",
            index.replace('"', "\"\"")
        ))?;
        let rows = info.query_map([], |row| row.get::<_, Option<String>>(2))?;
        let mut cols = Vec::new();
        for r in rows {
            cols.push(r?);
        }
        if cols.len() == 1 && cols[0].as_deref() == Some(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = HashSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}
