//! File Repository
//!
//! Maps `(group id, file name)` to bytes in the grouped layout.
//!
//! Names are not unique within a group: every put inserts a new row, and
//! a lookup that matches several rows returns the one with the lowest id
//! (the oldest put).

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{FileboxError, Result};
use crate::schema::Tables;

/// Insert a file row under an already-resolved group id; returns the row id
pub(crate) fn insert_file(
    conn: &Connection,
    tables: &Tables,
    gid: i64,
    name: &str,
    data: &[u8],
) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO {}(gid, name, data) VALUES (?1, ?2, ?3)",
            tables.files()
        ),
        params![gid, name, data],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(gid, file = name, id, bytes = data.len(), "File stored");
    Ok(id)
}

/// Fetch the contents of `name` inside group `group`
pub(crate) fn select_file(
    conn: &Connection,
    tables: &Tables,
    group: &str,
    name: &str,
) -> Result<Vec<u8>> {
    let sql = format!(
        "SELECT f.data FROM {files} AS f
         JOIN {groups} AS g ON g.id = f.gid
         WHERE g.name = ?1 AND f.name = ?2
         ORDER BY f.id
         LIMIT 1",
        files = tables.files(),
        groups = tables.groups()
    );

    // Outer Option: row present. Inner Option: NULL data column.
    let data: Option<Option<Vec<u8>>> = conn
        .query_row(&sql, params![group, name], |row| row.get(0))
        .optional()?;

    match data {
        Some(bytes) => Ok(bytes.unwrap_or_default()),
        None => Err(FileboxError::FileNotFound {
            group: Some(group.to_string()),
            name: name.to_string(),
        }),
    }
}

/// File names stored under a group id, in row order (duplicates included)
pub(crate) fn list_file_names(conn: &Connection, tables: &Tables, gid: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT name FROM {} WHERE gid = ?1 ORDER BY id",
        tables.files()
    ))?;
    let rows = stmt.query_map(params![gid], |row| row.get::<_, String>(0))?;

    let mut names = Vec::new();
    for r in rows {
        names.push(r?);
    }
    Ok(names)
}

/// Delete every file called `name`, in every group
pub(crate) fn delete_files_named(conn: &Connection, tables: &Tables, name: &str) -> Result<usize> {
    let removed = conn.execute(
        &format!("DELETE FROM {} WHERE name = ?1", tables.files()),
        params![name],
    )?;
    tracing::debug!(file = name, removed, "Files removed");
    Ok(removed)
}
