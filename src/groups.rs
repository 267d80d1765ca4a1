//! Group Registry
//!
//! Maps group names to engine-assigned ids. Every group-scoped file
//! operation resolves its group through [`resolve_group_id`] first.
//!
//! Functions here take a plain `&Connection`; writers pass the open
//! transaction (which derefs to a connection) so a multi-statement
//! operation stays inside one commit.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{FileboxError, Result};
use crate::schema::Tables;

/// A named collection of files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// Insert a group; fails with a constraint violation if the name is taken
pub(crate) fn insert_group(conn: &Connection, tables: &Tables, name: &str) -> Result<Group> {
    conn.execute(
        &format!("INSERT INTO {}(name) VALUES (?1)", tables.groups()),
        params![name],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(group = name, id, "Group created");

    Ok(Group {
        id,
        name: name.to_string(),
    })
}

pub(crate) fn find_group_id(conn: &Connection, tables: &Tables, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name = ?1", tables.groups()),
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Resolve a group name to its id, or fail with [`FileboxError::GroupNotFound`]
pub(crate) fn resolve_group_id(conn: &Connection, tables: &Tables, name: &str) -> Result<i64> {
    find_group_id(conn, tables, name)?.ok_or_else(|| FileboxError::GroupNotFound(name.to_string()))
}

/// All groups in row (insertion) order
pub(crate) fn list_groups(conn: &Connection, tables: &Tables) -> Result<Vec<Group>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT id, name FROM {} ORDER BY id",
        tables.groups()
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(Group {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut groups = Vec::new();
    for r in rows {
        groups.push(r?);
    }
    Ok(groups)
}

/// Delete a group and every file that references it
///
/// Returns the number of file rows removed with the group.
pub(crate) fn delete_group(conn: &Connection, tables: &Tables, name: &str) -> Result<usize> {
    let gid = resolve_group_id(conn, tables, name)?;

    let files_removed = conn.execute(
        &format!("DELETE FROM {} WHERE gid = ?1", tables.files()),
        params![gid],
    )?;
    conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", tables.groups()),
        params![gid],
    )?;

    tracing::debug!(group = name, gid, files_removed, "Group deleted");
    Ok(files_removed)
}
