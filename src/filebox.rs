//! Grouped FileBox
//!
//! Files live inside named groups. Control flow for every file operation:
//!
//! ```text
//! caller ──► Group Registry ──► File Repository ──► Engine (one transaction)
//!            (name → gid)       (gid, name → bytes)
//! ```
//!
//! ## Caller-side invariants
//! The schema does not enforce them, so neither does this type:
//! - File names are not unique inside a group. Putting the same name twice
//!   keeps both rows; [`FileBox::get_file`] returns the oldest.
//! - `gid` is not a foreign key. Groups are only ever deleted through
//!   [`FileBox::delete_group`], which removes their files in the same commit.
//!
//! [`FileBox::remove_file`] is deliberately not scoped by group: it deletes
//! the name from every group at once.

use std::fs;
use std::path::Path;

use crate::config::{Config, Layout};
use crate::engine::Engine;
use crate::error::Result;
use crate::files;
use crate::groups::{self, Group};

/// Container using the grouped layout
pub struct FileBox {
    engine: Engine,
}

impl FileBox {
    /// Open or create a grouped container; the config's layout is forced to [`Layout::Grouped`]
    pub fn open(config: Config) -> Result<Self> {
        let config = Config {
            layout: Layout::Grouped,
            ..config
        };
        Ok(Self {
            engine: Engine::open(config)?,
        })
    }

    /// Open or create a grouped container in a database file
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Open a private in-memory grouped container
    pub fn in_memory() -> Result<Self> {
        Self::open(Config::builder().in_memory().build())
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Create an empty group. Fails with a constraint violation if it exists.
    pub fn create_group(&mut self, name: &str) -> Result<Group> {
        self.engine
            .write("create_group", |tx, tables| groups::insert_group(tx, tables, name))
    }

    /// Look up the id of a group. Fails with not-found if it does not exist.
    pub fn resolve_group_id(&self, name: &str) -> Result<i64> {
        self.engine
            .read(|conn, tables| groups::resolve_group_id(conn, tables, name))
    }

    pub fn group_exists(&self, name: &str) -> Result<bool> {
        self.engine
            .read(|conn, tables| Ok(groups::find_group_id(conn, tables, name)?.is_some()))
    }

    /// Group names in creation order
    pub fn list_group_names(&self) -> Result<Vec<String>> {
        let groups = self.list_groups()?;
        Ok(groups.into_iter().map(|g| g.name).collect())
    }

    /// Groups (id and name) in creation order
    pub fn list_groups(&self) -> Result<Vec<Group>> {
        self.engine.read(groups::list_groups)
    }

    /// Delete a group and all of its files
    ///
    /// Returns the number of files removed along with the group.
    pub fn delete_group(&mut self, name: &str) -> Result<usize> {
        self.engine
            .write("delete_group", |tx, tables| groups::delete_group(tx, tables, name))
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Store `data` as `name` inside `group`; returns the new row id
    ///
    /// The group must already exist. An existing file with the same name is
    /// left alone and a second row is added.
    pub fn put_file(&mut self, group: &str, data: &[u8], name: &str) -> Result<i64> {
        self.engine.write("put_file", |tx, tables| {
            let gid = groups::resolve_group_id(tx, tables, group)?;
            files::insert_file(tx, tables, gid, name, data)
        })
    }

    /// Read the contents of `name` inside `group`
    pub fn get_file(&self, group: &str, name: &str) -> Result<Vec<u8>> {
        self.engine
            .read(|conn, tables| files::select_file(conn, tables, group, name))
    }

    /// File names inside `group` in insertion order
    pub fn list_file_names(&self, group: &str) -> Result<Vec<String>> {
        self.engine.read(|conn, tables| {
            let gid = groups::resolve_group_id(conn, tables, group)?;
            files::list_file_names(conn, tables, gid)
        })
    }

    /// Delete every file called `name`, whatever group it is in
    ///
    /// Returns the number of rows removed; zero is not an error.
    pub fn remove_file(&mut self, name: &str) -> Result<usize> {
        self.engine
            .write("remove_file", |tx, tables| files::delete_files_named(tx, tables, name))
    }

    // =========================================================================
    // Filesystem helpers
    // =========================================================================

    /// Read `fs_path` from disk and store it as `name` inside `group`
    ///
    /// The group is resolved before the source file is opened, so a missing
    /// group is reported even when the path is also bad.
    pub fn put_file_from_path(&mut self, group: &str, fs_path: &Path, name: &str) -> Result<i64> {
        self.engine.write("put_file", |tx, tables| {
            let gid = groups::resolve_group_id(tx, tables, group)?;
            let data = fs::read(fs_path)?;
            files::insert_file(tx, tables, gid, name, &data)
        })
    }

    /// Write the contents of `name` inside `group` to `fs_path` (created or truncated)
    pub fn get_file_to_path(&self, group: &str, name: &str, fs_path: &Path) -> Result<()> {
        let data = self.get_file(group, name)?;
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
