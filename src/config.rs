//! Configuration for FileBox
//!
//! Centralized configuration with sensible defaults. Table names live here
//! and are resolved once when a container is opened.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FileboxError, Result};

/// Location alias accepted by [`Location::parse`] for an ephemeral container
pub const MEMORY_LOCATION: &str = ":memory:";

/// Main configuration for a FileBox container
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Where the container lives (database file or in-memory)
    pub location: Location,

    /// Which schema the container uses
    pub layout: Layout,

    // -------------------------------------------------------------------------
    // Schema Configuration
    // -------------------------------------------------------------------------
    /// Name of the groups table (grouped layout only)
    pub groups_table: String,

    /// Name of the files table
    pub files_table: String,

    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// How long to wait on a locked database before failing.
    /// `None` keeps SQLite's default behaviour.
    pub busy_timeout: Option<Duration>,
}

/// Backing store of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A database file on disk (created if absent)
    Path(PathBuf),

    /// A private in-memory database, gone when the container is dropped
    Memory,
}

/// Schema layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Single `files` table, file names unique container-wide
    Flat,

    /// `groups` + `files` tables, file names scoped (loosely) by group
    Grouped,
}

impl Location {
    /// Interpret a user-supplied location; `":memory:"` selects an in-memory container
    pub fn parse(location: &str) -> Self {
        if location == MEMORY_LOCATION {
            Location::Memory
        } else {
            Location::Path(PathBuf::from(location))
        }
    }

    /// Human-readable form, used in logs and errors
    pub fn describe(&self) -> String {
        match self {
            Location::Path(path) => path.display().to_string(),
            Location::Memory => MEMORY_LOCATION.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: Location::Path(PathBuf::from("filebox.sqlite")),
            layout: Layout::Grouped,
            groups_table: "groups".to_string(),
            files_table: "files".to_string(),
            busy_timeout: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that table names are usable as bare SQL identifiers
    ///
    /// Table names are spliced into statements, so anything beyond
    /// `[A-Za-z_][A-Za-z0-9_]*` is rejected.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.files_table)?;
        if self.layout == Layout::Grouped {
            validate_identifier(&self.groups_table)?;
            if self.groups_table.eq_ignore_ascii_case(&self.files_table) {
                return Err(FileboxError::Config(format!(
                    "groups and files tables must differ (both are '{}')",
                    self.files_table
                )));
            }
        }
        Ok(())
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FileboxError::Config(format!("invalid table name '{}'", name)))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Store the container in a database file
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.location = Location::Path(path.into());
        self
    }

    /// Keep the container in memory
    pub fn in_memory(mut self) -> Self {
        self.config.location = Location::Memory;
        self
    }

    /// Set the location directly
    pub fn location(mut self, location: Location) -> Self {
        self.config.location = location;
        self
    }

    /// Set the schema layout
    pub fn layout(mut self, layout: Layout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Set the groups table name
    pub fn groups_table(mut self, name: impl Into<String>) -> Self {
        self.config.groups_table = name.into();
        self
    }

    /// Set the files table name
    pub fn files_table(mut self, name: impl Into<String>) -> Self {
        self.config.files_table = name.into();
        self
    }

    /// Set the busy timeout
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
