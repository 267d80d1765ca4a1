//! # FileBox
//!
//! Store named files inside a single SQLite database and read them back by
//! name, optionally organized into groups.
//!
//! - Flat layout ([`FlatBox`]): file names unique per container
//! - Grouped layout ([`FileBox`]): groups own files; deleting a group
//!   deletes its files
//! - Every write commits (or rolls back) before the call returns
//! - Whole-file buffering: contents go in and come out as byte vectors
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  FileBox / FlatBox (API)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Group     │          │    File     │
//!   │  Registry   │─────────►│ Repository  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌─────────────┐
//!              │   Engine    │
//!              │  (SQLite)   │
//!              └─────────────┘
//! ```
//!
//! ## Threading
//! A container owns one connection and is not `Sync`. Use one container
//! per thread, or wrap it in your own lock; there is no multi-writer
//! protocol.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod engine;
pub mod groups;
mod files;
pub mod filebox;
pub mod flat;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, FileboxError, Result};
pub use config::{Config, Layout, Location};
pub use engine::Engine;
pub use filebox::FileBox;
pub use flat::FlatBox;
pub use groups::Group;

// =============================================================================
// Factory Functions
// =============================================================================

/// Open a grouped container; `":memory:"` opens an in-memory one
pub fn open(location: &str) -> Result<FileBox> {
    FileBox::open(Config::builder().location(Location::parse(location)).build())
}

/// Open a flat container; `":memory:"` opens an in-memory one
pub fn open_flat(location: &str) -> Result<FlatBox> {
    FlatBox::open(Config::builder().location(Location::parse(location)).build())
}

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FileBox
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
