//! Tests for Engine
//!
//! These tests verify:
//! - Opening file-backed and in-memory containers
//! - Idempotent schema creation and persistence across reopen
//! - I/O classification of unusable locations
//! - Layout checks on reopen, in both directions
//! - Configured table names and busy timeout
//! - Commit/rollback of a logical write

use std::time::{Duration, Instant};

use filebox::config::{Config, Layout};
use filebox::engine::Engine;
use filebox::{ErrorKind, FileBox, FileboxError, FlatBox};
use rusqlite::params;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine(layout: Layout) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("box.sqlite"))
        .layout(layout)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn count_rows(engine: &Engine, table: &str) -> i64 {
    engine
        .read(|conn, _| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?)
        })
        .unwrap()
}

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_engine_open_creates_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("new.sqlite");
    assert!(!db_path.exists());

    let _engine = Engine::open_path(&db_path, Layout::Grouped).unwrap();

    assert!(db_path.exists());
}

#[test]
fn test_engine_open_in_memory() {
    let config = Config::builder().in_memory().build();
    let engine = Engine::open(config).unwrap();

    assert_eq!(engine.layout(), Layout::Grouped);
    assert_eq!(count_rows(&engine, "groups"), 0);
    assert_eq!(count_rows(&engine, "files"), 0);
}

#[test]
fn test_engine_open_missing_parent_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("no").join("such").join("dir.sqlite");

    let err = Engine::open_path(&db_path, Layout::Flat).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(err, FileboxError::Open { .. }));
}

#[test]
fn test_engine_rejects_invalid_table_name() {
    let config = Config::builder()
        .in_memory()
        .files_table("files; DROP TABLE groups")
        .build();

    let err = Engine::open(config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_engine_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("box.sqlite");

    {
        let mut fbox = FileBox::open_path(&db_path).unwrap();
        fbox.create_group("g1").unwrap();
        fbox.put_file("g1", b"persisted", "a.txt").unwrap();
        fbox.close().unwrap();
    }

    // Schema creation on the second open must not disturb existing rows
    let fbox = FileBox::open_path(&db_path).unwrap();
    assert_eq!(fbox.list_group_names().unwrap(), vec!["g1".to_string()]);
    assert_eq!(fbox.get_file("g1", "a.txt").unwrap(), b"persisted".to_vec());
}

#[test]
fn test_engine_layout_mismatch_on_reopen() {
    let (temp, engine) = setup_temp_engine(Layout::Flat);
    let location = engine.config().location.clone();
    drop(engine);

    let config = Config::builder()
        .location(location)
        .layout(Layout::Grouped)
        .build();
    let err = Engine::open(config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    drop(temp);
}

#[test]
fn test_engine_grouped_container_rejected_as_flat() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("box.sqlite");

    {
        let mut fbox = FileBox::open_path(&db_path).unwrap();
        fbox.create_group("g").unwrap();
        fbox.close().unwrap();
    }

    // The grouped files table has id/name/data too, but no unique name
    let err = FlatBox::open_path(&db_path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = Engine::open_path(&db_path, Layout::Flat).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    // The grouped container itself is untouched
    let fbox = FileBox::open_path(&db_path).unwrap();
    assert_eq!(fbox.list_group_names().unwrap(), vec!["g".to_string()]);
}

#[test]
fn test_engine_custom_table_names() {
    let config = Config::builder()
        .in_memory()
        .groups_table("boxes")
        .files_table("blobs")
        .build();
    let mut fbox = FileBox::open(config).unwrap();

    fbox.create_group("g").unwrap();
    fbox.put_file("g", b"x", "n").unwrap();

    assert_eq!(count_rows(fbox.engine(), "boxes"), 1);
    assert_eq!(count_rows(fbox.engine(), "blobs"), 1);
    assert_eq!(fbox.engine().tables().files(), "blobs");
}

#[test]
fn test_engine_busy_timeout_expires_on_locked_write() {
    let (_temp, mut holder) = setup_temp_engine(Layout::Grouped);
    let location = holder.config().location.clone();

    // A second container tries to write while the first holds the write lock
    let (elapsed, err) = holder
        .write("hold", |_, _| {
            let config = Config::builder()
                .location(location)
                .busy_timeout(Duration::from_millis(200))
                .build();
            let mut waiter = Engine::open(config)?;

            let start = Instant::now();
            let err = waiter.write("blocked", |_, _| Ok(())).unwrap_err();
            Ok((start.elapsed(), err))
        })
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Database);
    assert!(elapsed >= Duration::from_millis(150));
    // Well under the connection's built-in default wait
    assert!(elapsed < Duration::from_secs(4));
}

// =============================================================================
// Transaction Tests
// =============================================================================

#[test]
fn test_engine_write_commits() {
    let (_temp, mut engine) = setup_temp_engine(Layout::Grouped);

    engine
        .write("test", |tx, tables| {
            tx.execute(
                &format!("INSERT INTO {}(name) VALUES (?1)", tables.groups()),
                params!["g"],
            )?;
            Ok(())
        })
        .unwrap();

    assert_eq!(count_rows(&engine, "groups"), 1);
}

#[test]
fn test_engine_write_rolls_back_on_error() {
    let (_temp, mut engine) = setup_temp_engine(Layout::Grouped);

    let result: filebox::Result<()> = engine.write("test", |tx, tables| {
        tx.execute(
            &format!("INSERT INTO {}(name) VALUES (?1)", tables.groups()),
            params!["g"],
        )?;
        Err(FileboxError::GroupNotFound("late failure".to_string()))
    });

    assert!(result.unwrap_err().is_not_found());
    assert_eq!(count_rows(&engine, "groups"), 0);
}

#[test]
fn test_engine_write_rolls_back_partial_multi_statement() {
    let (_temp, mut engine) = setup_temp_engine(Layout::Grouped);

    engine
        .write("seed", |tx, tables| {
            tx.execute(
                &format!("INSERT INTO {}(name) VALUES ('g')", tables.groups()),
                [],
            )?;
            Ok(())
        })
        .unwrap();

    // Second statement violates the unique name; the first must not survive
    let err = engine
        .write("dup", |tx, tables| {
            tx.execute(
                &format!("INSERT INTO {}(gid, name) VALUES (1, 'f')", tables.files()),
                [],
            )?;
            tx.execute(
                &format!("INSERT INTO {}(name) VALUES ('g')", tables.groups()),
                [],
            )?;
            Ok(())
        })
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert_eq!(count_rows(&engine, "files"), 0);
    assert_eq!(count_rows(&engine, "groups"), 1);
}

#[test]
fn test_engine_close() {
    let (_temp, engine) = setup_temp_engine(Layout::Flat);
    engine.close().unwrap();
}
