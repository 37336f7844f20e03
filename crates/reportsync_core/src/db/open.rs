//! Connection bootstrap utilities for the two stores.
//!
//! # Responsibility
//! - Open file or in-memory connections for the source and report
//!   stores, configure pragmas and apply that store's migrations.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have that store's migrations fully applied.

use super::migrations::{apply_migrations, Store};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the canonical source store and applies its migrations.
pub fn open_source_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_file(path, Store::Source)
}

/// Opens the report store and applies its migrations.
pub fn open_report_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_file(path, Store::Report)
}

/// Opens an in-memory source store, mainly for tests.
pub fn open_source_db_in_memory() -> DbResult<Connection> {
    open_memory(Store::Source)
}

/// Opens an in-memory report store, mainly for tests.
pub fn open_report_db_in_memory() -> DbResult<Connection> {
    open_memory(Store::Report)
}

fn open_file(path: impl AsRef<Path>, store: Store) -> DbResult<Connection> {
    let started_at = Instant::now();
    let conn = Connection::open(path);
    finish_open(conn, store, "file", started_at)
}

fn open_memory(store: Store) -> DbResult<Connection> {
    let started_at = Instant::now();
    let conn = Connection::open_in_memory();
    finish_open(conn, store, "memory", started_at)
}

fn finish_open(
    conn: rusqlite::Result<Connection>,
    store: Store,
    mode: &str,
    started_at: Instant,
) -> DbResult<Connection> {
    let mut conn = match conn {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error store={} mode={} duration_ms={} error={}",
                store.name(),
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, store) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok store={} mode={} duration_ms={}",
                store.name(),
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error store={} mode={} duration_ms={} error={}",
                store.name(),
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, store: Store) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn, store)?;
    Ok(())
}
