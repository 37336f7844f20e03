//! Migration registries for the source and report stores.
//!
//! # Responsibility
//! - Register each store's schema migrations in strictly increasing
//!   order and apply pending ones atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic within a registry.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

/// Which of the two stores a connection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    /// Canonical decision graph, read-only during a projection run.
    Source,
    /// Denormalized projection target.
    Report,
}

impl Store {
    pub fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Report => "report",
        }
    }

    fn registry(self) -> &'static [Migration] {
        match self {
            Self::Source => SOURCE_MIGRATIONS,
            Self::Report => REPORT_MIGRATIONS,
        }
    }
}

const SOURCE_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("source_0001_init.sql"),
}];

const REPORT_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("report_0001_init.sql"),
}];

/// Returns the latest migration version known for a store.
pub fn latest_version(store: Store) -> u32 {
    store
        .registry()
        .last()
        .map_or(0, |migration| migration.version)
}

/// Applies all pending migrations for a store on the provided connection.
pub fn apply_migrations(conn: &mut Connection, store: Store) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version(store);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            store: store.name(),
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in store.registry() {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, Store};
    use rusqlite::Connection;

    #[test]
    fn apply_is_idempotent_per_store() {
        for store in [Store::Source, Store::Report] {
            let mut conn = Connection::open_in_memory().unwrap();
            apply_migrations(&mut conn, store).unwrap();
            apply_migrations(&mut conn, store).unwrap();

            let version: u32 = conn
                .query_row("PRAGMA user_version;", [], |row| row.get(0))
                .unwrap();
            assert_eq!(version, latest_version(store));
        }
    }

    #[test]
    fn newer_schema_than_binary_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();

        let err = apply_migrations(&mut conn, Store::Report).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }
}
