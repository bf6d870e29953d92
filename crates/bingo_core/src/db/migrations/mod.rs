//! Card schema migrations.
//!
//! # Responsibility
//! - List the card schema steps in version order.
//! - Bring a connection up to the latest schema in one transaction.
//! - Confirm the card tables exist once the version says they should.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly 1.
//! - `PRAGMA user_version` always equals the last applied step.

use crate::db::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;

/// Tables every card connection must expose.
pub const CARD_TABLES: [&str; 3] = ["accounts", "grids", "cells"];

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "accounts_grids_cells",
    sql: include_str!("0001_init.sql"),
}];

/// Latest card schema version known by this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Current `PRAGMA user_version` of `conn`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// First entry of [`CARD_TABLES`] absent from `conn`, if any.
pub fn missing_card_table(conn: &Connection) -> DbResult<Option<&'static str>> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
    )?;
    for table in CARD_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

/// Migrates `conn` to [`latest_version`] and verifies the card tables.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file is newer than this build.
/// - [`DbError::MissingCardTable`] when the version is current but a table is gone.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    if from_version < latest {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
            tx.execute_batch(migration.sql)?;
            tx.pragma_update(None, "user_version", migration.version)?;
            debug!(
                "event=db_migrate_step module=db status=ok version={} name={}",
                migration.version, migration.name
            );
        }
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={}",
            from_version, latest
        );
    }

    if let Some(table) = missing_card_table(conn)? {
        error!(
            "event=db_verify module=db status=error version={} missing_table={}",
            latest, table
        );
        return Err(DbError::MissingCardTable {
            table,
            version: latest,
        });
    }
    Ok(())
}
