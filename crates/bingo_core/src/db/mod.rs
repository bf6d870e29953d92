//! Card storage bootstrap.
//!
//! # Responsibility
//! - Hand out SQLite connections that already carry the card schema.
//! - Report schema problems (too new, or missing card tables) as [`DbError`].
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A connection returned by `open_db*` has every table in
//!   [`migrations::CARD_TABLES`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Card storage failure.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build than this one.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// `user_version` claims a schema the file does not actually contain.
    MissingCardTable { table: &'static str, version: u32 },
}

impl DbError {
    /// Whether the file is unusable because of its schema rather than I/O.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedSchemaVersion { .. } | Self::MissingCardTable { .. }
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "card storage error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "card database was written by a newer build (schema {db_version}, this build supports up to {latest_supported})"
            ),
            Self::MissingCardTable { table, version } => write!(
                f,
                "card database at schema {version} is missing table `{table}`"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingCardTable { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
