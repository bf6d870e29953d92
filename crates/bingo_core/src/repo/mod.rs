//! Repository layer: the card persistence gateway and its SQLite backing.
//!
//! # Responsibility
//! - Define the storage contracts the interaction core depends on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted grids instead of masking them.
//! - Missing rows surface as semantic not-found errors, not transport errors.

use crate::db::migrations::{latest_version, missing_card_table, schema_version};
use crate::db::DbError;
use crate::model::account::AccountId;
use crate::model::grid::{CellId, GridId, GridValidationError};
use rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod account_repo;
pub mod grid_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for account/grid/cell persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(GridValidationError),
    Db(DbError),
    AccountNotFound(AccountId),
    GridNotFound(GridId),
    CellNotFound(CellId),
    DuplicateAccountName(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Whether the error denotes a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::GridNotFound(_) | Self::CellNotFound(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::AccountNotFound(id) => write!(f, "account not found: {id}"),
            Self::GridNotFound(id) => write!(f, "grid not found: {id}"),
            Self::CellNotFound(id) => write!(f, "cell not found: {id}"),
            Self::DuplicateAccountName(name) => {
                write!(f, "account name already taken: `{name}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GridValidationError> for RepoError {
    fn from(value: GridValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies the connection was produced by `open_db*` with the current schema.
pub(crate) fn ensure_card_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    if let Some(table) = missing_card_table(conn)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

/// Whether `err` is a UNIQUE (not FK, CHECK, or NOT NULL) constraint failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == SQLITE_CONSTRAINT_UNIQUE
    )
}
