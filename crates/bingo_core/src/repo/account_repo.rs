//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create accounts and resolve them by name or id.
//!
//! # Invariants
//! - Names are stored already normalized (trimmed, non-blank).
//! - Name lookup is exact; uniqueness is enforced by storage.

use crate::model::account::{Account, AccountId};
use crate::repo::{
    ensure_card_connection_ready, is_unique_violation, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const ACCOUNT_SELECT_SQL: &str = "SELECT uuid, name, created_at FROM accounts";

/// Repository interface for card owners.
pub trait AccountRepository {
    /// Inserts one account and returns the stored record.
    fn create_account(&self, name: &str) -> RepoResult<Account>;
    fn find_account_by_name(&self, name: &str) -> RepoResult<Option<Account>>;
    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_card_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, name: &str) -> RepoResult<Account> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO accounts (uuid, name) VALUES (?1, ?2);",
                params![id.to_string(), name],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::DuplicateAccountName(name.to_string())
                } else {
                    err.into()
                }
            })?;

        self.get_account(id)?.ok_or(RepoError::AccountNotFound(id))
    }

    fn find_account_by_name(&self, name: &str) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_account_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_account_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let uuid_text: String = row.get("uuid")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name for account `{uuid_text}`"
        )));
    }
    Ok(Account {
        id: parse_uuid(&uuid_text, "accounts.uuid")?,
        name,
        created_at: row.get("created_at")?,
    })
}
