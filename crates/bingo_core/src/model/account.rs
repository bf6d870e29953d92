//! Account domain model.
//!
//! # Responsibility
//! - Identify the owner of exactly one card.
//!
//! # Invariants
//! - `name` is trimmed and never blank.
//! - `id` is stable and never reused.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an account; the private-page owner reference.
pub type AccountId = Uuid;

/// Card owner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Display and lookup name, unique across accounts.
    pub name: String,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

/// Trims a user-entered name, returning `None` when nothing is left.
pub fn normalize_account_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
