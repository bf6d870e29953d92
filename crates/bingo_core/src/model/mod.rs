//! Card domain model.
//!
//! # Responsibility
//! - Define the account, grid, and cell records shared by storage and the
//!   interaction layer.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Grids never grow or shrink after creation; there is no deletion path.

pub mod account;
pub mod grid;
