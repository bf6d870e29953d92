//! Grid persistence gateway and SQLite implementation.
//!
//! # Responsibility
//! - Load a card by owner account or by grid id.
//! - Create a card and all of its cells as one atomic batch.
//! - Apply single-field mutations (cell text, cell completion, quote).
//!
//! # Invariants
//! - Mutations are independent and non-transactional with each other.
//! - Only grid creation writes more than one row atomically.
//! - Loaded grids are validated and sorted by position before return.

use crate::model::account::AccountId;
use crate::model::grid::{Cell, CellId, Grid, GridId, GridLayout};
use crate::repo::{ensure_card_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// How a caller identifies the card it wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRef {
    /// Private page: the owner's account.
    Account(AccountId),
    /// Public page: the card's own id.
    Grid(GridId),
}

/// Persistence gateway consumed by card services.
pub trait GridRepository {
    /// Writes the grid row and its cells in one transaction.
    fn create_grid(&self, grid: &Grid) -> RepoResult<GridId>;
    /// Returns `Ok(None)` when no card matches.
    fn fetch_grid(&self, owner: OwnerRef) -> RepoResult<Option<Grid>>;
    fn update_cell_text(&self, cell_id: CellId, text: &str) -> RepoResult<()>;
    fn update_cell_completion(&self, cell_id: CellId, completed: bool) -> RepoResult<()>;
    fn update_quote(&self, grid_id: GridId, quote: &str) -> RepoResult<()>;
}

impl<T: GridRepository + ?Sized> GridRepository for &T {
    fn create_grid(&self, grid: &Grid) -> RepoResult<GridId> {
        (**self).create_grid(grid)
    }

    fn fetch_grid(&self, owner: OwnerRef) -> RepoResult<Option<Grid>> {
        (**self).fetch_grid(owner)
    }

    fn update_cell_text(&self, cell_id: CellId, text: &str) -> RepoResult<()> {
        (**self).update_cell_text(cell_id, text)
    }

    fn update_cell_completion(&self, cell_id: CellId, completed: bool) -> RepoResult<()> {
        (**self).update_cell_completion(cell_id, completed)
    }

    fn update_quote(&self, grid_id: GridId, quote: &str) -> RepoResult<()> {
        (**self).update_quote(grid_id, quote)
    }
}

/// SQLite-backed grid repository.
pub struct SqliteGridRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGridRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_card_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn load_cells(&self, grid_uuid: &str) -> RepoResult<Vec<Cell>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, position, text, completed
             FROM cells
             WHERE grid_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([grid_uuid])?;
        let mut cells = Vec::new();
        while let Some(row) = rows.next()? {
            cells.push(parse_cell_row(row)?);
        }
        Ok(cells)
    }
}

impl GridRepository for SqliteGridRepository<'_> {
    fn create_grid(&self, grid: &Grid) -> RepoResult<GridId> {
        grid.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO grids (uuid, account_uuid, rows, cols, quote)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                grid.id.to_string(),
                grid.owner.to_string(),
                grid.layout.rows,
                grid.layout.cols,
                grid.quote.as_str(),
            ],
        )?;

        {
            let mut insert_cell = tx.prepare(
                "INSERT INTO cells (uuid, grid_uuid, position, text, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for cell in &grid.cells {
                insert_cell.execute(params![
                    cell.id.to_string(),
                    grid.id.to_string(),
                    cell.position,
                    cell.text.as_str(),
                    bool_to_int(cell.completed),
                ])?;
            }
        }

        tx.commit()?;
        Ok(grid.id)
    }

    fn fetch_grid(&self, owner: OwnerRef) -> RepoResult<Option<Grid>> {
        let (filter, key) = match owner {
            OwnerRef::Account(account_id) => ("account_uuid", account_id.to_string()),
            OwnerRef::Grid(grid_id) => ("uuid", grid_id.to_string()),
        };

        let header = self
            .conn
            .query_row(
                &format!(
                    "SELECT uuid, account_uuid, rows, cols, quote
                     FROM grids
                     WHERE {filter} = ?1;"
                ),
                [key.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("account_uuid")?,
                        row.get::<_, u32>("rows")?,
                        row.get::<_, u32>("cols")?,
                        row.get::<_, String>("quote")?,
                    ))
                },
            )
            .optional()?;

        let Some((grid_uuid, account_uuid, rows, cols, quote)) = header else {
            return Ok(None);
        };

        let mut grid = Grid {
            id: parse_uuid(&grid_uuid, "grids.uuid")?,
            owner: parse_uuid(&account_uuid, "grids.account_uuid")?,
            layout: GridLayout { rows, cols },
            cells: self.load_cells(&grid_uuid)?,
            quote,
        };
        grid.sort_cells();
        grid.validate()?;
        Ok(Some(grid))
    }

    fn update_cell_text(&self, cell_id: CellId, text: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cells SET text = ?2 WHERE uuid = ?1;",
            params![cell_id.to_string(), text],
        )?;
        if changed == 0 {
            return Err(RepoError::CellNotFound(cell_id));
        }
        Ok(())
    }

    fn update_cell_completion(&self, cell_id: CellId, completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cells SET completed = ?2 WHERE uuid = ?1;",
            params![cell_id.to_string(), bool_to_int(completed)],
        )?;
        if changed == 0 {
            return Err(RepoError::CellNotFound(cell_id));
        }
        Ok(())
    }

    fn update_quote(&self, grid_id: GridId, quote: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE grids
             SET
                quote = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![grid_id.to_string(), quote],
        )?;
        if changed == 0 {
            return Err(RepoError::GridNotFound(grid_id));
        }
        Ok(())
    }
}

fn parse_cell_row(row: &Row<'_>) -> RepoResult<Cell> {
    let uuid_text: String = row.get("uuid")?;
    let position: i64 = row.get("position")?;
    let position = u32::try_from(position).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid position `{position}` in cells.position"
        ))
    })?;
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in cells.completed"
            )));
        }
    };

    Ok(Cell {
        id: parse_uuid(&uuid_text, "cells.uuid")?,
        position,
        text: row.get("text")?,
        completed,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
