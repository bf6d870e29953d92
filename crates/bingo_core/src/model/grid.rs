//! Grid and cell domain model.
//!
//! # Responsibility
//! - Define the canonical card shape: a fixed-size layout of goal cells plus
//!   the owner's intention quote.
//! - Derive free-space and checkerboard roles from position alone.
//!
//! # Invariants
//! - Layout sides are odd, so exactly one center cell (the free space) exists.
//! - Cell positions are unique and cover `0..rows*cols` with no gaps.
//! - Cell count never changes after creation.

use crate::model::account::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one goal cell.
pub type CellId = Uuid;

/// Stable identifier of one card; also the public share key.
pub type GridId = Uuid;

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
}

impl GridLayout {
    /// Default card layout.
    pub const THREE_BY_THREE: Self = Self { rows: 3, cols: 3 };
    /// Larger card layout.
    pub const FIVE_BY_FIVE: Self = Self { rows: 5, cols: 5 };

    const MIN_SIDE: u32 = 3;
    const MAX_SIDE: u32 = 9;

    /// Builds a validated layout.
    pub fn new(rows: u32, cols: u32) -> Result<Self, GridValidationError> {
        let layout = Self { rows, cols };
        layout.validate()?;
        Ok(layout)
    }

    /// Checks side bounds and parity.
    pub fn validate(self) -> Result<(), GridValidationError> {
        let side_ok =
            |side: u32| (Self::MIN_SIDE..=Self::MAX_SIDE).contains(&side) && side % 2 == 1;
        if side_ok(self.rows) && side_ok(self.cols) {
            Ok(())
        } else {
            Err(GridValidationError::InvalidLayout {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn cell_count(self) -> u32 {
        self.rows * self.cols
    }

    /// Center position: 4 for 3x3, 12 for 5x5.
    pub fn free_space_position(self) -> u32 {
        (self.rows / 2) * self.cols + self.cols / 2
    }

    pub fn is_free_space(self, position: u32) -> bool {
        position == self.free_space_position()
    }

    /// Returns `(row, col)` for a row-major position.
    pub fn row_col(self, position: u32) -> (u32, u32) {
        (position / self.cols, position % self.cols)
    }

    pub fn tone(self, position: u32) -> CellTone {
        checkerboard_tone(position, self.cols)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::THREE_BY_THREE
    }
}

/// Checkerboard visual variant of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTone {
    Light,
    Dark,
}

/// Derives the checkerboard tone from position and column count.
///
/// A cell is dark iff `(row + col)` is odd. Never stored.
pub fn checkerboard_tone(position: u32, cols: u32) -> CellTone {
    let cols = cols.max(1);
    let row = position / cols;
    let col = position % cols;
    if (row + col) % 2 == 1 {
        CellTone::Dark
    } else {
        CellTone::Light
    }
}

/// One addressable goal slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    /// Row-major index, 0-based.
    pub position: u32,
    /// Goal text; empty until the owner writes one.
    pub text: String,
    pub completed: bool,
}

impl Cell {
    /// Creates an empty, incomplete cell with a generated id.
    pub fn empty(position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            text: String::new(),
            completed: false,
        }
    }

    /// Whether the cell holds a non-blank goal.
    pub fn has_goal(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A card: fixed-size cell collection plus intention quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub id: GridId,
    pub owner: AccountId,
    pub layout: GridLayout,
    /// Sorted by `position` ascending once passed through [`Grid::sort_cells`].
    pub cells: Vec<Cell>,
    pub quote: String,
}

impl Grid {
    /// Creates a fresh card with `rows*cols` empty cells and an empty quote.
    pub fn new(owner: AccountId, layout: GridLayout) -> Result<Self, GridValidationError> {
        layout.validate()?;
        let cells = (0..layout.cell_count()).map(Cell::empty).collect();
        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            layout,
            cells,
            quote: String::new(),
        })
    }

    /// Orders cells by position. Storage delivery order is not trusted.
    pub fn sort_cells(&mut self) {
        self.cells.sort_by_key(|cell| cell.position);
    }

    /// Validates layout, cell count, and position coverage.
    pub fn validate(&self) -> Result<(), GridValidationError> {
        self.layout.validate()?;

        let expected = self.layout.cell_count();
        let actual = self.cells.len();
        if actual != expected as usize {
            return Err(GridValidationError::CellCountMismatch { expected, actual });
        }

        let mut seen = BTreeSet::new();
        for cell in &self.cells {
            if cell.position >= expected {
                return Err(GridValidationError::PositionOutOfRange {
                    position: cell.position,
                    cell_count: expected,
                });
            }
            if !seen.insert(cell.position) {
                return Err(GridValidationError::DuplicatePosition(cell.position));
            }
        }

        Ok(())
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id == id)
    }

    pub fn cell_at(&self, position: u32) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.position == position)
    }

    pub fn free_space(&self) -> Option<&Cell> {
        self.cell_at(self.layout.free_space_position())
    }
}

/// Structural violations of the grid shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridValidationError {
    InvalidLayout { rows: u32, cols: u32 },
    CellCountMismatch { expected: u32, actual: usize },
    PositionOutOfRange { position: u32, cell_count: u32 },
    DuplicatePosition(u32),
}

impl Display for GridValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLayout { rows, cols } => write!(
                f,
                "grid layout {rows}x{cols} is invalid; sides must be odd and within 3..=9"
            ),
            Self::CellCountMismatch { expected, actual } => {
                write!(f, "grid expects {expected} cells, found {actual}")
            }
            Self::PositionOutOfRange {
                position,
                cell_count,
            } => write!(
                f,
                "cell position {position} is outside 0..{cell_count}"
            ),
            Self::DuplicatePosition(position) => {
                write!(f, "cell position {position} appears more than once")
            }
        }
    }
}

impl Error for GridValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_space_is_center_of_each_preset() {
        assert_eq!(GridLayout::THREE_BY_THREE.free_space_position(), 4);
        assert_eq!(GridLayout::FIVE_BY_FIVE.free_space_position(), 12);
    }

    #[test]
    fn layout_rejects_even_and_out_of_range_sides() {
        assert!(GridLayout::new(4, 4).is_err());
        assert!(GridLayout::new(1, 1).is_err());
        assert!(GridLayout::new(11, 11).is_err());
        assert_eq!(GridLayout::new(7, 7).unwrap().cell_count(), 49);
    }

    #[test]
    fn checkerboard_parity_for_three_by_three() {
        let layout = GridLayout::THREE_BY_THREE;
        for position in [1, 3, 5, 7] {
            assert_eq!(layout.tone(position), CellTone::Dark, "position {position}");
        }
        for position in [0, 2, 4, 6, 8] {
            assert_eq!(layout.tone(position), CellTone::Light, "position {position}");
        }
    }

    #[test]
    fn checkerboard_alternates_across_rows_for_five_columns() {
        // row 1 starts at position 5, which is (1 + 0) -> dark
        assert_eq!(checkerboard_tone(5, 5), CellTone::Dark);
        assert_eq!(checkerboard_tone(6, 5), CellTone::Light);
        assert_eq!(checkerboard_tone(12, 5), CellTone::Light);
    }

    #[test]
    fn new_grid_has_exactly_one_free_space_and_contiguous_positions() {
        for layout in [GridLayout::THREE_BY_THREE, GridLayout::FIVE_BY_FIVE] {
            let grid = Grid::new(Uuid::new_v4(), layout).unwrap();
            grid.validate().unwrap();
            let free: Vec<_> = grid
                .cells
                .iter()
                .filter(|cell| layout.is_free_space(cell.position))
                .collect();
            assert_eq!(free.len(), 1);
            assert!(grid.quote.is_empty());
            assert!(grid.cells.iter().all(|cell| !cell.completed && cell.text.is_empty()));
        }
    }

    #[test]
    fn validate_detects_duplicate_and_missing_positions() {
        let mut grid = Grid::new(Uuid::new_v4(), GridLayout::THREE_BY_THREE).unwrap();
        grid.cells[8].position = 0;
        assert_eq!(
            grid.validate(),
            Err(GridValidationError::DuplicatePosition(0))
        );

        grid.cells.pop();
        assert!(matches!(
            grid.validate(),
            Err(GridValidationError::CellCountMismatch {
                expected: 9,
                actual: 8
            })
        ));
    }

    #[test]
    fn sort_cells_orders_by_position() {
        let mut grid = Grid::new(Uuid::new_v4(), GridLayout::THREE_BY_THREE).unwrap();
        grid.cells.reverse();
        grid.sort_cells();
        let positions: Vec<u32> = grid.cells.iter().map(|cell| cell.position).collect();
        assert_eq!(positions, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn has_goal_ignores_whitespace() {
        let mut cell = Cell::empty(0);
        cell.text = "   \n".to_string();
        assert!(!cell.has_goal());
        cell.text = "Read 12 books".to_string();
        assert!(cell.has_goal());
    }
}
