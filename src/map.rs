//! Tile grid data and queries.
//!
//! This module contains the [`TileGrid`] struct, the immutable matrix of tile-type codes the world
//! is made of, along with the built-in map used when no map file is given.

use std::sync::LazyLock;

use color_eyre::eyre::{bail, Result};

use crate::{
    file_loader,
    types::{Position, TileType},
};

/// Start position used when the grid holds no ladder tile.
pub(crate) const DEFAULT_START: Position = Position::new(1, 1);

/// Immutable matrix of tile-type codes.
///
/// This structure holds the world as a row-major vector of codes. Every row has the same length
/// and there is at least one row and one column, both checked on construction. Queries outside of
/// the grid never panic; they answer with the reserved void tile type instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TileGrid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Tile-type codes in row-major order.
    cells: Vec<u8>,
}

impl Default for TileGrid {
    fn default() -> Self {
        file_loader::parse_grid(*DEFAULT_MAP).expect("failed to parse default map")
    }
}

impl TileGrid {
    /// Builds a grid from rows of tile-type codes.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - There are no rows, or the first row is empty
    /// - Any row differs in length from the first one
    pub(crate) fn new(rows: Vec<Vec<u8>>) -> Result<Self> {
        let Some(width) = rows.first().map(Vec::len) else {
            bail!("map has no rows");
        };
        if width == 0 {
            bail!("map rows have no cells");
        }

        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                bail!(
                    "map row {idx} has {} cells, expected {width}",
                    row.len()
                );
            }
            cells.extend(row);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Returns the number of columns.
    pub(crate) const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub(crate) const fn height(&self) -> usize {
        self.height
    }

    /// Checks whether a position lies inside the grid.
    pub(crate) const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Returns the raw code stored at a position, if the position lies inside the grid.
    pub(crate) fn code_at(&self, position: Position) -> Option<u8> {
        if !self.contains(position) {
            return None;
        }

        self.cells
            .get(position.y * self.width + position.x)
            .copied()
    }

    /// Returns the tile type at a position.
    ///
    /// Positions outside of the grid are reported as [`TileType::Unwalkable`], the reserved void
    /// type.
    pub(crate) fn tile_type_at(&self, position: Position) -> TileType {
        self.code_at(position)
            .map_or(TileType::Unwalkable, TileType::from_code)
    }

    /// Finds the first ladder tile in row-major order.
    pub(crate) fn find_ladder(&self) -> Option<Position> {
        self.cells
            .iter()
            .position(|&code| TileType::from_code(code) == TileType::Ladder)
            .map(|idx| Position::new(idx % self.width, idx / self.width))
    }

    /// Returns the position the character starts the session at.
    ///
    /// This is the first ladder tile when there is one. Otherwise it is [`DEFAULT_START`], pulled
    /// back inside the grid when the grid is too small to contain it.
    pub(crate) fn start_position(&self) -> Position {
        self.find_ladder().unwrap_or_else(|| {
            Position::new(
                DEFAULT_START.x.min(self.width - 1),
                DEFAULT_START.y.min(self.height - 1),
            )
        })
    }
}

/// Built-in map used when no map file is given on the command line.
static DEFAULT_MAP: LazyLock<&str> = LazyLock::new(|| {
    "\
2222222222222222222222222222222222222222
2111111111111121111111111111211111111112
2110111111111121111111111111211111111112
2111221111111121111111111111211111111112
2111111111111111111121111111211111111112
2111111111111121111111111111111111111112
2111111111111121111111111111211111111112
2111111111111121111111111111211111111112
2222221222222222222122222222222221222222
2111111111111121111111111111211111111112
2111111111111121111111111111211111111112
2111111111111121111111221111211111111112
2111111111111111111111111111211111111112
2111111111111121111111111111111111111112
2111111111111121111111111111211111111112
2111111111111121111111111111211111111112
2222222222221222222222222221222222222222
2111111111111121111111111111211111111112
2111111111111121111111111111211111111112
2111111122111121111111111111111111111112
2111111111111111111111111111211111121112
2111111111111121111111111111211111111112
2111111111111121111111111111211111111112
2222222222222222222222222222222222222222"
});
