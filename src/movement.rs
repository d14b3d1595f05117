//! Character state and movement validation.

use tracing::debug;

use crate::{
    map::TileGrid,
    types::{Direction, Position},
};

/// The single player-controlled character.
///
/// This structure is created once at startup on the start tile and lives for the whole session.
/// Its position is only ever changed through [`attempt_move`], which keeps it inside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Character {
    /// Current cell of the character.
    position: Position,
}

impl Character {
    /// Places the character on a cell.
    pub(crate) const fn new(position: Position) -> Self {
        Self { position }
    }

    /// Returns the current cell of the character.
    pub(crate) const fn position(&self) -> Position {
        self.position
    }
}

/// Tries to move the character one cell in `direction`.
///
/// The move is accepted when the target cell lies inside the grid and is not
/// [`Unwalkable`](crate::types::TileType::Unwalkable). An accepted move updates the character in
/// place and returns `true`; a rejected one leaves it untouched and returns `false`. Redrawing
/// after an accepted move is up to the caller.
pub(crate) fn attempt_move(character: &mut Character, direction: Direction, grid: &TileGrid) -> bool {
    let Some(target) = step(character.position, direction, grid) else {
        debug!(?direction, from = ?character.position, "move rejected: leaves the grid");
        return false;
    };

    let tile = grid.tile_type_at(target);
    if !tile.is_walkable() {
        debug!(?direction, from = ?character.position, ?tile, "move rejected: blocked");
        return false;
    }

    debug!(?direction, from = ?character.position, to = ?target, "move accepted");
    character.position = target;

    true
}

/// Computes the neighbour of `position` in `direction`, if it lies inside the grid.
fn step(position: Position, direction: Direction, grid: &TileGrid) -> Option<Position> {
    let (dx, dy) = direction.delta();
    let target = Position::new(
        position.x.checked_add_signed(dx)?,
        position.y.checked_add_signed(dy)?,
    );

    grid.contains(target).then_some(target)
}
