//! Fog-of-war memory for the minimap.

use crate::types::{Position, VisibleRect};

/// Set of grid cells that have ever been shown by the main view.
///
/// This structure keeps one flag per grid cell. Flags only ever go from unseen to seen; there is
/// no way to forget a cell for the lifetime of the session.
#[derive(Clone, Debug)]
pub(crate) struct VisibilityTracker {
    /// Number of columns of the tracked grid.
    width: usize,
    /// Number of rows of the tracked grid.
    height: usize,
    /// Seen flags in row-major order.
    seen: Vec<bool>,
}

impl VisibilityTracker {
    /// Creates a tracker for a grid of the given size with every cell unseen.
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            seen: vec![false; width * height],
        }
    }

    /// Marks every grid cell covered by `rect` as seen.
    ///
    /// Cells of the rectangle lying outside of the grid are skipped. Marking a cell twice has no
    /// further effect.
    pub(crate) fn mark_visible(&mut self, rect: VisibleRect) {
        let columns = rect.x..(rect.x + rect.width).min(self.width);
        for y in rect.y..(rect.y + rect.height).min(self.height) {
            let row = y * self.width;
            if let Some(flags) = self
                .seen
                .get_mut(row + columns.start..row + columns.end.max(columns.start))
            {
                flags.fill(true);
            }
        }
    }

    /// Checks whether the cell at a position has ever been seen.
    ///
    /// Positions outside of the grid are never seen.
    pub(crate) fn is_seen(&self, position: Position) -> bool {
        position.x < self.width
            && position.y < self.height
            && self
                .seen
                .get(position.y * self.width + position.x)
                .copied()
                .unwrap_or(false)
    }

    /// Returns how many cells have been seen so far.
    pub(crate) fn seen_count(&self) -> usize {
        self.seen.iter().filter(|&&seen| seen).count()
    }
}
