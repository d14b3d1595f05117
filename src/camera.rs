//! Viewport camera.
//!
//! This module maps the focus position onto the sub-rectangle of the grid shown by the main view.

use crate::{
    map::TileGrid,
    types::{Position, ViewportSpec, VisibleRect},
};

/// Computes the part of the grid visible in the main view.
///
/// The viewport is centred on `focus` and then clamped so that it never starts before the first
/// cell nor reaches past the last one. The clamp is applied per axis as a lower bound of zero
/// followed by an upper bound of `grid size - viewport size`, and the upper bound itself is
/// floored at zero. On an axis where the grid is smaller than the viewport the rectangle therefore
/// starts at zero and its trailing cells lie outside of the grid; callers draw those as void.
///
/// The function holds no state and is safe to call on every frame.
pub(crate) fn compute_visible_rect(
    focus: Position,
    grid: &TileGrid,
    viewport: &ViewportSpec,
) -> VisibleRect {
    VisibleRect {
        x: clamp_axis(focus.x, grid.width(), viewport.tiles_wide),
        y: clamp_axis(focus.y, grid.height(), viewport.tiles_high),
        width: viewport.tiles_wide,
        height: viewport.tiles_high,
    }
}

/// Clamps the start of the viewport along a single axis.
const fn clamp_axis(focus: usize, grid_size: usize, viewport_size: usize) -> usize {
    let desired = focus.saturating_sub(viewport_size / 2);
    let upper_bound = grid_size.saturating_sub(viewport_size);

    if desired < upper_bound {
        desired
    } else {
        upper_bound
    }
}
