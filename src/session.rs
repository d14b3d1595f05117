//! Session context shared by the camera, the movement controller and the draw passes.

use tracing::trace;

use crate::{
    assets::ResourceSet,
    camera,
    map::TileGrid,
    movement::{self, Character},
    render,
    types::{Direction, PixelSize, Position, ViewportSpec, VisibleRect},
    visibility::VisibilityTracker,
};

/// Everything the game knows about the running world.
///
/// This structure is the single owner of the mutable state of a session: the character and the
/// fog-of-war memory. It is only ever touched from the event-loop thread, so no locking is
/// involved.
#[derive(Debug)]
pub(crate) struct Session {
    /// World the character walks in.
    ///
    /// This field is never modified once the session starts. Every draw pass and the movement
    /// controller read it.
    pub(crate) grid: TileGrid,
    /// The player-controlled character.
    ///
    /// This field is only ever written through [`Session::move_character`], which rejects moves
    /// onto unwalkable or out-of-bounds cells.
    pub(crate) character: Character,
    /// Size of the main view, in tiles and in pixels per tile.
    pub(crate) viewport: ViewportSpec,
    /// Cells ever shown by the main view.
    ///
    /// This field only grows. It is updated by [`Session::refresh_view`] before every redraw and
    /// read by the minimap pass.
    pub(crate) visibility: VisibilityTracker,
    /// Sprites for tiles and the character.
    ///
    /// This field holds every sprite slot, whether loaded, failed or still pending. The draw
    /// passes fall back to solid colours for anything that is not loaded.
    pub(crate) resources: ResourceSet,
    /// First ladder tile of the grid, reported in the status panel.
    pub(crate) ladder: Option<Position>,
    /// Edge length in pixels of a minimap tile.
    ///
    /// This field is computed once from the main canvas size and the grid size, so the minimap
    /// never changes size during a session.
    pub(crate) minimap_scale: usize,
}

impl Session {
    /// Sets a session up on a grid.
    ///
    /// The character is placed on the start tile and the minimap scale is derived once from the
    /// main canvas size scaled by `minimap_percent`.
    pub(crate) fn new(
        grid: TileGrid,
        viewport: ViewportSpec,
        minimap_percent: u16,
        resources: ResourceSet,
    ) -> Self {
        let main_canvas = viewport.canvas_size();
        let percent = usize::from(minimap_percent);
        let minimap_scale = render::minimap_scale(
            PixelSize {
                width: main_canvas.width * percent / 100,
                height: main_canvas.height * percent / 100,
            },
            &grid,
        );

        Self {
            character: Character::new(grid.start_position()),
            visibility: VisibilityTracker::new(grid.width(), grid.height()),
            ladder: grid.find_ladder(),
            grid,
            viewport,
            resources,
            minimap_scale,
        }
    }

    /// Recomputes the visible rectangle around the character and remembers its cells as seen.
    pub(crate) fn refresh_view(&mut self) -> VisibleRect {
        let rect = camera::compute_visible_rect(self.character.position(), &self.grid, &self.viewport);
        self.visibility.mark_visible(rect);
        trace!(?rect, seen = self.visibility.seen_count(), "view refreshed");

        rect
    }

    /// Tries to move the character, returning whether it moved.
    pub(crate) fn move_character(&mut self, direction: Direction) -> bool {
        movement::attempt_move(&mut self.character, direction, &self.grid)
    }

    /// Returns the size of the main canvas in pixels.
    pub(crate) const fn main_canvas_size(&self) -> PixelSize {
        self.viewport.canvas_size()
    }

    /// Returns the size of the minimap canvas in pixels.
    pub(crate) const fn minimap_canvas_size(&self) -> PixelSize {
        render::minimap_canvas_size(&self.grid, self.minimap_scale)
    }

    /// Builds the status lines for the current state.
    pub(crate) fn status_lines(&self) -> [String; 3] {
        render::status_lines(self.ladder, &self.grid, &self.character)
    }
}
