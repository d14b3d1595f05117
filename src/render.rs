//! Draw passes for the main view, the character and the minimap.
//!
//! Every pass is a plain function of the current session state writing into a [`DrawSink`]. The
//! terminal-backed sink is [`BufferSink`]; tests use a recording sink instead.

use ratatui::{
    buffer::{Buffer, Cell},
    layout::Rect,
    style::Color,
};
use tracing::trace;

use crate::{
    assets::{ResourceKey, ResourceLookup, ResourceSet, Sprite},
    map::TileGrid,
    movement::Character,
    types::{PixelRect, PixelSize, Position, ViewportSpec, VisibleRect},
    visibility::VisibilityTracker,
};

/// Colour filling a tile whose sprite cannot be drawn.
pub(crate) const TILE_FALLBACK: Color = Color::Black;

/// Colour of the character marker on the minimap, also used when its sprite cannot be drawn.
pub(crate) const CHARACTER_MARKER: Color = Color::Yellow;

/// Drawing surface addressed in canvas-local pixel coordinates.
pub(crate) trait DrawSink {
    /// Erases a region back to the empty canvas.
    fn clear_region(&mut self, rect: PixelRect);

    /// Paints a sprite stretched over a region.
    fn draw_image(&mut self, sprite: &Sprite, rect: PixelRect);

    /// Fills a region with a solid colour.
    fn fill_rect(&mut self, rect: PixelRect, color: Color);
}

/// Sink writing into a region of a ratatui [`Buffer`], one pixel per terminal cell.
///
/// Every operation is clipped to both the canvas size given on construction and the buffer
/// region, so drawing never reaches outside of the panel it was given.
pub(crate) struct BufferSink<'buf> {
    /// Buffer of the frame being drawn.
    buffer: &'buf mut Buffer,
    /// Part of the buffer the canvas is drawn in.
    area: Rect,
}

impl<'buf> BufferSink<'buf> {
    /// Creates a sink for a canvas of `size` pixels anchored at the top-left corner of `area`.
    pub(crate) fn new(buffer: &'buf mut Buffer, area: Rect, size: PixelSize) -> Self {
        let width = u16::try_from(size.width).unwrap_or(u16::MAX).min(area.width);
        let height = u16::try_from(size.height).unwrap_or(u16::MAX).min(area.height);
        let area = Rect::new(area.x, area.y, width, height).intersection(buffer.area);

        Self { buffer, area }
    }

    /// Translates a canvas-local rectangle into the buffer, clipped to the canvas.
    fn clip(&self, rect: PixelRect) -> Option<Rect> {
        let x = u16::try_from(rect.x).ok()?;
        let y = u16::try_from(rect.y).ok()?;
        if x >= self.area.width || y >= self.area.height {
            return None;
        }
        let width = u16::try_from(rect.width)
            .unwrap_or(u16::MAX)
            .min(self.area.width - x);
        let height = u16::try_from(rect.height)
            .unwrap_or(u16::MAX)
            .min(self.area.height - y);

        Some(Rect::new(self.area.x + x, self.area.y + y, width, height))
    }

    /// Applies `paint` to every buffer cell covered by a canvas-local rectangle.
    fn paint<F>(&mut self, rect: PixelRect, mut paint: F)
    where
        F: FnMut(&mut Cell),
    {
        let Some(target) = self.clip(rect) else {
            return;
        };

        for position in target.positions() {
            if let Some(cell) = self.buffer.cell_mut(position) {
                paint(cell);
            }
        }
    }
}

impl DrawSink for BufferSink<'_> {
    fn clear_region(&mut self, rect: PixelRect) {
        self.paint(rect, Cell::reset);
    }

    fn draw_image(&mut self, sprite: &Sprite, rect: PixelRect) {
        self.paint(rect, |cell| {
            let _ = cell.set_char(sprite.glyph).set_fg(sprite.fg).set_bg(sprite.bg);
        });
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        self.paint(rect, |cell| {
            let _ = cell.set_char(' ').set_bg(color);
        });
    }
}

/// Draws the sprite registered for `key`, or a solid colour when it is not drawable.
///
/// A missing registration, a pending load and a failed load are reported distinctly in the log and
/// all degrade to the fallback colour.
fn draw_resource<S: DrawSink>(
    sink: &mut S,
    resources: &ResourceSet,
    key: ResourceKey,
    rect: PixelRect,
    fallback: Color,
) {
    match resources.lookup(key) {
        ResourceLookup::Ready(sprite) => sink.draw_image(sprite, rect),
        ResourceLookup::Pending => {
            trace!(%key, "sprite not loaded yet, drawing fallback");
            sink.fill_rect(rect, fallback);
        }
        ResourceLookup::Failed => {
            trace!(%key, "sprite failed to load, drawing fallback");
            sink.fill_rect(rect, fallback);
        }
        ResourceLookup::Missing => {
            trace!(%key, "no sprite registered, drawing fallback");
            sink.fill_rect(rect, fallback);
        }
    }
}

/// Draws the tiles of the visible rectangle into the main canvas.
///
/// Each cell lands at `(cell - rect start) * pixels per tile`. Cells of the rectangle lying
/// outside of the grid are drawn as the void tile type, so the whole canvas is always covered.
pub(crate) fn draw_main_view<S: DrawSink>(
    sink: &mut S,
    grid: &TileGrid,
    rect: VisibleRect,
    viewport: &ViewportSpec,
    resources: &ResourceSet,
) {
    sink.clear_region(PixelRect::canvas(viewport.canvas_size()));

    for cell in rect.cells() {
        let tile = grid.tile_type_at(cell);
        let target = PixelRect::tile(cell.x - rect.x, cell.y - rect.y, viewport.pixels_per_tile);
        draw_resource(sink, resources, ResourceKey::Tile(tile), target, TILE_FALLBACK);
    }
}

/// Draws the character over the main canvas, translated like the tiles are.
pub(crate) fn draw_character<S: DrawSink>(
    sink: &mut S,
    character: &Character,
    rect: VisibleRect,
    viewport: &ViewportSpec,
    resources: &ResourceSet,
) {
    let position = character.position();
    let (Some(column), Some(row)) = (
        position.x.checked_sub(rect.x),
        position.y.checked_sub(rect.y),
    ) else {
        trace!(?position, ?rect, "character outside of the visible rect");
        return;
    };

    let target = PixelRect::tile(column, row, viewport.pixels_per_tile);
    draw_resource(
        sink,
        resources,
        ResourceKey::Character,
        target,
        CHARACTER_MARKER,
    );
}

/// Computes the edge length in pixels of a minimap tile.
///
/// The scale is the largest whole number of pixels that fits the grid inside the maximum canvas
/// on both axes, which keeps the aspect ratio of the grid. It never drops below one pixel.
pub(crate) fn minimap_scale(max_canvas: PixelSize, grid: &TileGrid) -> usize {
    (max_canvas.width / grid.width())
        .min(max_canvas.height / grid.height())
        .max(1)
}

/// Returns the size of the minimap canvas for a grid drawn at `scale`.
pub(crate) const fn minimap_canvas_size(grid: &TileGrid, scale: usize) -> PixelSize {
    PixelSize {
        width: grid.width() * scale,
        height: grid.height() * scale,
    }
}

/// Draws the minimap: every seen tile at its scaled position, then the character marker.
///
/// Unseen tiles are left blank. The marker is drawn whether its cell has been seen or not.
pub(crate) fn draw_minimap<S: DrawSink>(
    sink: &mut S,
    grid: &TileGrid,
    visibility: &VisibilityTracker,
    character: &Character,
    scale: usize,
    resources: &ResourceSet,
) {
    sink.clear_region(PixelRect::canvas(minimap_canvas_size(grid, scale)));

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = Position::new(x, y);
            if visibility.is_seen(cell) {
                let key = ResourceKey::Tile(grid.tile_type_at(cell));
                draw_resource(sink, resources, key, PixelRect::tile(x, y, scale), TILE_FALLBACK);
            }
        }
    }

    let position = character.position();
    sink.fill_rect(
        PixelRect::tile(position.x, position.y, scale),
        CHARACTER_MARKER,
    );
}

/// Builds the status lines: start tile, grid size and character position.
pub(crate) fn status_lines(
    ladder: Option<Position>,
    grid: &TileGrid,
    character: &Character,
) -> [String; 3] {
    let ladder = ladder.map_or_else(
        || "none".to_owned(),
        |position| format!("{}, {}", position.x, position.y),
    );
    let position = character.position();

    [
        format!("Ladder: {ladder}"),
        format!("Map: {} x {}", grid.width(), grid.height()),
        format!("Position: {}, {}", position.x, position.y),
    ]
}
