//! Value types shared by the camera, movement, visibility and rendering modules.

/// Grid-cell coordinates of a tile.
///
/// This structure addresses a cell in the tile grid, not a pixel. Columns grow to the right and
/// rows grow downwards, with `(0, 0)` being the top-left cell of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Position {
    /// Column of the cell.
    pub(crate) x: usize,
    /// Row of the cell.
    pub(crate) y: usize,
}

impl Position {
    /// Builds a new position from a column and a row.
    pub(crate) const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Cardinal movement directions.
///
/// This enumeration holds the four directions the character can be moved in. Diagonal movement is
/// not modelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// One row up (towards row zero).
    Up,
    /// One row down.
    Down,
    /// One column left (towards column zero).
    Left,
    /// One column right.
    Right,
}

impl Direction {
    /// Returns the column and row deltas of a single step in this direction.
    pub(crate) const fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Categories of tiles found in the grid.
///
/// Each variant maps to exactly one tile-type code and to exactly one sprite. The
/// [`Unwalkable`](TileType::Unwalkable) variant doubles as the reserved "void" type used for every
/// query that falls outside the grid and for unknown codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum TileType {
    /// Ladder tile, code `0`. The first ladder in the grid is the start position.
    Ladder,
    /// Floor tile, code `1`.
    Walkable,
    /// Wall tile, code `2`. Blocks movement.
    Unwalkable,
}

impl TileType {
    /// Every known tile type, in code order.
    pub(crate) const ALL: [Self; 3] = [Self::Ladder, Self::Walkable, Self::Unwalkable];

    /// Maps a tile-type code onto its tile type.
    ///
    /// Unknown codes are treated as the reserved void type, so that any grid content can be
    /// rendered and walked against without failing.
    pub(crate) const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Ladder,
            1 => Self::Walkable,
            _ => Self::Unwalkable,
        }
    }

    /// Returns the tile-type code of the variant.
    pub(crate) const fn code(self) -> u8 {
        match self {
            Self::Ladder => 0,
            Self::Walkable => 1,
            Self::Unwalkable => 2,
        }
    }

    /// Checks whether the character may step onto a tile of this type.
    pub(crate) const fn is_walkable(self) -> bool {
        !matches!(self, Self::Unwalkable)
    }
}

/// Size of the main view, in tiles, together with the tile edge length in pixels.
///
/// This structure is constant for the whole session. It defines both the size of the main canvas
/// and, through that size, the maximum size of the minimap canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ViewportSpec {
    /// Number of tile columns visible in the main view.
    pub(crate) tiles_wide: usize,
    /// Number of tile rows visible in the main view.
    pub(crate) tiles_high: usize,
    /// Edge length of a tile in pixels (terminal cells).
    pub(crate) pixels_per_tile: usize,
}

impl ViewportSpec {
    /// Builds a viewport specification from the dimensions given on the command line.
    pub(crate) fn new(tiles_wide: u16, tiles_high: u16, pixels_per_tile: u16) -> Self {
        Self {
            tiles_wide: usize::from(tiles_wide),
            tiles_high: usize::from(tiles_high),
            pixels_per_tile: usize::from(pixels_per_tile),
        }
    }

    /// Returns the size of the main canvas in pixels.
    pub(crate) const fn canvas_size(&self) -> PixelSize {
        PixelSize {
            width: self.tiles_wide * self.pixels_per_tile,
            height: self.tiles_high * self.pixels_per_tile,
        }
    }
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self::new(16, 12, 2)
    }
}

/// Sub-rectangle of the grid shown by the main view, in grid coordinates.
///
/// This rectangle is recomputed from the camera on every frame and never stored as authoritative
/// state. It always has the size of the viewport, which means it may reach past the right or the
/// bottom edge of a grid smaller than the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct VisibleRect {
    /// Column of the top-left cell.
    pub(crate) x: usize,
    /// Row of the top-left cell.
    pub(crate) y: usize,
    /// Number of columns covered.
    pub(crate) width: usize,
    /// Number of rows covered.
    pub(crate) height: usize,
}

impl VisibleRect {
    /// Iterates over every cell covered by the rectangle in row-major order, including cells that
    /// fall outside of the grid.
    pub(crate) fn cells(self) -> impl Iterator<Item = Position> {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| Position::new(x, y)))
    }
}

/// Pixel dimensions of a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelSize {
    /// Width in pixels.
    pub(crate) width: usize,
    /// Height in pixels.
    pub(crate) height: usize,
}

/// Rectangle in canvas-local pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRect {
    /// Left edge.
    pub(crate) x: usize,
    /// Top edge.
    pub(crate) y: usize,
    /// Width in pixels.
    pub(crate) width: usize,
    /// Height in pixels.
    pub(crate) height: usize,
}

impl PixelRect {
    /// Builds the square covering the tile at canvas-local tile coordinates `(column, row)` when
    /// tiles are `size` pixels wide.
    pub(crate) const fn tile(column: usize, row: usize, size: usize) -> Self {
        Self {
            x: column * size,
            y: row * size,
            width: size,
            height: size,
        }
    }

    /// Builds the rectangle covering a whole canvas.
    pub(crate) const fn canvas(size: PixelSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }
}
