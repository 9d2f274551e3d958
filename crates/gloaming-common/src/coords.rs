//! Coordinate types for map tiles and screen pixels.

use serde::{Deserialize, Serialize};

/// Default tile size in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 48;

/// Map position in tile units (fractional for moving characters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TilePoint {
    /// X coordinate in tiles from the left edge of the map
    pub x: f32,
    /// Y coordinate in tiles from the top edge of the map
    pub y: f32,
}

impl TilePoint {
    /// Creates a new tile point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Converts to the screen position of a character standing on this tile:
    /// horizontally centered, at the bottom edge of the tile.
    #[must_use]
    pub fn to_screen(self, viewport: Viewport) -> ScreenPoint {
        let tile = viewport.tile_size as f32;
        ScreenPoint {
            x: ((self.x - viewport.display_x) * tile + tile / 2.0).round(),
            y: (self.y - viewport.display_y) * tile + tile,
        }
    }
}

/// Screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// X coordinate in pixels
    pub x: f32,
    /// Y coordinate in pixels
    pub y: f32,
}

impl ScreenPoint {
    /// Creates a new screen point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Converts back to tile units, undoing the scroll offset.
    #[must_use]
    pub fn to_tile(self, viewport: Viewport) -> TilePoint {
        let tile = viewport.tile_size as f32;
        TilePoint {
            x: self.x / tile + viewport.display_x,
            y: self.y / tile + viewport.display_y,
        }
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl ScreenRect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Checks whether a point lies inside (left/top inclusive).
    #[must_use]
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

/// The visible part of the map: scroll offset plus tile size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Scroll offset in tiles (left edge of the screen)
    pub display_x: f32,
    /// Scroll offset in tiles (top edge of the screen)
    pub display_y: f32,
    /// Tile size in pixels
    pub tile_size: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            display_x: 0.0,
            display_y: 0.0,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl Viewport {
    /// Creates a viewport scrolled to the given offset.
    #[must_use]
    pub const fn new(display_x: f32, display_y: f32, tile_size: u32) -> Self {
        Self {
            display_x,
            display_y,
            tile_size,
        }
    }

    /// Converts a tile-space rectangle to screen pixels.
    #[must_use]
    pub fn tile_rect_to_screen(&self, x: f32, y: f32, width: f32, height: f32) -> ScreenRect {
        let tile = self.tile_size as f32;
        ScreenRect {
            x: (x - self.display_x) * tile,
            y: (y - self.display_y) * tile,
            width: width * tile,
            height: height * tile,
        }
    }
}
