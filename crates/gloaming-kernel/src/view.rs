//! Host-side view of the active map.

use gloaming_common::{EventId, ScreenPoint, TilePoint, Viewport};

/// What the lighting engine reads from the host about the map on screen.
///
/// Screen positions follow the host's character convention: horizontally
/// centered on the tile, at its bottom edge.
pub trait MapView {
    /// Scroll offset and tile size.
    fn viewport(&self) -> Viewport;

    /// Overlay size in pixels.
    fn screen_size(&self) -> (u32, u32);

    /// Screen position of the player.
    fn player_screen_position(&self) -> ScreenPoint;

    /// Map position of the player in tiles.
    fn player_tile(&self) -> TilePoint;

    /// Screen position of a map event, `None` when the event does not exist.
    fn event_screen_position(&self, event_id: EventId) -> Option<ScreenPoint>;

    /// Editor name of a map event, `None` when the event does not exist.
    fn event_name(&self, event_id: EventId) -> Option<String>;
}
