//! Headless host.
//!
//! Stands in for the game engine when running without a renderer: it tracks
//! the player, the map events and the camera, and answers the lighting
//! engine's [`MapView`] queries.

use ahash::AHashMap;
use gloaming_common::{EventId, ScreenPoint, TilePoint, Viewport};
use gloaming_kernel::MapView;

use crate::config::ScreenSettings;

#[derive(Debug, Clone)]
struct MapEvent {
    name: String,
    tile: TilePoint,
}

/// A map without a renderer.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    screen: ScreenSettings,
    viewport: Viewport,
    map_size: (f32, f32),
    player: TilePoint,
    events: AHashMap<EventId, MapEvent>,
}

impl HeadlessHost {
    /// An empty, unbounded map with the player at its origin.
    #[must_use]
    pub fn new(screen: ScreenSettings) -> Self {
        Self {
            viewport: screen.viewport(),
            screen,
            map_size: (f32::INFINITY, f32::INFINITY),
            player: TilePoint::default(),
            events: AHashMap::new(),
        }
    }

    /// Replaces the map: size in tiles, no events, player at `start`.
    pub fn load_map(&mut self, width: f32, height: f32, start: TilePoint) {
        self.map_size = (width, height);
        self.events.clear();
        self.move_player(start);
    }

    /// Adds or replaces a map event.
    pub fn add_event(&mut self, id: EventId, name: impl Into<String>, tile: TilePoint) {
        self.events.insert(
            id,
            MapEvent {
                name: name.into(),
                tile,
            },
        );
    }

    /// Removes a map event.
    pub fn erase_event(&mut self, id: EventId) -> bool {
        self.events.remove(&id).is_some()
    }

    /// Moves the player and centers the camera on them, clamped to the map.
    pub fn move_player(&mut self, tile: TilePoint) {
        self.player = tile;
        let (screen_w, screen_h) = self.screen.tiles();
        let center = |position: f32, screen: f32, map: f32| {
            let max = (map - screen).max(0.0);
            (position - (screen - 1.0) / 2.0).clamp(0.0, max)
        };
        self.viewport.display_x = center(tile.x, screen_w, self.map_size.0);
        self.viewport.display_y = center(tile.y, screen_h, self.map_size.1);
    }

    /// Player position in tiles.
    #[must_use]
    pub const fn player(&self) -> TilePoint {
        self.player
    }
}

impl MapView for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen.width, self.screen.height)
    }

    fn player_screen_position(&self) -> ScreenPoint {
        self.player.to_screen(self.viewport)
    }

    fn player_tile(&self) -> TilePoint {
        self.player
    }

    fn event_screen_position(&self, event_id: EventId) -> Option<ScreenPoint> {
        self.events
            .get(&event_id)
            .map(|event| event.tile.to_screen(self.viewport))
    }

    fn event_name(&self, event_id: EventId) -> Option<String> {
        self.events.get(&event_id).map(|event| event.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_follows_player() {
        let mut host = HeadlessHost::new(ScreenSettings::default());
        host.load_map(40.0, 30.0, TilePoint::new(20.0, 15.0));

        // 17 x 13 tiles on screen: the player sits in the middle column.
        let viewport = host.viewport();
        assert_eq!(viewport.display_x, 12.0);
        assert_eq!(viewport.display_y, 9.0);
        assert_eq!(host.player_screen_position(), ScreenPoint::new(408.0, 336.0));
    }

    #[test]
    fn test_camera_clamped_to_map() {
        let mut host = HeadlessHost::new(ScreenSettings::default());
        host.load_map(40.0, 30.0, TilePoint::new(1.0, 1.0));
        assert_eq!(host.viewport().display_x, 0.0);
        assert_eq!(host.viewport().display_y, 0.0);

        host.move_player(TilePoint::new(39.0, 29.0));
        assert_eq!(host.viewport().display_x, 23.0);
        assert_eq!(host.viewport().display_y, 17.0);
    }

    #[test]
    fn test_events() {
        let mut host = HeadlessHost::new(ScreenSettings::default());
        host.add_event(EventId::new(1), "Torch", TilePoint::new(2.0, 3.0));

        assert_eq!(host.event_name(EventId::new(1)).as_deref(), Some("Torch"));
        assert_eq!(
            host.event_screen_position(EventId::new(1)),
            Some(ScreenPoint::new(120.0, 192.0))
        );
        assert!(host.erase_event(EventId::new(1)));
        assert!(host.event_screen_position(EventId::new(1)).is_none());

        host.add_event(EventId::new(2), "Lamp", TilePoint::new(0.0, 0.0));
        host.load_map(10.0, 10.0, TilePoint::default());
        assert!(host.event_name(EventId::new(2)).is_none());
    }
}
