//! Named map areas.
//!
//! Areas are tile rectangles loaded with a map. Several areas can share a name to
//! describe one irregular region, e.g. the rooms of a house. Circle lights are
//! clipped to the region their center lies in.

use gloaming_common::{AreaId, GloamingError, GloamingResult, MapId, ScreenRect, TilePoint, Viewport};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A rectangular map area in tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    /// Identifier, unique within its map
    pub id: AreaId,
    /// Map the area belongs to
    pub map_id: MapId,
    /// Region name shared by the areas of one region
    pub name: String,
    /// Left edge in tiles
    pub x: f32,
    /// Top edge in tiles
    pub y: f32,
    /// Width in tiles
    pub width: f32,
    /// Height in tiles
    pub height: f32,
}

impl Area {
    /// Checks whether a map position lies inside (left/top inclusive).
    #[must_use]
    pub fn contains(&self, tile: TilePoint) -> bool {
        tile.x >= self.x
            && tile.y >= self.y
            && tile.x < self.x + self.width
            && tile.y < self.y + self.height
    }

    /// The area's rectangle on screen.
    #[must_use]
    pub fn screen_rect(&self, viewport: Viewport) -> ScreenRect {
        viewport.tile_rect_to_screen(self.x, self.y, self.width, self.height)
    }
}

/// The areas of one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSet {
    map_id: MapId,
    areas: Vec<Area>,
}

impl AreaSet {
    /// A map without areas.
    #[must_use]
    pub const fn empty(map_id: MapId) -> Self {
        Self {
            map_id,
            areas: Vec::new(),
        }
    }

    /// Keeps the areas of `map_id` out of a database of all areas.
    #[must_use]
    pub fn for_map(map_id: MapId, all: impl IntoIterator<Item = Area>) -> Self {
        let areas: Vec<Area> = all.into_iter().filter(|a| a.map_id == map_id).collect();
        debug!(map = %map_id, count = areas.len(), "Loaded map areas");
        Self { map_id, areas }
    }

    /// Parses an areas database (a JSON list) and keeps the areas of `map_id`.
    pub fn from_json(map_id: MapId, json: &str) -> GloamingResult<Self> {
        let all: Vec<Area> =
            serde_json::from_str(json).map_err(|e| GloamingError::Serialization(e.to_string()))?;
        Ok(Self::for_map(map_id, all))
    }

    /// Map these areas belong to.
    #[must_use]
    pub const fn map_id(&self) -> MapId {
        self.map_id
    }

    /// Finds an area by id.
    #[must_use]
    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// All areas with the given name.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Area> + 'a {
        self.areas.iter().filter(move |a| a.name == name)
    }

    /// First area containing a map position.
    #[must_use]
    pub fn containing(&self, tile: TilePoint) -> Option<&Area> {
        self.areas.iter().find(|a| a.contains(tile))
    }

    /// Every area of the region the player stands in.
    #[must_use]
    pub fn player_areas(&self, player_tile: TilePoint) -> Vec<&Area> {
        self.containing(player_tile)
            .map(|area| self.named(&area.name).collect())
            .unwrap_or_default()
    }

    /// Screen rectangles of the region containing `tile`. Empty when the
    /// position is outside every area, meaning no clipping.
    #[must_use]
    pub fn clip_rects(&self, tile: TilePoint, viewport: Viewport) -> Vec<ScreenRect> {
        self.player_areas(tile)
            .into_iter()
            .map(|area| area.screen_rect(viewport))
            .collect()
    }

    /// Iterates over the areas.
    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    /// Number of areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Checks if the map has no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(id: u32, map: u32, name: &str, x: f32, y: f32, w: f32, h: f32) -> Area {
        Area {
            id: AreaId::new(id),
            map_id: MapId::new(map),
            name: name.to_string(),
            x,
            y,
            width: w,
            height: h,
        }
    }

    fn house() -> AreaSet {
        AreaSet::for_map(
            MapId::new(1),
            vec![
                area(1, 1, "house", 0.0, 0.0, 4.0, 4.0),
                area(2, 1, "house", 4.0, 0.0, 2.0, 6.0),
                area(3, 1, "garden", 10.0, 10.0, 5.0, 5.0),
                area(4, 2, "house", 0.0, 0.0, 50.0, 50.0),
            ],
        )
    }

    #[test]
    fn test_contains_edges() {
        let a = area(1, 1, "a", 2.0, 2.0, 3.0, 3.0);
        assert!(a.contains(TilePoint::new(2.0, 2.0)));
        assert!(a.contains(TilePoint::new(4.9, 4.9)));
        assert!(!a.contains(TilePoint::new(5.0, 3.0)));
        assert!(!a.contains(TilePoint::new(1.9, 3.0)));
    }

    #[test]
    fn test_for_map_filters() {
        let set = house();
        assert_eq!(set.len(), 3);
        assert!(set.get(AreaId::new(4)).is_none());
        assert_eq!(set.named("house").count(), 2);
    }

    #[test]
    fn test_player_areas() {
        let set = house();
        let region = set.player_areas(TilePoint::new(1.0, 1.0));
        assert_eq!(region.len(), 2);
        assert!(set.player_areas(TilePoint::new(8.0, 8.0)).is_empty());
    }

    #[test]
    fn test_clip_rects() {
        let set = house();
        let viewport = Viewport::new(1.0, 0.0, 48);
        let rects = set.clip_rects(TilePoint::new(5.0, 5.0), viewport);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], ScreenRect::new(-48.0, 0.0, 192.0, 192.0));
        assert!(set.clip_rects(TilePoint::new(20.0, 20.0), viewport).is_empty());
    }

    #[test]
    fn test_clip_rects_cover_player_region() {
        let set = house();
        let viewport = Viewport::new(0.0, 0.0, 48);
        for tile in [TilePoint::new(1.0, 1.0), TilePoint::new(12.0, 12.0)] {
            let expected: Vec<ScreenRect> = set
                .player_areas(tile)
                .iter()
                .map(|a| a.screen_rect(viewport))
                .collect();
            assert!(!expected.is_empty());
            assert_eq!(set.clip_rects(tile, viewport), expected);
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": 1, "mapId": 3, "name": "cave", "x": 0, "y": 0, "width": 5, "height": 5},
            {"id": 2, "mapId": 4, "name": "cave", "x": 0, "y": 0, "width": 5, "height": 5}
        ]"#;
        let set = AreaSet::from_json(MapId::new(3), json).expect("valid");
        assert_eq!(set.len(), 1);
        assert_eq!(set.map_id(), MapId::new(3));

        assert!(matches!(
            AreaSet::from_json(MapId::new(3), "{"),
            Err(GloamingError::Serialization(_))
        ));
    }
}
