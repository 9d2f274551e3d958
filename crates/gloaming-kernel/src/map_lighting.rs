//! Per-map lighting configuration and its cache.
//!
//! Each map owns a global ramp, an optional player sight, light sources,
//! highlights and player lights. A map's configuration is built from the
//! configured defaults the first time it is requested and kept afterwards, so
//! commands that change it persist across visits.

use ahash::AHashMap;
use gloaming_common::{EventId, GloamingError, GloamingResult, MapId, SaveFormat, SwitchId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::color::Color;
use crate::json;
use crate::lighting::{FrameColorMode, LightStep};
use crate::sources::{LightOrigin, LightSource, PlayerLight, PlayerSight, Shape};
use crate::view::MapView;

/// Configuration of a light carried by the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerLightSettings {
    /// Name, generated from the position in the list when empty
    pub name: String,
    /// Outline
    pub shape: Shape,
    /// Width (radius for circles) in tiles
    pub width: f32,
    /// Height in tiles
    pub height: f32,
    /// Alpha of the cut-out (0-1)
    pub brightness: f32,
    /// Tint drawn over the cut-out
    pub highlight_color: Color,
    /// Controlling switch (0 = always on)
    pub switch: SwitchId,
}

impl Default for PlayerLightSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            shape: Shape::Circle,
            width: 3.0,
            height: 3.0,
            brightness: 1.0,
            highlight_color: Color::TRANSPARENT,
            switch: SwitchId::NULL,
        }
    }
}

impl PlayerLightSettings {
    /// Builds the player light at position `index` of the configured list.
    pub fn build(&self, index: usize) -> GloamingResult<PlayerLight> {
        let name = if self.name.is_empty() {
            format!("PlayerLight_{}", index + 1)
        } else {
            self.name.clone()
        };
        PlayerLight::new(
            name,
            self.shape,
            self.width,
            self.height,
            self.brightness,
            self.highlight_color,
            self.switch,
        )
    }
}

/// Lighting configuration, the `[lighting]` section of the engine config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Global ramp of maps without their own
    pub default_global: Vec<LightStep>,
    /// Player sight of maps without their own
    pub default_player_sight: Option<PlayerSight>,
    /// Lights carried by the player on every map
    pub player_lights: Vec<PlayerLightSettings>,
    /// How the overlay color advances each frame
    pub frame_color_mode: FrameColorMode,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            default_global: default_ramp(),
            default_player_sight: None,
            player_lights: Vec::new(),
            frame_color_mode: FrameColorMode::Incremental,
        }
    }
}

impl LightingSettings {
    /// Checks that every player light can be built.
    pub fn validate(&self) -> GloamingResult<()> {
        for (index, light) in self.player_lights.iter().enumerate() {
            light.build(index)?;
        }
        Ok(())
    }
}

/// Night blue overnight, clear during the day, orange at dusk.
fn default_ramp() -> Vec<LightStep> {
    use gloaming_common::TimeOfDay;

    let step = |hours, red, green, blue, alpha| {
        LightStep::new(
            TimeOfDay::new(hours, 0),
            Color::clamped(red, green, blue, alpha),
        )
    };
    vec![
        step(0, 10.0, 10.0, 40.0, 0.75),
        step(5, 20.0, 20.0, 60.0, 0.6),
        step(7, 255.0, 180.0, 120.0, 0.15),
        step(9, 0.0, 0.0, 0.0, 0.0),
        step(17, 0.0, 0.0, 0.0, 0.0),
        step(19, 255.0, 120.0, 40.0, 0.25),
        step(21, 10.0, 10.0, 40.0, 0.7),
    ]
}

/// A "set light source" request placed at a map event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightRequest {
    /// Suffix of the generated names (may be empty)
    pub name: String,
    /// Outline
    pub shape: Shape,
    /// Width (radius for circles) in tiles
    pub width: f32,
    /// Height in tiles, ignored for circles
    pub height: f32,
    /// Alpha of the white light source; 0 places none
    pub brightness: f32,
    /// Highlight color; alpha 0 places none
    pub highlight_color: Color,
    /// Controlling switch (0 = always on)
    pub switch: SwitchId,
}

impl Default for LightRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            shape: Shape::Circle,
            width: 1.0,
            height: 1.0,
            brightness: 0.0,
            highlight_color: Color::TRANSPARENT,
            switch: SwitchId::NULL,
        }
    }
}

impl LightRequest {
    /// Parses a request in the editor's format, with numbers as strings and
    /// nested JSON documents.
    pub fn from_json(value: &Value) -> GloamingResult<Self> {
        let object = json::unwrap_nested(value);
        let number = |key: &str, default: f32| {
            json::field_number(&object, key).map_or(default, |v| v as f32)
        };

        let shape_name = json::field_string(&object, "shape");
        let shape = if shape_name.is_empty() {
            Shape::Circle
        } else {
            shape_name.parse()?
        };
        let highlight_color = match object.get("highlightColor") {
            Some(color) => Color::from_json(color)?,
            None => Color::TRANSPARENT,
        };
        let switch = json::field_number(&object, "switch").map_or(0, |v| v.max(0.0) as u32);

        Ok(Self {
            name: json::field_string(&object, "name"),
            shape,
            width: number("width", 1.0),
            height: number("height", 1.0),
            brightness: number("brightness", 0.0),
            highlight_color,
            switch: SwitchId::new(switch),
        })
    }
}

/// Lighting of one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLighting {
    map_id: MapId,
    global: Vec<LightStep>,
    player_sight: Option<PlayerSight>,
    light_sources: Vec<LightSource>,
    highlights: Vec<LightSource>,
    player_lights: Vec<PlayerLight>,
    customized: bool,
}

fn upsert(lights: &mut Vec<LightSource>, light: LightSource) {
    if let Some(existing) = lights.iter_mut().find(|l| l.name() == light.name()) {
        *existing = light;
    } else {
        lights.push(light);
    }
}

fn parse_lights(
    value: &Value,
    error: fn(String) -> GloamingError,
) -> GloamingResult<Vec<LightSource>> {
    let items = json::list(value).ok_or_else(|| error(format!("expected a list, got {value}")))?;
    items
        .into_iter()
        .map(|item| {
            let item = json::unwrap_nested(&item).into_owned();
            serde_json::from_value(item).map_err(|e| error(e.to_string()))
        })
        .collect()
}

impl MapLighting {
    /// A map with no lighting at all.
    #[must_use]
    pub fn new(map_id: MapId) -> Self {
        Self {
            map_id,
            global: Vec::new(),
            player_sight: None,
            light_sources: Vec::new(),
            highlights: Vec::new(),
            player_lights: Vec::new(),
            customized: false,
        }
    }

    /// Map this configuration belongs to.
    #[must_use]
    pub const fn map_id(&self) -> MapId {
        self.map_id
    }

    /// Whether a command has changed this map since it was loaded.
    #[must_use]
    pub const fn is_customized(&self) -> bool {
        self.customized
    }

    /// Global ramp, unsorted.
    #[must_use]
    pub fn global(&self) -> &[LightStep] {
        &self.global
    }

    /// Player sight, if any.
    #[must_use]
    pub const fn player_sight(&self) -> Option<PlayerSight> {
        self.player_sight
    }

    /// Light sources.
    #[must_use]
    pub fn light_sources(&self) -> &[LightSource] {
        &self.light_sources
    }

    /// Highlights.
    #[must_use]
    pub fn highlights(&self) -> &[LightSource] {
        &self.highlights
    }

    /// Player lights.
    #[must_use]
    pub fn player_lights(&self) -> &[PlayerLight] {
        &self.player_lights
    }

    /// Replaces the global ramp.
    pub fn set_global(&mut self, steps: Vec<LightStep>) {
        debug!(map = %self.map_id, steps = steps.len(), "Global lighting set");
        self.global = steps;
        self.customized = true;
    }

    /// Replaces the global ramp from a JSON list of light steps.
    pub fn set_global_json(&mut self, value: &Value) -> GloamingResult<()> {
        let items = json::list(value).ok_or_else(|| {
            GloamingError::InvalidGlobalLighting(format!("expected a list, got {value}"))
        })?;
        let steps = items
            .iter()
            .map(LightStep::from_json)
            .collect::<GloamingResult<Vec<_>>>()?;
        self.set_global(steps);
        Ok(())
    }

    /// Replaces the player sight. `None` removes it.
    pub fn set_player_sight(&mut self, sight: Option<PlayerSight>) {
        self.player_sight = sight;
        self.customized = true;
    }

    /// Replaces the player sight from `{radius, brightness}`.
    pub fn set_player_sight_json(&mut self, value: &Value) -> GloamingResult<()> {
        let object = json::unwrap_nested(value);
        let radius = json::field_number(&object, "radius");
        let brightness = json::field_number(&object, "brightness");
        let sight = match (radius, brightness) {
            (Some(radius), Some(brightness)) => PlayerSight::new(radius as f32, brightness as f32)?,
            _ => {
                return Err(GloamingError::InvalidPlayerSight(format!(
                    "expected radius and brightness, got {value}"
                )))
            }
        };
        self.set_player_sight(Some(sight));
        Ok(())
    }

    /// Replaces all light sources.
    pub fn set_light_sources(&mut self, lights: Vec<LightSource>) {
        self.light_sources = lights;
        self.customized = true;
    }

    /// Replaces all light sources from a JSON list.
    pub fn set_light_sources_json(&mut self, value: &Value) -> GloamingResult<()> {
        let lights = parse_lights(value, GloamingError::InvalidLightSources)?;
        self.set_light_sources(lights);
        Ok(())
    }

    /// Replaces all highlights.
    pub fn set_highlights(&mut self, highlights: Vec<LightSource>) {
        self.highlights = highlights;
        self.customized = true;
    }

    /// Replaces all highlights from a JSON list.
    pub fn set_highlights_json(&mut self, value: &Value) -> GloamingResult<()> {
        let highlights = parse_lights(value, GloamingError::InvalidHighlight)?;
        self.set_highlights(highlights);
        Ok(())
    }

    /// Replaces the player lights.
    pub fn set_player_lights(&mut self, lights: Vec<PlayerLight>) {
        self.player_lights = lights;
        self.customized = true;
    }

    /// Adds a light source, replacing one of the same name.
    pub fn upsert_light_source(&mut self, light: LightSource) {
        upsert(&mut self.light_sources, light);
        self.customized = true;
    }

    /// Adds a highlight, replacing one of the same name.
    pub fn upsert_highlight(&mut self, highlight: LightSource) {
        upsert(&mut self.highlights, highlight);
        self.customized = true;
    }

    /// Removes a light source by name.
    pub fn remove_light_source(&mut self, name: &str) -> bool {
        let before = self.light_sources.len();
        self.light_sources.retain(|l| l.name() != name);
        let removed = self.light_sources.len() != before;
        self.customized |= removed;
        removed
    }

    /// Places a light source and/or a highlight on a map event.
    ///
    /// Names are `EV{id}_LightSource_{event name}` and `EV{id}_Highlight_{event
    /// name}`, followed by `_{request name}` when the request is named. Circles
    /// take the width as height.
    pub fn place_light_at_event(
        &mut self,
        view: &dyn MapView,
        event_id: EventId,
        request: &LightRequest,
    ) -> GloamingResult<()> {
        let event_name = view
            .event_name(event_id)
            .ok_or(GloamingError::UnknownEvent(event_id.raw()))?;
        let suffix = if request.name.is_empty() {
            String::new()
        } else {
            format!("_{}", request.name)
        };
        let height = match request.shape {
            Shape::Circle => request.width,
            Shape::Rectangle => request.height,
        };
        let origin = LightOrigin::Event(event_id);

        if request.brightness > 0.0 {
            let light = LightSource::new(
                format!("EV{event_id}_LightSource_{event_name}{suffix}"),
                origin,
                request.shape,
                request.width,
                height,
                Color::white(request.brightness)?,
            )
            .with_switch(request.switch);
            debug!(map = %self.map_id, name = light.name(), "Light source placed");
            self.upsert_light_source(light);
        }

        if request.highlight_color.alpha() > 0.0 {
            let highlight = LightSource::new(
                format!("EV{event_id}_Highlight_{event_name}{suffix}"),
                origin,
                request.shape,
                request.width,
                height,
                request.highlight_color,
            )
            .with_switch(request.switch);
            debug!(map = %self.map_id, name = highlight.name(), "Highlight placed");
            self.upsert_highlight(highlight);
        }

        Ok(())
    }
}

/// Persisted per-map lighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LightingSave {
    maps: Vec<MapLighting>,
}

/// Owner of every map's lighting plus the defaults new maps start from.
#[derive(Debug)]
pub struct LightingManager {
    default_global: Vec<LightStep>,
    default_player_sight: Option<PlayerSight>,
    player_lights: Vec<PlayerLight>,
    mode: FrameColorMode,
    maps: AHashMap<MapId, MapLighting>,
}

impl LightingManager {
    /// Creates an empty cache from the lighting settings.
    pub fn new(settings: &LightingSettings) -> GloamingResult<Self> {
        let player_lights = settings
            .player_lights
            .iter()
            .enumerate()
            .map(|(index, light)| light.build(index))
            .collect::<GloamingResult<Vec<_>>>()?;
        info!(
            steps = settings.default_global.len(),
            player_lights = player_lights.len(),
            mode = ?settings.frame_color_mode,
            "Lighting manager ready"
        );
        Ok(Self {
            default_global: settings.default_global.clone(),
            default_player_sight: settings.default_player_sight,
            player_lights,
            mode: settings.frame_color_mode,
            maps: AHashMap::new(),
        })
    }

    /// How the overlay color advances each frame.
    #[must_use]
    pub const fn frame_color_mode(&self) -> FrameColorMode {
        self.mode
    }

    /// Default global ramp.
    #[must_use]
    pub fn default_global(&self) -> &[LightStep] {
        &self.default_global
    }

    /// Default player sight.
    #[must_use]
    pub const fn default_player_sight(&self) -> Option<PlayerSight> {
        self.default_player_sight
    }

    /// Configured player lights.
    #[must_use]
    pub fn player_lights(&self) -> &[PlayerLight] {
        &self.player_lights
    }

    /// Lighting of a map, built from the defaults on first access.
    pub fn get_or_load(&mut self, map_id: MapId) -> &mut MapLighting {
        let Self {
            default_global,
            default_player_sight,
            player_lights,
            maps,
            ..
        } = self;
        maps.entry(map_id).or_insert_with(|| {
            debug!(map = %map_id, "Loading map lighting from defaults");
            MapLighting {
                map_id,
                global: default_global.clone(),
                player_sight: *default_player_sight,
                light_sources: Vec::new(),
                highlights: Vec::new(),
                player_lights: player_lights.clone(),
                customized: false,
            }
        })
    }

    /// Lighting of a map if it has been loaded.
    #[must_use]
    pub fn get(&self, map_id: MapId) -> Option<&MapLighting> {
        self.maps.get(&map_id)
    }

    /// Drops a map's lighting so the next access reloads the defaults.
    pub fn invalidate(&mut self, map_id: MapId) -> bool {
        let removed = self.maps.remove(&map_id).is_some();
        if removed {
            debug!(map = %map_id, "Map lighting invalidated");
        }
        removed
    }

    /// Drops a map's lighting unless a command customized it. Called when the
    /// player leaves a map.
    pub fn release(&mut self, map_id: MapId) -> bool {
        let untouched = self
            .maps
            .get(&map_id)
            .is_some_and(|lighting| !lighting.is_customized());
        untouched && self.invalidate(map_id)
    }

    /// Drops every map's lighting.
    pub fn clear(&mut self) {
        debug!(count = self.maps.len(), "Clearing map lighting");
        self.maps.clear();
    }

    /// Number of loaded maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Checks if no map is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Serializes the customized maps.
    pub fn to_bytes(&self) -> GloamingResult<Vec<u8>> {
        let mut maps: Vec<MapLighting> = self
            .maps
            .values()
            .filter(|m| m.is_customized())
            .cloned()
            .collect();
        maps.sort_by_key(MapLighting::map_id);

        let save = LightingSave { maps };
        let mut buffer = SaveFormat::LIGHTING.header();
        let data =
            bincode::serialize(&save).map_err(|e| GloamingError::Serialization(e.to_string()))?;
        buffer.extend(data);
        Ok(buffer)
    }

    /// Restores maps saved with [`LightingManager::to_bytes`], replacing
    /// loaded ones.
    pub fn restore_bytes(&mut self, bytes: &[u8]) -> GloamingResult<usize> {
        let payload = SaveFormat::LIGHTING.payload(bytes)?;
        let save: LightingSave = bincode::deserialize(payload)
            .map_err(|e| GloamingError::Serialization(e.to_string()))?;

        let count = save.maps.len();
        for lighting in save.maps {
            self.maps.insert(lighting.map_id(), lighting);
        }
        info!(count, "Restored map lighting");
        Ok(count)
    }
}
