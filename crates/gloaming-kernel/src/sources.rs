//! Point lights: light sources, highlights, player sight and player lights.
//!
//! Light sources and player lights cut holes into the darkness overlay.
//! Highlights tint on top of it. Sizes are in tiles.

use std::fmt;
use std::str::FromStr;

use gloaming_common::{
    EventId, GloamingError, GloamingResult, ScreenPoint, SwitchId, SwitchState, TilePoint,
};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::view::MapView;

/// Outline of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Radial gradient. `width` is the radius.
    #[default]
    Circle,
    /// Flat rectangle centered on the origin.
    Rectangle,
}

impl Shape {
    /// Name used in commands and parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
        }
    }
}

impl FromStr for Shape {
    type Err = GloamingError;

    fn from_str(s: &str) -> GloamingResult<Self> {
        match s {
            "circle" => Ok(Self::Circle),
            "rectangle" => Ok(Self::Rectangle),
            other => Err(GloamingError::InvalidShape(other.to_string())),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a light follows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightOrigin {
    /// A map event.
    Event(EventId),
    /// The player.
    Player,
    /// A fixed map position in tiles.
    Fixed(TilePoint),
}

impl LightOrigin {
    /// Resolves the current screen position, `None` when the origin is gone.
    #[must_use]
    pub fn screen_position(&self, view: &dyn MapView) -> Option<ScreenPoint> {
        match *self {
            Self::Event(event_id) => view.event_screen_position(event_id),
            Self::Player => Some(view.player_screen_position()),
            Self::Fixed(tile) => Some(tile.to_screen(view.viewport())),
        }
    }
}

/// A light source or highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    name: String,
    origin: LightOrigin,
    shape: Shape,
    width: f32,
    height: f32,
    color: Color,
    #[serde(default = "no_switch")]
    switch: SwitchId,
}

const fn no_switch() -> SwitchId {
    SwitchId::NULL
}

impl LightSource {
    /// Creates an always-on light.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin: LightOrigin,
        shape: Shape,
        width: f32,
        height: f32,
        color: Color,
    ) -> Self {
        Self {
            name: name.into(),
            origin,
            shape,
            width,
            height,
            color,
            switch: SwitchId::NULL,
        }
    }

    /// Ties the light to a switch. The null id makes it always on.
    #[must_use]
    pub fn with_switch(mut self, switch: SwitchId) -> Self {
        self.switch = switch;
        self
    }

    /// Unique name within its list.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the light follows.
    #[must_use]
    pub const fn origin(&self) -> LightOrigin {
        self.origin
    }

    /// Outline.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Width in tiles (the radius for circles).
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Light color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Controlling switch, `None` when always on.
    #[must_use]
    pub const fn switch(&self) -> Option<SwitchId> {
        self.switch.non_null()
    }

    /// On when no switch is set or the switch is currently on.
    #[must_use]
    pub fn is_on(&self, switches: &dyn SwitchState) -> bool {
        self.switch().map_or(true, |id| switches.value(id))
    }

    /// Current screen position of the origin.
    pub fn position(&self, view: &dyn MapView) -> GloamingResult<ScreenPoint> {
        self.origin
            .screen_position(view)
            .ok_or_else(|| GloamingError::LightSourceNullOrUndefinedOrigin {
                name: self.name.clone(),
            })
    }
}

/// Circle of visibility around the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlayerSightRepr", into = "PlayerSightRepr")]
pub struct PlayerSight {
    radius: f32,
    brightness: f32,
}

#[derive(Serialize, Deserialize)]
struct PlayerSightRepr {
    radius: f32,
    brightness: f32,
}

impl TryFrom<PlayerSightRepr> for PlayerSight {
    type Error = GloamingError;

    fn try_from(repr: PlayerSightRepr) -> GloamingResult<Self> {
        Self::new(repr.radius, repr.brightness)
    }
}

impl From<PlayerSight> for PlayerSightRepr {
    fn from(sight: PlayerSight) -> Self {
        Self {
            radius: sight.radius,
            brightness: sight.brightness,
        }
    }
}

impl PlayerSight {
    /// Creates a player sight. Radius is in tiles, brightness in 0-1.
    pub fn new(radius: f32, brightness: f32) -> GloamingResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GloamingError::InvalidPlayerSight(format!(
                "radius {radius} must be a positive number"
            )));
        }
        if !brightness.is_finite() || !(0.0..=1.0).contains(&brightness) {
            return Err(GloamingError::InvalidPlayerSight(format!(
                "brightness {brightness} must be between 0 and 1"
            )));
        }
        Ok(Self { radius, brightness })
    }

    /// Radius in tiles.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// How transparent the circle is (0-1).
    #[must_use]
    pub const fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Color of the cut-out.
    #[must_use]
    pub fn color(&self) -> Color {
        Color::clamped(0.0, 0.0, 0.0, self.brightness)
    }
}

/// A light carried by the player: a cut-out plus a tint on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLight {
    /// The cut-out, a white light of the configured brightness.
    pub light: LightSource,
    /// The tint drawn over the cut-out.
    pub highlight: LightSource,
}

impl PlayerLight {
    /// Builds a player light. Both halves share name, shape, size and switch.
    pub fn new(
        name: impl Into<String>,
        shape: Shape,
        width: f32,
        height: f32,
        brightness: f32,
        highlight_color: Color,
        switch: SwitchId,
    ) -> GloamingResult<Self> {
        let name = name.into();
        let light = LightSource::new(
            name.clone(),
            LightOrigin::Player,
            shape,
            width,
            height,
            Color::white(brightness)?,
        )
        .with_switch(switch);
        let highlight = LightSource::new(
            name,
            LightOrigin::Player,
            shape,
            width,
            height,
            highlight_color,
        )
        .with_switch(switch);
        Ok(Self { light, highlight })
    }

    /// Name shared by both halves.
    #[must_use]
    pub fn name(&self) -> &str {
        self.light.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloaming_common::Viewport;

    struct FixedView;

    impl MapView for FixedView {
        fn viewport(&self) -> Viewport {
            Viewport::new(2.0, 1.0, 48)
        }

        fn screen_size(&self) -> (u32, u32) {
            (816, 624)
        }

        fn player_screen_position(&self) -> ScreenPoint {
            ScreenPoint::new(408.0, 336.0)
        }

        fn player_tile(&self) -> TilePoint {
            TilePoint::new(10.0, 7.0)
        }

        fn event_screen_position(&self, event_id: EventId) -> Option<ScreenPoint> {
            (event_id.raw() == 1).then(|| ScreenPoint::new(120.0, 96.0))
        }

        fn event_name(&self, event_id: EventId) -> Option<String> {
            (event_id.raw() == 1).then(|| "Torch".to_string())
        }
    }

    fn torch(origin: LightOrigin) -> LightSource {
        LightSource::new("torch", origin, Shape::Circle, 2.0, 2.0, Color::WHITE)
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!("circle".parse::<Shape>().expect("valid"), Shape::Circle);
        assert_eq!("rectangle".parse::<Shape>().expect("valid"), Shape::Rectangle);
        assert!(matches!(
            "triangle".parse::<Shape>(),
            Err(GloamingError::InvalidShape(s)) if s == "triangle"
        ));
        assert_eq!(Shape::Rectangle.to_string(), "rectangle");
    }

    #[test]
    fn test_light_without_switch_is_on() {
        let light = torch(LightOrigin::Player);
        assert!(light.is_on(&|_: SwitchId| false));
    }

    #[test]
    fn test_light_follows_switch() {
        let light = torch(LightOrigin::Player).with_switch(SwitchId::new(5));
        assert!(!light.is_on(&|_: SwitchId| false));
        assert!(light.is_on(&|id: SwitchId| id.raw() == 5));
    }

    #[test]
    fn test_positions() {
        let view = FixedView;
        assert_eq!(
            torch(LightOrigin::Event(EventId::new(1)))
                .position(&view)
                .expect("event exists"),
            ScreenPoint::new(120.0, 96.0)
        );
        assert_eq!(
            torch(LightOrigin::Player).position(&view).expect("player"),
            ScreenPoint::new(408.0, 336.0)
        );
        // Tile (3, 2) with the view scrolled to (2, 1): one tile right, one down.
        assert_eq!(
            torch(LightOrigin::Fixed(TilePoint::new(3.0, 2.0)))
                .position(&view)
                .expect("fixed"),
            ScreenPoint::new(72.0, 96.0)
        );
    }

    #[test]
    fn test_missing_origin() {
        let result = torch(LightOrigin::Event(EventId::new(9))).position(&FixedView);
        assert!(matches!(
            result,
            Err(GloamingError::LightSourceNullOrUndefinedOrigin { name }) if name == "torch"
        ));
    }

    #[test]
    fn test_player_sight_validation() {
        assert!(PlayerSight::new(3.0, 0.5).is_ok());
        assert!(matches!(
            PlayerSight::new(-1.0, 0.5),
            Err(GloamingError::InvalidPlayerSight(_))
        ));
        assert!(PlayerSight::new(3.0, 1.5).is_err());
        assert!(PlayerSight::new(f32::NAN, 0.5).is_err());
    }

    #[test]
    fn test_player_light_halves() {
        let tint = Color::new(255.0, 200.0, 120.0, 0.3).expect("valid");
        let light = PlayerLight::new("lantern", Shape::Circle, 3.0, 3.0, 0.8, tint, SwitchId::new(2))
            .expect("valid");
        assert_eq!(light.light.color(), Color::white(0.8).expect("valid"));
        assert_eq!(light.highlight.color(), tint);
        assert_eq!(light.highlight.switch(), Some(SwitchId::new(2)));
        assert_eq!(light.name(), "lantern");
    }

    #[test]
    fn test_light_source_serde() {
        let light = torch(LightOrigin::Event(EventId::new(3))).with_switch(SwitchId::new(4));
        let json = serde_json::to_string(&light).expect("serialize");
        let parsed: LightSource = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, light);

        let bad = json.replace("circle", "hexagon");
        assert!(serde_json::from_str::<LightSource>(&bad).is_err());
    }
}
