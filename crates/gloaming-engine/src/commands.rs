//! Plugin commands.
//!
//! Commands arrive as JSON objects tagged by `command`, with arguments in the
//! editor's format: numbers may be strings and nested structures may be
//! JSON-encoded strings.

use gloaming_common::{EventId, GloamingError, GloamingResult, MapId};
use gloaming_kernel::{LightRequest, MapView};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::info;

use crate::context::GameContext;

/// A command issued by a map event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Start the clock.
    Start,
    /// Pause the clock until resumed by a command.
    Pause,
    /// Resume the clock.
    Resume,
    /// Set the minutes.
    SetMinutes {
        /// New minutes, carried into the hours when outside 0-59
        #[serde(deserialize_with = "lenient_i32")]
        minutes: i32,
    },
    /// Set the hours.
    SetHours {
        /// New hours, carried into the days when outside 0-23
        #[serde(deserialize_with = "lenient_i32")]
        hours: i32,
    },
    /// Set the day.
    SetDays {
        /// New day
        #[serde(deserialize_with = "lenient_i32")]
        days: i32,
    },
    /// Move the clock by some minutes.
    AddMinutes {
        /// Minutes to add, negative to go back
        #[serde(rename = "nbMinutes", alias = "minutes", deserialize_with = "lenient_i32")]
        minutes: i32,
    },
    /// Move the clock by some hours.
    AddHours {
        /// Hours to add, negative to go back
        #[serde(rename = "nbHours", alias = "hours", deserialize_with = "lenient_i32")]
        hours: i32,
    },
    /// Move the clock by some days.
    AddDays {
        /// Days to add, negative to go back
        #[serde(rename = "nbDays", alias = "days", deserialize_with = "lenient_i32")]
        days: i32,
    },
    /// Replace the current map's global ramp.
    SetGlobalLighting {
        /// List of `{time: {hours, minutes}, color: {red, green, blue, alpha}}`
        #[serde(rename = "lightingSteps", alias = "steps")]
        steps: Value,
    },
    /// Replace the current map's player sight.
    SetPlayerSight {
        /// Radius in tiles
        radius: Value,
        /// Transparency of the sight (0-1)
        brightness: Value,
    },
    /// Place a light source and/or highlight on a map event.
    SetLightSource {
        /// Event the light follows
        #[serde(rename = "eventId", deserialize_with = "lenient_event_id")]
        event_id: EventId,
        /// `{name, shape, width, height, brightness, highlightColor, switch}`
        #[serde(rename = "lightSource")]
        light: Value,
    },
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite() && n.fract() == 0.0)
        .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {value}")))
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = lenient_number(deserializer)?;
    if number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
        return Err(serde::de::Error::custom(format!("{number} is out of range")));
    }
    Ok(number as i32)
}

fn lenient_event_id<'de, D>(deserializer: D) -> Result<EventId, D::Error>
where
    D: Deserializer<'de>,
{
    let number = lenient_number(deserializer)?;
    if number < 1.0 || number > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!("{number} is not an event id")));
    }
    Ok(EventId::new(number as u32))
}

impl Command {
    /// Parses a command object.
    pub fn parse(text: &str) -> GloamingResult<Self> {
        serde_json::from_str(text).map_err(|e| GloamingError::Serialization(e.to_string()))
    }

    /// Command name as written in the editor.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetMinutes { .. } => "setMinutes",
            Self::SetHours { .. } => "setHours",
            Self::SetDays { .. } => "setDays",
            Self::AddMinutes { .. } => "addMinutes",
            Self::AddHours { .. } => "addHours",
            Self::AddDays { .. } => "addDays",
            Self::SetGlobalLighting { .. } => "setGlobalLighting",
            Self::SetPlayerSight { .. } => "setPlayerSight",
            Self::SetLightSource { .. } => "setLightSource",
        }
    }

    /// Whether the command moves the clock to another time, which makes
    /// incremental overlay interpolation restart from the ramp.
    #[must_use]
    pub const fn jumps_time(&self) -> bool {
        matches!(
            self,
            Self::SetMinutes { .. }
                | Self::SetHours { .. }
                | Self::SetDays { .. }
                | Self::AddMinutes { .. }
                | Self::AddHours { .. }
                | Self::AddDays { .. }
                | Self::SetGlobalLighting { .. }
        )
    }

    /// Runs the command against the session. Lighting commands change the
    /// lighting of `map_id`.
    pub fn apply(
        &self,
        context: &GameContext,
        map_id: MapId,
        view: &dyn MapView,
    ) -> GloamingResult<()> {
        info!(command = self.name(), map = %map_id, "Running command");
        match self {
            Self::Start | Self::Resume => context.clock().lock().resume(),
            Self::Pause => context.clock().lock().pause(true),
            Self::SetMinutes { minutes } => context.clock().lock().set_minutes(*minutes),
            Self::SetHours { hours } => context.clock().lock().set_hours(*hours),
            Self::SetDays { days } => context.clock().lock().set_days(*days),
            Self::AddMinutes { minutes } => context.clock().lock().add_minutes(*minutes),
            Self::AddHours { hours } => context.clock().lock().add_hours(*hours),
            Self::AddDays { days } => context.clock().lock().add_days(*days),
            Self::SetGlobalLighting { steps } => {
                context
                    .lighting()
                    .lock()
                    .get_or_load(map_id)
                    .set_global_json(steps)?;
            }
            Self::SetPlayerSight { radius, brightness } => {
                let sight = json!({ "radius": radius, "brightness": brightness });
                context
                    .lighting()
                    .lock()
                    .get_or_load(map_id)
                    .set_player_sight_json(&sight)?;
            }
            Self::SetLightSource { event_id, light } => {
                let request = LightRequest::from_json(light)?;
                context
                    .lighting()
                    .lock()
                    .get_or_load(map_id)
                    .place_light_at_event(view, *event_id, &request)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GloamingConfig;
    use crate::host::HeadlessHost;
    use gloaming_common::TilePoint;
    use gloaming_gameplay::ClockState;

    fn session() -> (GameContext, HeadlessHost) {
        let config = GloamingConfig::default();
        let mut host = HeadlessHost::new(config.screen);
        host.add_event(EventId::new(2), "Brazier", TilePoint::new(3.0, 3.0));
        (GameContext::new(config).expect("valid config"), host)
    }

    #[test]
    fn test_parse_clock_commands() {
        assert_eq!(
            Command::parse(r#"{"command": "start"}"#).expect("valid"),
            Command::Start
        );
        assert_eq!(
            Command::parse(r#"{"command": "setHours", "hours": "18"}"#).expect("valid"),
            Command::SetHours { hours: 18 }
        );
        assert_eq!(
            Command::parse(r#"{"command": "addMinutes", "nbMinutes": -30}"#).expect("valid"),
            Command::AddMinutes { minutes: -30 }
        );
        assert_eq!(
            Command::parse(r#"{"command": "addDays", "days": 2}"#).expect("valid"),
            Command::AddDays { days: 2 }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Command::parse(r#"{"command": "rewind"}"#),
            Err(GloamingError::Serialization(_))
        ));
        assert!(Command::parse(r#"{"command": "setHours", "hours": "dusk"}"#).is_err());
        assert!(Command::parse(r#"{"command": "setHours", "hours": 1.5}"#).is_err());
        assert!(Command::parse(
            r#"{"command": "setLightSource", "eventId": 0, "lightSource": {}}"#
        )
        .is_err());
    }

    #[test]
    fn test_clock_commands() {
        let (context, host) = session();
        let map = MapId::new(1);

        Command::SetHours { hours: 22 }
            .apply(&context, map, &host)
            .expect("applied");
        Command::AddMinutes { minutes: 150 }
            .apply(&context, map, &host)
            .expect("applied");
        {
            let clock = context.clock().lock();
            assert_eq!((clock.hours(), clock.minutes(), clock.days()), (0, 30, 2));
        }

        Command::Start.apply(&context, map, &host).expect("applied");
        assert_eq!(context.clock().lock().state(), ClockState::Running);
        Command::Pause.apply(&context, map, &host).expect("applied");
        assert_eq!(context.clock().lock().state(), ClockState::PausedByUser);
    }

    #[test]
    fn test_set_global_lighting_editor_format() {
        let (context, host) = session();
        let time = json!({"hours": "6", "minutes": "0"}).to_string();
        let color = json!({"red": "0", "green": "0", "blue": "0", "alpha": "0.5"}).to_string();
        let step = json!({"time": time, "color": color}).to_string();
        let steps = json!([step]).to_string();
        let text = json!({"command": "setGlobalLighting", "lightingSteps": steps}).to_string();

        let command = Command::parse(&text).expect("valid");
        assert!(command.jumps_time());
        command
            .apply(&context, MapId::new(1), &host)
            .expect("applied");

        let lighting = context.lighting().lock();
        let map = lighting.get(MapId::new(1)).expect("loaded");
        assert_eq!(map.global().len(), 1);
        assert_eq!(map.global()[0].color().alpha(), 0.5);
        assert!(map.is_customized());
    }

    #[test]
    fn test_set_global_lighting_requires_list() {
        let (context, host) = session();
        let command = Command::SetGlobalLighting {
            steps: json!({"time": {"hours": 1, "minutes": 0}}),
        };
        assert!(matches!(
            command.apply(&context, MapId::new(1), &host),
            Err(GloamingError::InvalidGlobalLighting(_))
        ));
    }

    #[test]
    fn test_set_player_sight() {
        let (context, host) = session();
        Command::parse(r#"{"command": "setPlayerSight", "radius": "4", "brightness": "0.6"}"#)
            .expect("valid")
            .apply(&context, MapId::new(1), &host)
            .expect("applied");

        let sight = context
            .lighting()
            .lock()
            .get(MapId::new(1))
            .and_then(|l| l.player_sight())
            .expect("sight set");
        assert_eq!(sight.radius(), 4.0);

        let bad = Command::SetPlayerSight {
            radius: json!(4),
            brightness: json!(3),
        };
        assert!(matches!(
            bad.apply(&context, MapId::new(1), &host),
            Err(GloamingError::InvalidPlayerSight(_))
        ));
    }

    #[test]
    fn test_set_light_source() {
        let (context, host) = session();
        let command = Command::parse(
            r#"{"command": "setLightSource", "eventId": "2", "lightSource":
                {"name": "fire", "shape": "circle", "width": "2", "brightness": "0.9",
                 "highlightColor": {"red": 255, "green": 120, "blue": 0, "alpha": 0.3}}}"#,
        )
        .expect("valid");
        command
            .apply(&context, MapId::new(1), &host)
            .expect("applied");

        let lighting = context.lighting().lock();
        let map = lighting.get(MapId::new(1)).expect("loaded");
        assert_eq!(map.light_sources()[0].name(), "EV2_LightSource_Brazier_fire");
        assert_eq!(map.highlights()[0].name(), "EV2_Highlight_Brazier_fire");
        assert_eq!(map.light_sources()[0].height(), 2.0);
    }

    #[test]
    fn test_set_light_source_unknown_event() {
        let (context, host) = session();
        let command = Command::SetLightSource {
            event_id: EventId::new(9),
            light: json!({"brightness": 1}),
        };
        assert!(matches!(
            command.apply(&context, MapId::new(1), &host),
            Err(GloamingError::UnknownEvent(9))
        ));
    }
}
