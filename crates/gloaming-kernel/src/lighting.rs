//! Day/night color ramp.
//!
//! A map's global lighting is a list of light steps: keyframes pairing a time
//! of day with an overlay color. Each frame the overlay color moves toward the
//! next keyframe, wrapping around midnight.

use gloaming_common::{
    ClockReading, GloamingError, GloamingResult, TimeOfDay, MINUTES_PER_DAY,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::color::Color;
use crate::json;

/// A keyframe of the day/night ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LightStepRepr", into = "LightStepRepr")]
pub struct LightStep {
    time: TimeOfDay,
    color: Color,
}

#[derive(Serialize, Deserialize)]
struct StepTime {
    hours: i64,
    minutes: i64,
}

#[derive(Serialize, Deserialize)]
struct LightStepRepr {
    time: StepTime,
    color: Color,
}

impl TryFrom<LightStepRepr> for LightStep {
    type Error = GloamingError;

    fn try_from(repr: LightStepRepr) -> GloamingResult<Self> {
        let time = TimeOfDay::try_new(repr.time.hours, repr.time.minutes).ok_or_else(|| {
            GloamingError::InvalidLightStep(format!(
                "time {}:{} is out of range",
                repr.time.hours, repr.time.minutes
            ))
        })?;
        Ok(Self::new(time, repr.color))
    }
}

impl From<LightStep> for LightStepRepr {
    fn from(step: LightStep) -> Self {
        Self {
            time: StepTime {
                hours: i64::from(step.time.hours()),
                minutes: i64::from(step.time.minutes()),
            },
            color: step.color,
        }
    }
}

impl LightStep {
    /// Creates a light step.
    #[must_use]
    pub const fn new(time: TimeOfDay, color: Color) -> Self {
        Self { time, color }
    }

    /// Time of the keyframe.
    #[must_use]
    pub const fn time(&self) -> TimeOfDay {
        self.time
    }

    /// Color at the keyframe.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Parses `{time: {hours, minutes}, color: {red, green, blue, alpha}}`.
    ///
    /// Nested objects may be JSON documents stored in strings and numbers may
    /// be numeric strings. A bad time or a color that is not an object fails
    /// with `InvalidLightStep`; a color object with a channel out of range
    /// fails with `InvalidColor`.
    pub fn from_json(value: &Value) -> GloamingResult<Self> {
        let object = json::unwrap_nested(value);
        let time_value = object
            .get("time")
            .ok_or_else(|| GloamingError::InvalidLightStep("missing time".to_string()))?;
        let color_value = object
            .get("color")
            .ok_or_else(|| GloamingError::InvalidLightStep("missing color".to_string()))?;

        let time_object = json::unwrap_nested(time_value);
        let hours = json::field_number(&time_object, "hours");
        let minutes = json::field_number(&time_object, "minutes");
        let time = match (hours, minutes) {
            (Some(h), Some(m)) if h.fract() == 0.0 && m.fract() == 0.0 => {
                TimeOfDay::try_new(h as i64, m as i64)
            }
            _ => None,
        }
        .ok_or_else(|| GloamingError::InvalidLightStep(format!("invalid time {time_value}")))?;

        let color_object = json::unwrap_nested(color_value);
        if !color_object.is_object() {
            return Err(GloamingError::InvalidLightStep(format!(
                "invalid color {color_value}"
            )));
        }

        Ok(Self::new(time, Color::from_json(&color_object)?))
    }
}

/// How the overlay color is advanced each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameColorMode {
    /// Add one frame's worth of change to the previous frame's color.
    #[default]
    Incremental,
    /// Recompute the interpolation from elapsed time every frame.
    Exact,
}

impl FrameColorMode {
    /// Computes the overlay color for this frame.
    #[must_use]
    pub fn frame_color(
        self,
        steps: &[LightStep],
        reading: ClockReading,
        previous: Option<Color>,
    ) -> Option<Color> {
        match self {
            Self::Incremental => frame_color(steps, reading, previous),
            Self::Exact => exact_frame_color(steps, reading),
        }
    }
}

/// The keyframes on either side of the current time, in minutes since
/// midnight. Wrapped keyframes lie outside 0..1440.
#[derive(Debug, Clone, Copy)]
struct StepWindow {
    previous_minutes: i32,
    previous_color: Color,
    next_minutes: i32,
    next_color: Color,
}

impl StepWindow {
    fn span(&self) -> i32 {
        self.next_minutes - self.previous_minutes
    }
}

enum RampPosition {
    OnStep(Color),
    Between(StepWindow),
}

fn locate(steps: &[LightStep], now: i32) -> Option<RampPosition> {
    let mut sorted = steps.to_vec();
    sorted.sort_by_key(|step| step.time.to_minutes());

    let first = *sorted.first()?;
    let last = *sorted.last()?;

    if let Some(step) = sorted.iter().find(|s| s.time.to_minutes() == now) {
        return Some(RampPosition::OnStep(step.color));
    }

    let (previous_minutes, previous_color) = sorted
        .iter()
        .rev()
        .find(|s| s.time.to_minutes() <= now)
        .map_or(
            (last.time.to_minutes() - MINUTES_PER_DAY, last.color),
            |s| (s.time.to_minutes(), s.color),
        );
    let (next_minutes, next_color) = sorted
        .iter()
        .find(|s| s.time.to_minutes() > now)
        .map_or(
            (first.time.to_minutes() + MINUTES_PER_DAY, first.color),
            |s| (s.time.to_minutes(), s.color),
        );

    Some(RampPosition::Between(StepWindow {
        previous_minutes,
        previous_color,
        next_minutes,
        next_color,
    }))
}

fn channel_deltas(window: &StepWindow) -> [f32; 4] {
    let from = window.previous_color.to_array();
    let to = window.next_color.to_array();
    [
        to[0] - from[0],
        to[1] - from[1],
        to[2] - from[2],
        to[3] - from[3],
    ]
}

/// Computes the overlay color for the current frame by stepping from
/// `previous`.
///
/// - No steps: `None`.
/// - Current minute equal to a step's time: that step's color.
/// - Otherwise one frame's worth of change toward the next step is added to
///   `previous` (or to the previous step's color when `previous` is `None`),
///   clamped to the valid range.
///
/// Before the first step of the day the previous step is the last one shifted
/// back a day; after the last step the next step is the first one shifted
/// forward a day.
#[must_use]
pub fn frame_color(
    steps: &[LightStep],
    reading: ClockReading,
    previous: Option<Color>,
) -> Option<Color> {
    let now = reading.real_time.to_minutes();
    let window = match locate(steps, now)? {
        RampPosition::OnStep(color) => return Some(color),
        RampPosition::Between(window) => window,
    };

    let frames = window.span() as f32 * reading.frames_per_minute.max(1) as f32;
    let deltas = channel_deltas(&window);
    let base = previous.unwrap_or(window.previous_color).to_array();

    let color = Color::clamped(
        base[0] + deltas[0] / frames,
        base[1] + deltas[1] / frames,
        base[2] + deltas[2] / frames,
        base[3] + deltas[3] / frames,
    );
    trace!(time = %reading.real_time, frame = reading.frame, %color, "Frame color");
    Some(color)
}

/// Computes the overlay color for the current frame from elapsed time.
///
/// Uses the same step selection as [`frame_color`] but interpolates linearly
/// from the minutes and frames elapsed since the previous step, so dropped or
/// repeated frames do not accumulate drift.
#[must_use]
pub fn exact_frame_color(steps: &[LightStep], reading: ClockReading) -> Option<Color> {
    let now = reading.real_time.to_minutes();
    let window = match locate(steps, now)? {
        RampPosition::OnStep(color) => return Some(color),
        RampPosition::Between(window) => window,
    };

    let frames_per_minute = reading.frames_per_minute.max(1) as f32;
    let elapsed =
        (now - window.previous_minutes) as f32 + reading.frame as f32 / frames_per_minute;
    let progress = (elapsed / window.span() as f32).clamp(0.0, 1.0);

    let deltas = channel_deltas(&window);
    let base = window.previous_color.to_array();
    Some(Color::clamped(
        base[0] + deltas[0] * progress,
        base[1] + deltas[1] * progress,
        base[2] + deltas[2] * progress,
        base[3] + deltas[3] * progress,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(hours: u32, minutes: u32, color: Color) -> LightStep {
        LightStep::new(TimeOfDay::new(hours, minutes), color)
    }

    fn reading(hours: u32, minutes: u32, fpm: u32) -> ClockReading {
        ClockReading::at(TimeOfDay::new(hours, minutes), fpm)
    }

    fn dawn() -> Vec<LightStep> {
        vec![step(8, 0, Color::WHITE), step(6, 0, Color::BLACK)]
    }

    #[test]
    fn test_no_steps() {
        assert_eq!(frame_color(&[], reading(12, 0, 300), None), None);
        assert_eq!(exact_frame_color(&[], reading(12, 0, 300)), None);
    }

    #[test]
    fn test_snap_to_step() {
        let steps = [step(8, 0, Color::WHITE)];
        assert_eq!(
            frame_color(&steps, reading(8, 0, 300), Some(Color::BLACK)),
            Some(Color::WHITE)
        );
    }

    #[test]
    fn test_single_step_holds_all_day() {
        let steps = [step(8, 0, Color::WHITE)];
        let color = frame_color(&steps, reading(20, 0, 300), None).expect("color");
        assert_eq!(color, Color::WHITE);
    }

    #[test]
    fn test_first_frame_is_strictly_between() {
        let color = frame_color(&dawn(), reading(7, 0, 300), None).expect("color");
        assert!(color.red() > 0.0 && color.red() < 255.0);
        assert!(color.green() > 0.0 && color.green() < 255.0);
        assert!(color.blue() > 0.0 && color.blue() < 255.0);
    }

    #[test]
    fn test_frames_approach_next_step() {
        let steps = dawn();
        let mut previous = frame_color(&steps, reading(7, 0, 300), None);
        for _ in 0..50 {
            let next = frame_color(&steps, reading(7, 0, 300), previous).expect("color");
            let before = previous.expect("color");
            assert!(next.red() > before.red());
            assert!(next.red() <= 255.0);
            previous = Some(next);
        }

        assert_eq!(
            frame_color(&steps, reading(8, 0, 300), previous),
            Some(Color::WHITE)
        );
    }

    #[test]
    fn test_full_ramp_reaches_target() {
        let steps = dawn();
        let fpm = 2;
        let mut color = None;
        for minute in 0..120 {
            for _ in 0..fpm {
                let time = TimeOfDay::from_minutes(6 * 60 + minute);
                color = frame_color(&steps, ClockReading::at(time, fpm), color);
            }
        }
        let color = color.expect("color");
        // The 6:00 minute snaps to black, so the ramp ends a minute short of white.
        assert!(color.red() > 250.0);
    }

    #[test]
    fn test_wraps_around_midnight() {
        let night = Color::new(0.0, 0.0, 60.0, 0.8).expect("valid");
        let steps = [step(6, 0, Color::WHITE), step(22, 0, night)];

        // 23:00 sits between 22:00 and 06:00 of the next day: 8 hours.
        let color = exact_frame_color(&steps, reading(23, 0, 300)).expect("color");
        let expected_red = 255.0 / 8.0;
        assert!((color.red() - expected_red).abs() < 0.01);

        // 01:00 sits between 22:00 of the previous day and 06:00.
        let color = exact_frame_color(&steps, reading(1, 0, 300)).expect("color");
        assert!((color.red() - 255.0 * 3.0 / 8.0).abs() < 0.01);
    }

    #[test]
    fn test_incremental_rate_uses_wrapped_span() {
        let steps = [step(6, 0, Color::WHITE), step(22, 0, Color::BLACK)];
        let color = frame_color(&steps, reading(23, 0, 1), None).expect("color");
        let rate = 255.0 / (8.0 * 60.0);
        assert!((color.red() - rate).abs() < 1e-3);
    }

    #[test]
    fn test_exact_includes_frames() {
        let steps = dawn();
        let mut at = reading(7, 0, 300);
        at.frame = 150;
        let color = exact_frame_color(&steps, at).expect("color");
        let expected = 255.0 * 60.5 / 120.0;
        assert!((color.red() - expected).abs() < 0.01);
    }

    #[test]
    fn test_mode_dispatch() {
        let steps = dawn();
        let at = reading(7, 0, 300);
        assert_eq!(
            FrameColorMode::Exact.frame_color(&steps, at, Some(Color::WHITE)),
            exact_frame_color(&steps, at)
        );
        assert_eq!(
            FrameColorMode::Incremental.frame_color(&steps, at, None),
            frame_color(&steps, at, None)
        );
    }

    #[test]
    fn test_alpha_is_clamped() {
        let light = Color::new(0.0, 0.0, 0.0, 0.0).expect("valid");
        let dark = Color::new(0.0, 0.0, 0.0, 1.0).expect("valid");
        let steps = [step(6, 0, dark), step(8, 0, light)];
        let color = frame_color(&steps, reading(7, 0, 1), Some(light)).expect("color");
        assert_eq!(color.alpha(), 0.0);
    }

    #[test]
    fn test_step_from_json() {
        let parsed = LightStep::from_json(&json!({
            "time": "{\"hours\":\"6\",\"minutes\":\"30\"}",
            "color": {"red": 10, "green": 20, "blue": 30, "alpha": "0.5"}
        }))
        .expect("valid");
        assert_eq!(parsed.time(), TimeOfDay::new(6, 30));
        assert_eq!(parsed.color().to_array(), [10.0, 20.0, 30.0, 0.5]);
    }

    #[test]
    fn test_step_from_json_rejects_bad_time() {
        let color = json!({"red": 0, "green": 0, "blue": 0, "alpha": 1});
        for time in [
            json!({"hours": 24, "minutes": 0}),
            json!({"hours": 6}),
            json!({"hours": 6.5, "minutes": 0}),
            json!("noon"),
        ] {
            let result = LightStep::from_json(&json!({"time": time, "color": color}));
            assert!(matches!(result, Err(GloamingError::InvalidLightStep(_))));
        }
        assert!(matches!(
            LightStep::from_json(&json!({"color": color})),
            Err(GloamingError::InvalidLightStep(_))
        ));
    }

    #[test]
    fn test_step_from_json_bad_color() {
        let result = LightStep::from_json(&json!({
            "time": {"hours": 6, "minutes": 0},
            "color": {"red": 300, "green": 0, "blue": 0, "alpha": 1}
        }));
        assert!(matches!(result, Err(GloamingError::InvalidColor { .. })));
    }

    #[test]
    fn test_step_from_json_rejects_wrong_typed_color() {
        for color in [json!("dusk"), json!(12), json!([0, 0, 0, 1]), json!(null)] {
            let result = LightStep::from_json(&json!({
                "time": {"hours": 6, "minutes": 0},
                "color": color.clone()
            }));
            assert!(
                matches!(result, Err(GloamingError::InvalidLightStep(_))),
                "color {color} gave {result:?}"
            );
        }

        let nested = LightStep::from_json(&json!({
            "time": {"hours": 6, "minutes": 0},
            "color": "{\"red\":10,\"green\":20,\"blue\":30,\"alpha\":0.5}"
        }))
        .expect("nested color document");
        assert_eq!(nested.color().red(), 10.0);
    }

    #[test]
    fn test_step_deserialize_validates_time() {
        let bad: Result<LightStep, _> = serde_json::from_str(
            r#"{"time":{"hours":25,"minutes":0},"color":{"red":0,"green":0,"blue":0,"alpha":1}}"#,
        );
        assert!(bad.is_err());
    }
}
