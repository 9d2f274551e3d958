//! Clock settings.
//!
//! Loaded from the `[clock]` section of the engine configuration. None of these
//! values are persisted with a saved game; they are reapplied at startup.

use gloaming_common::{GloamingError, GloamingResult, VariableId};
use serde::{Deserialize, Serialize};

/// Default frames per in-game minute (5 seconds at 60 FPS).
pub const DEFAULT_FRAMES_PER_MINUTE: u32 = 300;
/// Default display span (every minute is shown).
pub const DEFAULT_DISPLAY_SPAN: u32 = 1;
/// Largest allowed display span.
pub const MAX_DISPLAY_SPAN: u32 = 60;

/// Clock configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSettings {
    /// Frames for one in-game minute.
    pub frames_per_minute: u32,
    /// Minute granularity of the displayed time (1-60).
    pub display_span: u32,
    /// Variable slot mirroring the minutes (0 = none).
    pub minutes_variable: VariableId,
    /// Variable slot mirroring the hours (0 = none).
    pub hours_variable: VariableId,
    /// Variable slot mirroring the days (0 = none).
    pub days_variable: VariableId,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            frames_per_minute: DEFAULT_FRAMES_PER_MINUTE,
            display_span: DEFAULT_DISPLAY_SPAN,
            minutes_variable: VariableId::NULL,
            hours_variable: VariableId::NULL,
            days_variable: VariableId::NULL,
        }
    }
}

impl ClockSettings {
    /// Checks the settings, failing on the first invalid value.
    pub fn validate(&self) -> GloamingResult<()> {
        if self.frames_per_minute < 1 {
            return Err(GloamingError::InvalidFrames(i64::from(self.frames_per_minute)));
        }
        if !(1..=MAX_DISPLAY_SPAN).contains(&self.display_span) {
            return Err(GloamingError::InvalidDisplaySpan(i64::from(self.display_span)));
        }
        Ok(())
    }

    /// Variable slots for minutes, hours and days.
    #[must_use]
    pub fn variables(&self) -> ClockVariables {
        ClockVariables {
            minutes: self.minutes_variable.non_null(),
            hours: self.hours_variable.non_null(),
            days: self.days_variable.non_null(),
        }
    }
}

/// Variable slots the clock writes its time into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockVariables {
    /// Slot for minutes.
    pub minutes: Option<VariableId>,
    /// Slot for hours.
    pub hours: Option<VariableId>,
    /// Slot for days.
    pub days: Option<VariableId>,
}
