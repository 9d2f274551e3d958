//! In-game clock.
//!
//! This module provides game time management:
//! - Minutes, hours and days advanced from frame ticks
//! - Relative and absolute time edits with carry and borrow
//! - Pause handling that tells user pauses from scene pauses
//! - Tick events published on the event bus
//! - Mirroring of the time into game variables
//!
//! Time is kept as raw hours/minutes/days. The displayed minute is rounded down
//! to the display span but the raw minute keeps full precision.

use std::any::Any;
use std::sync::Arc;

use gloaming_common::{
    ClockReading, GloamingError, GloamingResult, TimeOfDay, HOURS_PER_DAY, MINUTES_PER_HOUR,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::{EventBus, Publisher, PublisherKind};
use crate::save::ClockSave;
use crate::settings::{ClockSettings, ClockVariables, MAX_DISPLAY_SPAN};
use crate::variables::GameVariables;

/// Run state of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClockState {
    /// Never started since the game began.
    #[default]
    Stopped,
    /// Paused by a command. Survives scene changes.
    PausedByUser,
    /// Advancing.
    Running,
    /// Paused because the map scene is not active. Resumes on return.
    PausedByScene,
}

impl ClockState {
    /// Check if time is frozen.
    #[must_use]
    pub const fn is_paused(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Events the clock publishes, with itself as the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockEvent {
    /// Resumed after the first start.
    Started,
    /// Paused, by a command or by a scene change.
    Paused,
    /// Resumed for the first time.
    Resumed,
    /// Minute changed to a multiple of the display span.
    MinutesTick,
    /// Minute changed.
    RealMinutesTick,
    /// Hour changed.
    HoursTick,
    /// Day changed.
    DaysTick,
}

impl ClockEvent {
    /// All clock events.
    pub const ALL: [Self; 7] = [
        Self::Started,
        Self::Paused,
        Self::Resumed,
        Self::MinutesTick,
        Self::RealMinutesTick,
        Self::HoursTick,
        Self::DaysTick,
    ];

    /// Event name on the bus.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Resumed => "resumed",
            Self::MinutesTick => "minutesTick",
            Self::RealMinutesTick => "realMinutesTick",
            Self::HoursTick => "hoursTick",
            Self::DaysTick => "daysTick",
        }
    }
}

/// The in-game clock.
///
/// Handlers receiving clock events get the clock itself as publisher; they must
/// read it through that reference rather than through whatever lock owns it.
#[derive(Debug)]
pub struct Clock {
    hours: i32,
    minutes: i32,
    days: i64,
    frame: u32,
    frames_per_minute: u32,
    display_span: u32,
    state: ClockState,
    started: bool,
    variables_ids: ClockVariables,
    bus: Arc<EventBus>,
    variables: Arc<GameVariables>,
}

impl Publisher for Clock {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Clock
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clock {
    /// Creates a stopped clock at day 1, 00:00.
    pub fn new(
        settings: &ClockSettings,
        bus: Arc<EventBus>,
        variables: Arc<GameVariables>,
    ) -> GloamingResult<Self> {
        let mut clock = Self {
            hours: 0,
            minutes: 0,
            days: 1,
            frame: 0,
            frames_per_minute: 1,
            display_span: 1,
            state: ClockState::Stopped,
            started: false,
            variables_ids: ClockVariables::default(),
            bus,
            variables,
        };
        clock.configure(settings)?;
        Ok(clock)
    }

    /// Rebuilds a clock from saved data. Transient state comes from `settings`.
    pub fn restore(
        save: &ClockSave,
        settings: &ClockSettings,
        bus: Arc<EventBus>,
        variables: Arc<GameVariables>,
    ) -> GloamingResult<Self> {
        let mut clock = Self::new(settings, bus, variables)?;
        clock.hours = save.hours.rem_euclid(HOURS_PER_DAY);
        clock.minutes = save.minutes.rem_euclid(MINUTES_PER_HOUR);
        clock.days = save.days.max(1);
        clock.save_time();
        info!(
            day = clock.days,
            hours = clock.hours,
            minutes = clock.minutes,
            "Restored clock"
        );
        Ok(clock)
    }

    /// Applies frames per minute, display span and variable slots.
    pub fn configure(&mut self, settings: &ClockSettings) -> GloamingResult<()> {
        self.set_frames_per_minute(i64::from(settings.frames_per_minute))?;
        self.set_display_span(i64::from(settings.display_span))?;
        self.set_variables_ids(settings.variables());
        Ok(())
    }

    /// Persistable part of the clock.
    #[must_use]
    pub fn snapshot(&self) -> ClockSave {
        ClockSave::new(self.hours, self.minutes, self.days)
    }

    /// Get the hours (0-23).
    #[must_use]
    pub fn hours(&self) -> u32 {
        self.hours as u32
    }

    /// Get the displayed minutes, rounded down to the display span.
    #[must_use]
    pub fn minutes(&self) -> u32 {
        let span = self.display_span as i32;
        ((self.minutes / span) * span) as u32
    }

    /// Get the raw minutes (0-59).
    #[must_use]
    pub fn real_minutes(&self) -> u32 {
        self.minutes as u32
    }

    /// Get the day count (starts at 1).
    #[must_use]
    pub fn days(&self) -> i64 {
        self.days
    }

    /// Get the displayed time of day.
    #[must_use]
    pub fn time(&self) -> TimeOfDay {
        TimeOfDay::new(self.hours(), self.minutes())
    }

    /// Get the time of day with raw minutes.
    #[must_use]
    pub fn real_time(&self) -> TimeOfDay {
        TimeOfDay::new(self.hours(), self.real_minutes())
    }

    /// Get the frames per in-game minute.
    #[must_use]
    pub fn frames_per_minute(&self) -> u32 {
        self.frames_per_minute
    }

    /// Get the display span.
    #[must_use]
    pub fn display_span(&self) -> u32 {
        self.display_span
    }

    /// Get the frames elapsed in the current minute.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Get the run state.
    #[must_use]
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Check if the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Snapshot handed to the lighting engine.
    #[must_use]
    pub fn reading(&self) -> ClockReading {
        ClockReading {
            real_time: self.real_time(),
            frame: self.frame,
            frames_per_minute: self.frames_per_minute,
        }
    }

    /// Clock text shown on the map, e.g. `Day 3 08:15`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Day {} {:02}:{:02}", self.days, self.hours(), self.minutes())
    }

    /// Set the frames per in-game minute.
    pub fn set_frames_per_minute(&mut self, frames: i64) -> GloamingResult<()> {
        if frames < 1 {
            return Err(GloamingError::InvalidFrames(frames));
        }
        self.frames_per_minute =
            u32::try_from(frames).map_err(|_| GloamingError::InvalidFrames(frames))?;
        Ok(())
    }

    /// Set the display span (1-60 minutes).
    pub fn set_display_span(&mut self, span: i64) -> GloamingResult<()> {
        if !(1..=i64::from(MAX_DISPLAY_SPAN)).contains(&span) {
            return Err(GloamingError::InvalidDisplaySpan(span));
        }
        self.display_span = span as u32;
        Ok(())
    }

    /// Set the variable slots mirroring the time. The current time is written
    /// into the new slots right away.
    pub fn set_variables_ids(&mut self, variables_ids: ClockVariables) {
        self.variables_ids = variables_ids;
        self.save_time();
    }

    /// Advance one frame.
    ///
    /// `on_map` tells whether the map scene is the active one. Leaving the map
    /// pauses a running clock; coming back resumes it unless a command paused it.
    pub fn refresh(&mut self, on_map: bool) {
        if !on_map && self.state == ClockState::Running {
            self.pause(false);
        } else if on_map && self.state == ClockState::PausedByScene {
            self.resume();
        }

        if self.state.is_paused() {
            return;
        }

        self.frame += 1;
        if self.frame >= self.frames_per_minute {
            self.frame = 0;
            self.add_minutes(1);
        }
    }

    /// Pause the clock.
    pub fn pause(&mut self, by_user: bool) {
        self.state = if by_user {
            ClockState::PausedByUser
        } else {
            ClockState::PausedByScene
        };
        info!(by_user, "Clock paused");
        self.emit(ClockEvent::Paused);
    }

    /// Start or resume the clock.
    ///
    /// The first resume of a session publishes `resumed`, later ones `started`.
    pub fn resume(&mut self) {
        self.state = ClockState::Running;
        info!(label = %self.label(), "Clock running");
        if self.started {
            self.emit(ClockEvent::Started);
        } else {
            self.started = true;
            self.emit(ClockEvent::Resumed);
        }
    }

    /// Set the minutes. Values outside 0-59 carry into the hours.
    pub fn set_minutes(&mut self, minutes: i32) {
        self.minutes = 0;
        self.add_minutes(minutes);
    }

    /// Set the hours. Values outside 0-23 carry into the days.
    pub fn set_hours(&mut self, hours: i32) {
        self.hours = 0;
        self.add_hours(hours);
    }

    /// Set the days. Values below 1 reset the clock.
    pub fn set_days(&mut self, days: i32) {
        self.days = 0;
        self.add_days(days);
    }

    /// Add minutes. Negative values go back in time.
    pub fn add_minutes(&mut self, minutes: i32) {
        self.add_minutes_wide(i64::from(minutes));
    }

    /// Add hours. Negative values go back in time.
    pub fn add_hours(&mut self, hours: i32) {
        self.add_hours_wide(i64::from(hours));
    }

    /// Add days. Dropping below day 1 resets the clock to day 1, 00:00.
    pub fn add_days(&mut self, days: i32) {
        self.add_days_wide(i64::from(days));
    }

    /// Reset to day 1, 00:00.
    pub fn reset(&mut self) {
        self.hours = 0;
        self.minutes = 0;
        self.days = 1;
        self.frame = 0;
        info!("Clock reset to day 1");
        self.save_time();
        self.emit(ClockEvent::DaysTick);
        self.emit(ClockEvent::HoursTick);
        self.emit(ClockEvent::MinutesTick);
    }

    fn add_minutes_wide(&mut self, minutes: i64) {
        let total = i64::from(self.minutes) + minutes;
        let minutes_per_hour = i64::from(MINUTES_PER_HOUR);
        self.minutes = total.rem_euclid(minutes_per_hour) as i32;
        let carry = total.div_euclid(minutes_per_hour);
        if carry != 0 {
            self.add_hours_wide(carry);
        }

        self.save_minutes();
        self.emit(ClockEvent::RealMinutesTick);
        if self.minutes % self.display_span as i32 == 0 {
            self.emit(ClockEvent::MinutesTick);
        }
    }

    fn add_hours_wide(&mut self, hours: i64) {
        let total = i64::from(self.hours) + hours;
        let hours_per_day = i64::from(HOURS_PER_DAY);
        self.hours = total.rem_euclid(hours_per_day) as i32;
        let carry = total.div_euclid(hours_per_day);
        if carry != 0 {
            self.add_days_wide(carry);
        }

        self.emit(ClockEvent::HoursTick);
        self.save_hours();
    }

    fn add_days_wide(&mut self, days: i64) {
        self.days = self.days.saturating_add(days);
        if self.days < 1 {
            self.reset();
        } else {
            self.emit(ClockEvent::DaysTick);
            self.save_days();
        }
    }

    fn emit(&self, event: ClockEvent) {
        self.bus.publish(event.name(), self);
    }

    fn save_minutes(&self) {
        if let Some(id) = self.variables_ids.minutes {
            self.variables.set_value(id, i64::from(self.minutes));
        }
    }

    fn save_hours(&self) {
        if let Some(id) = self.variables_ids.hours {
            self.variables.set_value(id, i64::from(self.hours));
        }
    }

    fn save_days(&self) {
        if let Some(id) = self.variables_ids.days {
            debug!(day = self.days, "Mirroring day");
            self.variables.set_value(id, self.days);
        }
    }

    fn save_time(&self) {
        self.save_minutes();
        self.save_hours();
        self.save_days();
    }
}
