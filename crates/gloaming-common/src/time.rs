//! Time-of-day values shared by the clock and the lighting keyframes.

use serde::{Deserialize, Serialize};

/// Minutes in a game hour.
pub const MINUTES_PER_HOUR: i32 = 60;
/// Hours in a game day.
pub const HOURS_PER_DAY: i32 = 24;
/// Minutes in a game day.
pub const MINUTES_PER_DAY: i32 = MINUTES_PER_HOUR * HOURS_PER_DAY;

/// An hour and minute of the day.
///
/// Ordering and equality follow [`TimeOfDay::to_minutes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TimeOfDay {
    hours: u8,
    minutes: u8,
}

impl TimeOfDay {
    /// Midnight (00:00).
    pub const MIDNIGHT: Self = Self {
        hours: 0,
        minutes: 0,
    };

    /// Creates a time, clamping hours to 0-23 and minutes to 0-59.
    #[must_use]
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self {
            hours: hours.min(23) as u8,
            minutes: minutes.min(59) as u8,
        }
    }

    /// Creates a time, rejecting out-of-range parts.
    #[must_use]
    pub fn try_new(hours: i64, minutes: i64) -> Option<Self> {
        if (0..i64::from(HOURS_PER_DAY)).contains(&hours)
            && (0..i64::from(MINUTES_PER_HOUR)).contains(&minutes)
        {
            Some(Self {
                hours: hours as u8,
                minutes: minutes as u8,
            })
        } else {
            None
        }
    }

    /// Builds the time of day reached `minutes` after midnight, wrapping around.
    #[must_use]
    pub fn from_minutes(minutes: i32) -> Self {
        let minutes = minutes.rem_euclid(MINUTES_PER_DAY);
        Self {
            hours: (minutes / MINUTES_PER_HOUR) as u8,
            minutes: (minutes % MINUTES_PER_HOUR) as u8,
        }
    }

    /// Hours part (0-23).
    #[must_use]
    pub const fn hours(self) -> u32 {
        self.hours as u32
    }

    /// Minutes part (0-59).
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.minutes as u32
    }

    /// Minutes since midnight, used for ordering.
    #[must_use]
    pub const fn to_minutes(self) -> i32 {
        self.hours as i32 * MINUTES_PER_HOUR + self.minutes as i32
    }
}

/// What the lighting engine needs to know about the clock on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    /// Current time with raw (not span-rounded) minutes.
    pub real_time: TimeOfDay,
    /// Frames elapsed inside the current minute.
    pub frame: u32,
    /// Frames in one in-game minute.
    pub frames_per_minute: u32,
}

impl ClockReading {
    /// Creates a reading at the first frame of `real_time`.
    #[must_use]
    pub const fn at(real_time: TimeOfDay, frames_per_minute: u32) -> Self {
        Self {
            real_time,
            frame: 0,
            frames_per_minute,
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}
