//! # Gloaming Gameplay
//!
//! Reactive game-state core for Gloaming.
//!
//! This crate provides:
//! - Event bus for lifecycle, clock and switch events
//! - In-game clock driven by frame ticks
//! - Game switches and variables
//! - Clock settings and persistence

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod events;
pub mod save;
pub mod settings;
pub mod switches;
pub mod time;
pub mod variables;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::events::*;
    pub use crate::save::*;
    pub use crate::settings::*;
    pub use crate::switches::*;
    pub use crate::time::*;
    pub use crate::variables::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use gloaming_common::{SwitchId, VariableId};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_switch_flip_reaches_bus() {
        let bus = Arc::new(EventBus::new());
        let switches = GameSwitches::new(Arc::clone(&bus));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        bus.subscribe_to_switch(
            SWITCH_ON,
            SwitchId::new(4),
            switch_handler(move |id, _, new| sink.lock().push((id, new))),
        );

        switches.set_value(SwitchId::new(4), true);
        switches.set_value(SwitchId::new(4), true);

        assert_eq!(*seen.lock(), vec![(SwitchId::new(4), true)]);
    }

    #[test]
    fn test_clock_hour_handler_can_flip_switch() {
        let bus = Arc::new(EventBus::new());
        let switches = Arc::new(GameSwitches::new(Arc::clone(&bus)));
        let variables = Arc::new(GameVariables::new());
        let settings = ClockSettings {
            hours_variable: VariableId::new(2),
            ..ClockSettings::default()
        };
        let mut clock =
            Clock::new(&settings, Arc::clone(&bus), Arc::clone(&variables)).expect("clock");

        let night = SwitchId::new(9);
        let store = Arc::clone(&switches);
        bus.subscribe(
            ClockEvent::HoursTick.name(),
            PublisherKind::Clock,
            handler(move |publisher| {
                if let Some(clock) = publisher.downcast_ref::<Clock>() {
                    store.set_value(night, clock.hours() >= 20);
                }
            }),
        );

        clock.set_hours(21);
        assert!(switches.value(night));
        assert_eq!(variables.value(VariableId::new(2)), 21);

        clock.add_hours(4);
        assert!(!switches.value(night));
    }
}
