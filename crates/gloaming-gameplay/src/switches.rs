//! Boolean game switches.
//!
//! Setting a switch publishes `change` and then `on`/`off` to the subscribers of
//! that switch when the value actually flips. Global subscribers of kind
//! [`PublisherKind::Switches`] then receive `change` with the store as
//! publisher.

use std::any::Any;
use std::sync::Arc;

use ahash::AHashMap;
use gloaming_common::{SwitchId, SwitchState};
use parking_lot::RwLock;
use tracing::debug;

use crate::events::{EventBus, Publisher, PublisherKind, SWITCH_CHANGE};

/// Store of boolean game switches. Unset switches read as `false`.
#[derive(Debug)]
pub struct GameSwitches {
    values: RwLock<AHashMap<SwitchId, bool>>,
    bus: Arc<EventBus>,
}

impl GameSwitches {
    /// Creates a store that reports flips on `bus`.
    #[must_use]
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            values: RwLock::new(AHashMap::new()),
            bus,
        }
    }

    /// Current value of a switch.
    #[must_use]
    pub fn value(&self, id: SwitchId) -> bool {
        self.values.read().get(&id).copied().unwrap_or(false)
    }

    /// Sets a switch and publishes the switch events if its value changed.
    ///
    /// The null id is ignored.
    pub fn set_value(&self, id: SwitchId, value: bool) {
        if !id.is_valid() {
            return;
        }
        let old = self.values.write().insert(id, value).unwrap_or(false);
        if old == value {
            return;
        }
        debug!(switch = %id, old, new = value, "switch flipped");
        self.bus.publish_switch_change(id, old, value);
        self.bus.publish(SWITCH_CHANGE, self);
    }

    /// Flips a switch.
    pub fn toggle(&self, id: SwitchId) {
        self.set_value(id, !self.value(id));
    }
}

impl Publisher for GameSwitches {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Switches
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SwitchState for GameSwitches {
    fn value(&self, id: SwitchId) -> bool {
        GameSwitches::value(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{handler, switch_handler, SWITCH_OFF, SWITCH_ON};
    use parking_lot::Mutex;

    #[test]
    fn test_set_and_read() {
        let switches = GameSwitches::new(Arc::new(EventBus::new()));
        let id = SwitchId::new(3);
        assert!(!switches.value(id));

        switches.set_value(id, true);
        assert!(switches.value(id));

        switches.toggle(id);
        assert!(!switches.value(id));
    }

    #[test]
    fn test_flip_publishes_events() {
        let bus = Arc::new(EventBus::new());
        let switches = GameSwitches::new(Arc::clone(&bus));
        let id = SwitchId::new(9);
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in [SWITCH_CHANGE, SWITCH_ON, SWITCH_OFF] {
            let log = Arc::clone(&log);
            bus.subscribe_to_switch(name, id, switch_handler(move |_, _, _| log.lock().push(name)));
        }

        switches.set_value(id, false);
        assert!(log.lock().is_empty());

        switches.set_value(id, true);
        switches.set_value(id, true);
        switches.set_value(id, false);
        assert_eq!(
            *log.lock(),
            vec![SWITCH_CHANGE, SWITCH_ON, SWITCH_CHANGE, SWITCH_OFF]
        );
    }

    #[test]
    fn test_flip_notifies_switch_store_subscribers() {
        let bus = Arc::new(EventBus::new());
        let switches = GameSwitches::new(Arc::clone(&bus));
        let lamps = SwitchId::new(4);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        bus.subscribe(
            SWITCH_CHANGE,
            PublisherKind::Switches,
            handler(move |publisher| {
                if let Some(store) = publisher.downcast_ref::<GameSwitches>() {
                    log.lock().push(store.value(lamps));
                }
            }),
        );
        let map_log = Arc::clone(&seen);
        bus.subscribe(
            SWITCH_CHANGE,
            PublisherKind::Map,
            handler(move |_| map_log.lock().push(false)),
        );

        switches.set_value(lamps, true);
        switches.set_value(lamps, true);
        switches.toggle(lamps);
        assert_eq!(*seen.lock(), vec![true, false]);
    }
}
