//! Event bus for inter-system communication.
//!
//! Producers publish named events together with themselves as the publisher;
//! consumers subscribe by event name and publisher kind without knowing the
//! producer's concrete type. Switch flips are routed through a second registry
//! keyed by switch id.
//!
//! Dispatch is synchronous and follows registration order. Matching handlers are
//! collected before any of them runs, so a handler may publish, subscribe or
//! unsubscribe; the registry change is seen by later publishes only.

use std::any::Any;
use std::sync::Arc;

use gloaming_common::SwitchId;
use parking_lot::RwLock;
use tracing::{debug, trace};

/// Switch event fired on any value flip.
pub const SWITCH_CHANGE: &str = "change";
/// Switch event fired when a switch becomes `true`.
pub const SWITCH_ON: &str = "on";
/// Switch event fired when a switch becomes `false`.
pub const SWITCH_OFF: &str = "off";

/// Category of a publisher, used to route published events.
///
/// Kinds form a tree rooted at [`PublisherKind::Any`]. A subscription made for
/// a kind also receives events published by any of its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublisherKind {
    /// Root kind; matches every publisher.
    Any,
    /// The active game map.
    Map,
    /// Any spriteset.
    Spriteset,
    /// The spriteset of the map scene.
    MapSpriteset,
    /// The spriteset of the battle scene.
    BattleSpriteset,
    /// The in-game clock.
    Clock,
    /// The game switch store.
    Switches,
}

impl PublisherKind {
    /// The direct parent of this kind.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Any => None,
            Self::MapSpriteset | Self::BattleSpriteset => Some(Self::Spriteset),
            Self::Map | Self::Spriteset | Self::Clock | Self::Switches => Some(Self::Any),
        }
    }

    /// Checks whether this kind equals `ancestor` or descends from it.
    #[must_use]
    pub fn is_a(self, ancestor: Self) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

/// Something that publishes events on the bus.
pub trait Publisher: Any {
    /// The kind used to route this publisher's events.
    fn kind(&self) -> PublisherKind;

    /// Access to the concrete type for handlers that need it.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Publisher + '_ {
    /// Downcasts the publisher to a concrete type.
    #[must_use]
    pub fn downcast_ref<T: Publisher>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Receives published events.
///
/// Closures taking `&dyn Publisher` implement this trait, and any struct can
/// implement it to receive events as itself.
pub trait EventHandler: Send + Sync {
    /// Handles an event.
    fn handle(&self, publisher: &dyn Publisher);
}

impl<F> EventHandler for F
where
    F: Fn(&dyn Publisher) + Send + Sync,
{
    fn handle(&self, publisher: &dyn Publisher) {
        self(publisher);
    }
}

/// Receives switch events as `(switch, old value, new value)`.
pub trait SwitchHandler: Send + Sync {
    /// Handles a switch event.
    fn handle(&self, switch_id: SwitchId, old: bool, new: bool);
}

impl<F> SwitchHandler for F
where
    F: Fn(SwitchId, bool, bool) + Send + Sync,
{
    fn handle(&self, switch_id: SwitchId, old: bool, new: bool) {
        self(switch_id, old, new);
    }
}

/// Shared handle to an event handler. Unsubscribing compares handle identity.
pub type Handler = Arc<dyn EventHandler>;

/// Shared handle to a switch handler.
pub type SwitchHandlerRef = Arc<dyn SwitchHandler>;

/// Wraps a closure into a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&dyn Publisher) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure into a [`SwitchHandlerRef`].
pub fn switch_handler<F>(f: F) -> SwitchHandlerRef
where
    F: Fn(SwitchId, bool, bool) + Send + Sync + 'static,
{
    Arc::new(f)
}

struct Subscription {
    event_name: String,
    kind: PublisherKind,
    handler: Handler,
}

struct SwitchSubscription {
    event_name: String,
    switch_id: SwitchId,
    handler: SwitchHandlerRef,
}

/// Publish/subscribe registry.
#[derive(Default)]
pub struct EventBus {
    global: RwLock<Vec<Subscription>>,
    switches: RwLock<Vec<SwitchSubscription>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscription_count())
            .field("switch_subscriptions", &self.switch_subscription_count())
            .finish()
    }
}

impl EventBus {
    /// Creates an empty event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `event_name` published by `kind` or its descendants.
    ///
    /// Registering the same handler twice makes it fire twice.
    pub fn subscribe(&self, event_name: impl Into<String>, kind: PublisherKind, handler: Handler) {
        let event_name = event_name.into();
        debug!(event = %event_name, ?kind, "subscribe");
        self.global.write().push(Subscription {
            event_name,
            kind,
            handler,
        });
    }

    /// Removes every subscription of `handler` to `event_name` for `kind`.
    ///
    /// Returns the number of removed subscriptions.
    pub fn unsubscribe(&self, event_name: &str, kind: PublisherKind, handler: &Handler) -> usize {
        let mut global = self.global.write();
        let before = global.len();
        global.retain(|s| {
            !(s.event_name == event_name && s.kind == kind && Arc::ptr_eq(&s.handler, handler))
        });
        let removed = before - global.len();
        debug!(event = event_name, ?kind, removed, "unsubscribe");
        removed
    }

    /// Registers a handler for `event_name` on one switch.
    pub fn subscribe_to_switch(
        &self,
        event_name: impl Into<String>,
        switch_id: SwitchId,
        handler: SwitchHandlerRef,
    ) {
        let event_name = event_name.into();
        debug!(event = %event_name, %switch_id, "subscribe to switch");
        self.switches.write().push(SwitchSubscription {
            event_name,
            switch_id,
            handler,
        });
    }

    /// Removes every subscription of `handler` to `event_name` on `switch_id`.
    ///
    /// Returns the number of removed subscriptions.
    pub fn unsubscribe_from_switch(
        &self,
        event_name: &str,
        switch_id: SwitchId,
        handler: &SwitchHandlerRef,
    ) -> usize {
        let mut switches = self.switches.write();
        let before = switches.len();
        switches.retain(|s| {
            !(s.event_name == event_name
                && s.switch_id == switch_id
                && Arc::ptr_eq(&s.handler, handler))
        });
        before - switches.len()
    }

    /// Publishes an event to every matching subscription.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event_name: &str, publisher: &dyn Publisher) -> usize {
        let kind = publisher.kind();
        let matching: Vec<Handler> = self
            .global
            .read()
            .iter()
            .filter(|s| s.event_name == event_name && kind.is_a(s.kind))
            .map(|s| Arc::clone(&s.handler))
            .collect();

        trace!(event = event_name, ?kind, handlers = matching.len(), "publish");
        for handler in &matching {
            handler.handle(publisher);
        }
        matching.len()
    }

    /// Publishes a switch event to the subscriptions of `switch_id`.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish_switch_event(
        &self,
        event_name: &str,
        switch_id: SwitchId,
        old: bool,
        new: bool,
    ) -> usize {
        let matching: Vec<SwitchHandlerRef> = self
            .switches
            .read()
            .iter()
            .filter(|s| s.event_name == event_name && s.switch_id == switch_id)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        trace!(event = event_name, %switch_id, old, new, "publish switch event");
        for handler in &matching {
            handler.handle(switch_id, old, new);
        }
        matching.len()
    }

    /// Publishes the events for a switch going from `old` to `new`:
    /// `change`, then `on` or `off`. Nothing is published when the value did
    /// not change.
    pub fn publish_switch_change(&self, switch_id: SwitchId, old: bool, new: bool) {
        if old == new {
            return;
        }
        self.publish_switch_event(SWITCH_CHANGE, switch_id, old, new);
        let edge = if new { SWITCH_ON } else { SWITCH_OFF };
        self.publish_switch_event(edge, switch_id, old, new);
    }

    /// Number of global subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.global.read().len()
    }

    /// Number of switch subscriptions.
    #[must_use]
    pub fn switch_subscription_count(&self) -> usize {
        self.switches.read().len()
    }
}
