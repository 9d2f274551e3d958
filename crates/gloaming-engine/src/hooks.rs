//! Lifecycle hooks.
//!
//! The host calls these adapters around its own map and spriteset work. Each
//! `wrap_*` method publishes a `before*` event, runs the host closure, then
//! publishes the matching `after*` event, with the map or spriteset as
//! publisher.

use std::any::Any;
use std::sync::Arc;

use gloaming_common::MapId;
use gloaming_gameplay::{EventBus, Publisher, PublisherKind};
use tracing::debug;

/// Published before a map is set up.
pub const BEFORE_SETUP: &str = "beforeSetup";
/// Published after a map is set up.
pub const AFTER_SETUP: &str = "afterSetup";
/// Published before a map refresh.
pub const BEFORE_REFRESH: &str = "beforeRefresh";
/// Published after a map refresh.
pub const AFTER_REFRESH: &str = "afterRefresh";
/// Published before the first refresh of a map.
pub const BEFORE_FIRST_REFRESH: &str = "beforeFirstRefresh";
/// Published after the first refresh of a map.
pub const AFTER_FIRST_REFRESH: &str = "afterFirstRefresh";
/// Published before a map or spriteset update.
pub const BEFORE_UPDATE: &str = "beforeUpdate";
/// Published after a map or spriteset update.
pub const AFTER_UPDATE: &str = "afterUpdate";
/// Published before a spriteset creates its upper layer.
pub const BEFORE_CREATE_UPPER_LAYER: &str = "beforeCreateUpperLayer";
/// Published after a spriteset creates its upper layer.
pub const AFTER_CREATE_UPPER_LAYER: &str = "afterCreateUpperLayer";

/// The active map as seen by event handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMap {
    map_id: MapId,
    scene_active: bool,
    had_refresh: bool,
}

impl GameMap {
    /// Id of the map.
    #[must_use]
    pub const fn map_id(&self) -> MapId {
        self.map_id
    }

    /// Whether the map scene is the one on screen (no menu or battle on top).
    #[must_use]
    pub const fn is_scene_active(&self) -> bool {
        self.scene_active
    }

    /// Whether the map has been refreshed since its setup.
    #[must_use]
    pub const fn had_refresh(&self) -> bool {
        self.had_refresh
    }
}

impl Publisher for GameMap {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Map
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Hooks around the host's map lifecycle.
pub struct MapHooks {
    bus: Arc<EventBus>,
    map: GameMap,
}

impl MapHooks {
    /// Hooks for a map that has not been set up yet.
    #[must_use]
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            map: GameMap {
                map_id: MapId::NULL,
                scene_active: true,
                had_refresh: false,
            },
        }
    }

    /// The map handed to handlers.
    #[must_use]
    pub const fn map(&self) -> &GameMap {
        &self.map
    }

    /// Marks the map scene as on screen or covered.
    pub fn set_scene_active(&mut self, active: bool) {
        self.map.scene_active = active;
    }

    /// Wraps the host's map setup. `beforeSetup` still carries the previous
    /// map; `afterSetup` carries the new one.
    pub fn wrap_setup<R>(&mut self, map_id: MapId, setup: impl FnOnce() -> R) -> R {
        self.bus.publish(BEFORE_SETUP, &self.map);
        debug!(from = %self.map.map_id, to = %map_id, "Map setup");
        self.map.map_id = map_id;
        self.map.had_refresh = false;
        let result = setup();
        self.bus.publish(AFTER_SETUP, &self.map);
        result
    }

    /// Wraps the host's map refresh. The first refresh after a setup is also
    /// bracketed by the first-refresh events.
    pub fn wrap_refresh<R>(&mut self, refresh: impl FnOnce() -> R) -> R {
        let first = !self.map.had_refresh;
        if first {
            self.bus.publish(BEFORE_FIRST_REFRESH, &self.map);
        }
        self.bus.publish(BEFORE_REFRESH, &self.map);
        let result = refresh();
        self.bus.publish(AFTER_REFRESH, &self.map);
        if first {
            self.bus.publish(AFTER_FIRST_REFRESH, &self.map);
            self.map.had_refresh = true;
        }
        result
    }

    /// Wraps the host's per-frame map update.
    pub fn wrap_update<R>(&self, update: impl FnOnce() -> R) -> R {
        self.bus.publish(BEFORE_UPDATE, &self.map);
        let result = update();
        self.bus.publish(AFTER_UPDATE, &self.map);
        result
    }
}

/// A spriteset as seen by event handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spriteset {
    kind: PublisherKind,
}

impl Spriteset {
    /// Whether this is the map spriteset.
    #[must_use]
    pub fn is_map(&self) -> bool {
        self.kind == PublisherKind::MapSpriteset
    }
}

impl Publisher for Spriteset {
    fn kind(&self) -> PublisherKind {
        self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Hooks around a host spriteset.
pub struct SpritesetHooks {
    bus: Arc<EventBus>,
    spriteset: Spriteset,
}

impl SpritesetHooks {
    /// Hooks for the map spriteset.
    #[must_use]
    pub fn for_map(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            spriteset: Spriteset {
                kind: PublisherKind::MapSpriteset,
            },
        }
    }

    /// Hooks for the battle spriteset.
    #[must_use]
    pub fn for_battle(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            spriteset: Spriteset {
                kind: PublisherKind::BattleSpriteset,
            },
        }
    }

    /// The spriteset handed to handlers.
    #[must_use]
    pub const fn spriteset(&self) -> &Spriteset {
        &self.spriteset
    }

    /// Wraps the creation of the spriteset's upper layer.
    pub fn wrap_create_upper_layer<R>(&self, create: impl FnOnce() -> R) -> R {
        self.bus.publish(BEFORE_CREATE_UPPER_LAYER, &self.spriteset);
        let result = create();
        self.bus.publish(AFTER_CREATE_UPPER_LAYER, &self.spriteset);
        result
    }

    /// Wraps the spriteset's per-frame update.
    pub fn wrap_update<R>(&self, update: impl FnOnce() -> R) -> R {
        self.bus.publish(BEFORE_UPDATE, &self.spriteset);
        let result = update();
        self.bus.publish(AFTER_UPDATE, &self.spriteset);
        result
    }
}
