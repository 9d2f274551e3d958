//! Per-frame wiring of the clock and the lighting overlay.
//!
//! The runtime subscribes the day/night systems to the host lifecycle:
//!
//! - map `beforeUpdate` advances the clock one frame
//! - map `beforeSetup` releases the lighting of the map being left
//! - map spriteset `beforeCreateUpperLayer` creates a fresh overlay
//!
//! [`Runtime::frame`] then runs the map update before the spriteset update, so
//! the clock is always refreshed before the overlay is composed.

use std::sync::Arc;

use gloaming_common::{GloamingResult, MapId};
use gloaming_gameplay::{handler, Handler, PublisherKind};
use gloaming_kernel::{AreaSet, Color, LightingOverlay, MapView, OverlayFrame, OverlayInput};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::commands::Command;
use crate::context::GameContext;
use crate::hooks::{
    GameMap, MapHooks, Spriteset, SpritesetHooks, BEFORE_CREATE_UPPER_LAYER, BEFORE_SETUP,
    BEFORE_UPDATE,
};

/// Drives the day/night systems from the host's frame loop.
pub struct Runtime {
    context: Arc<GameContext>,
    map_hooks: MapHooks,
    spriteset_hooks: SpritesetHooks,
    overlay: Arc<Mutex<Option<LightingOverlay>>>,
    areas: AreaSet,
    subscriptions: Vec<(&'static str, PublisherKind, Handler)>,
}

impl Runtime {
    /// Subscribes the day/night systems to the lifecycle events.
    #[must_use]
    pub fn new(context: Arc<GameContext>) -> Self {
        let overlay = Arc::new(Mutex::new(None));
        let mut subscriptions: Vec<(&'static str, PublisherKind, Handler)> = Vec::new();

        let clock = Arc::clone(context.clock());
        subscriptions.push((
            BEFORE_UPDATE,
            PublisherKind::Map,
            handler(move |publisher| {
                if let Some(map) = publisher.downcast_ref::<GameMap>() {
                    clock.lock().refresh(map.is_scene_active());
                }
            }),
        ));

        let lighting = Arc::clone(context.lighting());
        subscriptions.push((
            BEFORE_SETUP,
            PublisherKind::Map,
            handler(move |publisher| {
                if let Some(map) = publisher.downcast_ref::<GameMap>() {
                    if map.map_id().is_valid() {
                        lighting.lock().release(map.map_id());
                    }
                }
            }),
        ));

        let mode = context.lighting().lock().frame_color_mode();
        let slot = Arc::clone(&overlay);
        subscriptions.push((
            BEFORE_CREATE_UPPER_LAYER,
            PublisherKind::MapSpriteset,
            handler(move |publisher| {
                if publisher.downcast_ref::<Spriteset>().is_some() {
                    *slot.lock() = Some(LightingOverlay::new(mode));
                }
            }),
        ));

        for (event, kind, handler) in &subscriptions {
            context.bus().subscribe(*event, *kind, Arc::clone(handler));
        }
        debug!(count = subscriptions.len(), "Runtime subscribed");

        Self {
            map_hooks: MapHooks::new(Arc::clone(context.bus())),
            spriteset_hooks: SpritesetHooks::for_map(Arc::clone(context.bus())),
            areas: AreaSet::empty(MapId::NULL),
            context,
            overlay,
            subscriptions,
        }
    }

    /// The session.
    #[must_use]
    pub fn context(&self) -> &Arc<GameContext> {
        &self.context
    }

    /// The active map.
    #[must_use]
    pub fn map_id(&self) -> MapId {
        self.map_hooks.map().map_id()
    }

    /// Areas of the active map.
    #[must_use]
    pub fn areas(&self) -> &AreaSet {
        &self.areas
    }

    /// Global color of the last composed frame.
    #[must_use]
    pub fn overlay_color(&self) -> Option<Color> {
        self.overlay.lock().as_ref().and_then(LightingOverlay::current_color)
    }

    /// Transfers to a map: setup, first refresh and a new map spriteset.
    pub fn enter_map(&mut self, map_id: MapId, areas: AreaSet) {
        self.map_hooks.wrap_setup(map_id, || ());
        self.areas = areas;
        self.map_hooks.wrap_refresh(|| ());
        self.spriteset_hooks.wrap_create_upper_layer(|| ());
    }

    /// Marks the map scene as on screen or covered by another scene.
    pub fn set_scene_active(&mut self, active: bool) {
        self.map_hooks.set_scene_active(active);
    }

    /// Runs one frame. Returns the overlay to draw, or `None` while the map
    /// scene is covered or before a spriteset exists.
    pub fn frame(&mut self, view: &dyn MapView) -> GloamingResult<Option<OverlayFrame>> {
        self.map_hooks.wrap_update(|| ());

        let Self {
            context,
            map_hooks,
            spriteset_hooks,
            overlay,
            areas,
            ..
        } = self;
        let map = map_hooks.map();
        spriteset_hooks.wrap_update(|| -> GloamingResult<Option<OverlayFrame>> {
            if !map.is_scene_active() {
                return Ok(None);
            }
            let mut slot = overlay.lock();
            let Some(overlay) = slot.as_mut() else {
                return Ok(None);
            };

            let reading = context.clock().lock().reading();
            let mut lighting = context.lighting().lock();
            let input = OverlayInput {
                lighting: lighting.get_or_load(map.map_id()),
                areas,
                reading,
                view,
                switches: context.switches().as_ref(),
            };
            let frame = overlay.compose(&input)?;
            trace!(ops = frame.ops.len(), "Frame composed");
            Ok(Some(frame))
        })
    }

    /// Runs a command on the active map.
    pub fn execute(&mut self, command: &Command, view: &dyn MapView) -> GloamingResult<()> {
        command.apply(&self.context, self.map_id(), view)?;
        if command.jumps_time() {
            if let Some(overlay) = self.overlay.lock().as_mut() {
                overlay.reset();
            }
        }
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        for (event, kind, handler) in &self.subscriptions {
            self.context.bus().unsubscribe(event, *kind, handler);
        }
    }
}
