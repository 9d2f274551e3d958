//! Shared game state.
//!
//! A [`GameContext`] is built once per session and handed to every system
//! that needs the bus, the clock, switches, variables or the lighting cache.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use gloaming_common::GloamingResult;
use gloaming_gameplay::{Clock, ClockSave, EventBus, GameSwitches, GameVariables};
use gloaming_kernel::LightingManager;
use parking_lot::Mutex;
use tracing::info;

use crate::config::GloamingConfig;

/// Clock save file inside a session directory.
pub const CLOCK_SAVE_FILE: &str = "clock.sav";
/// Lighting save file inside a session directory.
pub const LIGHTING_SAVE_FILE: &str = "lighting.sav";

/// Everything the day/night systems share.
///
/// Clock handlers receive the clock as their publisher while the clock's lock
/// is held, so they must read it through that reference and never lock
/// [`GameContext::clock`] themselves.
pub struct GameContext {
    config: GloamingConfig,
    bus: Arc<EventBus>,
    switches: Arc<GameSwitches>,
    variables: Arc<GameVariables>,
    clock: Arc<Mutex<Clock>>,
    lighting: Arc<Mutex<LightingManager>>,
}

impl GameContext {
    /// Creates a new session: day 1, 00:00, clock stopped.
    pub fn new(config: GloamingConfig) -> GloamingResult<Self> {
        config.validate()?;
        let bus = Arc::new(EventBus::new());
        let variables = Arc::new(GameVariables::new());
        let clock = Clock::new(&config.clock, Arc::clone(&bus), Arc::clone(&variables))?;
        Self::assemble(config, bus, variables, clock)
    }

    /// Restores a session saved with [`GameContext::save_session`].
    ///
    /// Lighting is optional in the save; a session without it starts from the
    /// configured defaults.
    pub fn load_session(config: GloamingConfig, dir: &Path) -> GloamingResult<Self> {
        config.validate()?;
        let bus = Arc::new(EventBus::new());
        let variables = Arc::new(GameVariables::new());

        let save = ClockSave::load_from(&dir.join(CLOCK_SAVE_FILE))?;
        let clock = Clock::restore(&save, &config.clock, Arc::clone(&bus), Arc::clone(&variables))?;
        let context = Self::assemble(config, bus, variables, clock)?;

        let lighting_path = dir.join(LIGHTING_SAVE_FILE);
        if lighting_path.exists() {
            let bytes = fs::read(&lighting_path)?;
            context.lighting.lock().restore_bytes(&bytes)?;
        }
        info!("Loaded session from {}", dir.display());
        Ok(context)
    }

    fn assemble(
        config: GloamingConfig,
        bus: Arc<EventBus>,
        variables: Arc<GameVariables>,
        clock: Clock,
    ) -> GloamingResult<Self> {
        let lighting = LightingManager::new(&config.lighting)?;
        Ok(Self {
            switches: Arc::new(GameSwitches::new(Arc::clone(&bus))),
            config,
            bus,
            variables,
            clock: Arc::new(Mutex::new(clock)),
            lighting: Arc::new(Mutex::new(lighting)),
        })
    }

    /// Writes the clock and the customized map lighting to `dir`.
    pub fn save_session(&self, dir: &Path) -> GloamingResult<()> {
        fs::create_dir_all(dir)?;
        self.clock.lock().snapshot().save_to(&dir.join(CLOCK_SAVE_FILE))?;
        let bytes = self.lighting.lock().to_bytes()?;
        fs::write(dir.join(LIGHTING_SAVE_FILE), bytes)?;
        info!("Saved session to {}", dir.display());
        Ok(())
    }

    /// Configuration the session was built from.
    #[must_use]
    pub fn config(&self) -> &GloamingConfig {
        &self.config
    }

    /// The event bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Game switches.
    #[must_use]
    pub fn switches(&self) -> &Arc<GameSwitches> {
        &self.switches
    }

    /// Game variables.
    #[must_use]
    pub fn variables(&self) -> &Arc<GameVariables> {
        &self.variables
    }

    /// The in-game clock.
    #[must_use]
    pub fn clock(&self) -> &Arc<Mutex<Clock>> {
        &self.clock
    }

    /// The per-map lighting cache.
    #[must_use]
    pub fn lighting(&self) -> &Arc<Mutex<LightingManager>> {
        &self.lighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloaming_common::{GloamingError, MapId, VariableId};
    use gloaming_kernel::PlayerSight;
    use tempfile::TempDir;

    #[test]
    fn test_new_context() {
        let context = GameContext::new(GloamingConfig::default()).expect("valid config");
        let clock = context.clock().lock();
        assert_eq!(clock.days(), 1);
        assert_eq!(clock.hours(), 0);
        assert!(context.lighting().lock().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GloamingConfig::default();
        config.clock.display_span = 0;
        assert!(matches!(
            GameContext::new(config),
            Err(GloamingError::InvalidDisplaySpan(0))
        ));
    }

    #[test]
    fn test_session_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = GloamingConfig::default();
        config.clock.hours_variable = VariableId::new(2);

        let context = GameContext::new(config.clone()).expect("valid config");
        context.clock().lock().set_hours(18);
        context.clock().lock().add_days(2);
        context
            .lighting()
            .lock()
            .get_or_load(MapId::new(4))
            .set_player_sight(Some(PlayerSight::new(2.0, 0.5).expect("valid")));
        context.save_session(temp_dir.path()).expect("saved");

        let restored = GameContext::load_session(config, temp_dir.path()).expect("loaded");
        {
            let clock = restored.clock().lock();
            assert_eq!(clock.hours(), 18);
            assert_eq!(clock.days(), 3);
        }
        assert_eq!(restored.variables().value(VariableId::new(2)), 18);
        assert_eq!(
            restored
                .lighting()
                .lock()
                .get(MapId::new(4))
                .and_then(|l| l.player_sight())
                .map(|s| s.radius()),
            Some(2.0)
        );
    }

    #[test]
    fn test_missing_session_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = GameContext::load_session(GloamingConfig::default(), temp_dir.path());
        assert!(matches!(result, Err(GloamingError::Io(_))));
    }
}
