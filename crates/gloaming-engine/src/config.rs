//! Engine configuration.
//!
//! Aggregates the clock, lighting and screen settings. Configuration is loaded
//! from and saved to a TOML file.

use gloaming_common::{GloamingError, GloamingResult, Viewport};
use gloaming_gameplay::ClockSettings;
use gloaming_kernel::LightingSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "gloaming.toml";

/// Screen geometry of the headless host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels
    pub height: u32,
    /// Tile size in pixels
    pub tile_size: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 816,
            height: 624,
            tile_size: 48,
        }
    }
}

impl ScreenSettings {
    /// Checks that every dimension is positive.
    pub fn validate(&self) -> GloamingResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GloamingError::Config(format!(
                "screen size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.tile_size == 0 {
            return Err(GloamingError::Config("tile size must be positive".to_string()));
        }
        Ok(())
    }

    /// Viewport at the top-left corner of the map.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(0.0, 0.0, self.tile_size)
    }

    /// Screen size in tiles.
    #[must_use]
    pub fn tiles(&self) -> (f32, f32) {
        let tile = self.tile_size.max(1) as f32;
        (self.width as f32 / tile, self.height as f32 / tile)
    }
}

/// Engine configuration parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GloamingConfig {
    /// Clock speed, display span and variable slots
    pub clock: ClockSettings,
    /// Default lighting of every map
    pub lighting: LightingSettings,
    /// Screen geometry
    pub screen: ScreenSettings,
}

impl GloamingConfig {
    /// Load configuration from the default file in the working directory.
    pub fn load() -> GloamingResult<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> GloamingResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| GloamingError::Config(format!("{}: {e}", path.display())))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> GloamingResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| GloamingError::Config(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Checks every section, failing on the first invalid value.
    pub fn validate(&self) -> GloamingResult<()> {
        self.clock.validate()?;
        self.lighting.validate()?;
        self.screen.validate()
    }
}
