//! Error types for Gloaming.
//!
//! Every variant is raised at the point where an invalid value is constructed or
//! assigned. Nothing in the core catches these; they travel back to the host
//! frame loop with `?`.

use thiserror::Error;

use crate::version::HeaderError;

/// Top-level error type for Gloaming operations.
#[derive(Debug, Error)]
pub enum GloamingError {
    /// A color channel was outside its range or not a finite number.
    #[error("Invalid color: ({red}, {green}, {blue}, {alpha})")]
    InvalidColor {
        /// Red channel (0-255)
        red: f32,
        /// Green channel (0-255)
        green: f32,
        /// Blue channel (0-255)
        blue: f32,
        /// Alpha channel (0-1)
        alpha: f32,
    },

    /// A light shape other than `circle` or `rectangle`.
    #[error("Invalid shape: {0:?}")]
    InvalidShape(String),

    /// A light step with a malformed time or color.
    #[error("Invalid light step: {0}")]
    InvalidLightStep(String),

    /// Frames per minute must be at least 1.
    #[error("{0} is an invalid number of frames (should be greater than 0)")]
    InvalidFrames(i64),

    /// Display span must be within 1..=60.
    #[error("{0} is an invalid display span (should be between 1 and 60)")]
    InvalidDisplaySpan(i64),

    /// The value assigned as a map's global lighting is not a list of light steps.
    #[error("Invalid global lighting: {0}")]
    InvalidGlobalLighting(String),

    /// The value assigned as a map's light sources is not a list of light sources.
    #[error("Invalid light sources: {0}")]
    InvalidLightSources(String),

    /// The value assigned as a map's highlights is not a list of light sources.
    #[error("Invalid highlight: {0}")]
    InvalidHighlight(String),

    /// The value assigned as a map's player sight is not a player sight.
    #[error("Invalid player sight: {0}")]
    InvalidPlayerSight(String),

    /// A light source whose origin no longer resolves to anything on the map.
    #[error("The origin of light source {name:?} is null or undefined")]
    LightSourceNullOrUndefinedOrigin {
        /// Name of the light source
        name: String,
    },

    /// A command targeted a map event that does not exist.
    #[error("Unknown map event: {0}")]
    UnknownEvent(u32),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HeaderError> for GloamingError {
    fn from(err: HeaderError) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for Gloaming operations.
pub type GloamingResult<T> = Result<T, GloamingError>;
