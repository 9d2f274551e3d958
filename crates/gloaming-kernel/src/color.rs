//! Overlay colors.
//!
//! Red, green and blue are in 0-255 and alpha in 0-1, all as `f32` so that
//! per-frame interpolation can move by fractions of a unit.

use std::fmt;

use gloaming_common::{GloamingError, GloamingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json;

/// Largest value of a color channel.
pub const CHANNEL_MAX: f32 = 255.0;

/// A validated RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "ColorRepr")]
pub struct Color {
    red: f32,
    green: f32,
    blue: f32,
    alpha: f32,
}

#[derive(Serialize, Deserialize)]
struct ColorRepr {
    red: f32,
    green: f32,
    blue: f32,
    alpha: f32,
}

impl TryFrom<ColorRepr> for Color {
    type Error = GloamingError;

    fn try_from(repr: ColorRepr) -> GloamingResult<Self> {
        Self::new(repr.red, repr.green, repr.blue, repr.alpha)
    }
}

impl From<Color> for ColorRepr {
    fn from(color: Color) -> Self {
        Self {
            red: color.red,
            green: color.green,
            blue: color.blue,
            alpha: color.alpha,
        }
    }
}

fn in_range(value: f32, max: f32) -> bool {
    value.is_finite() && (0.0..=max).contains(&value)
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
        alpha: 0.0,
    };

    /// Opaque black.
    pub const BLACK: Self = Self {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
        alpha: 1.0,
    };

    /// Opaque white.
    pub const WHITE: Self = Self {
        red: CHANNEL_MAX,
        green: CHANNEL_MAX,
        blue: CHANNEL_MAX,
        alpha: 1.0,
    };

    /// Creates a color, rejecting out-of-range or non-finite channels.
    pub fn new(red: f32, green: f32, blue: f32, alpha: f32) -> GloamingResult<Self> {
        if in_range(red, CHANNEL_MAX)
            && in_range(green, CHANNEL_MAX)
            && in_range(blue, CHANNEL_MAX)
            && in_range(alpha, 1.0)
        {
            Ok(Self {
                red,
                green,
                blue,
                alpha,
            })
        } else {
            Err(GloamingError::InvalidColor {
                red,
                green,
                blue,
                alpha,
            })
        }
    }

    /// Creates a color, clamping every channel into range. NaN becomes 0.
    #[must_use]
    pub fn clamped(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        let clamp = |value: f32, max: f32| {
            if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, max)
            }
        };
        Self {
            red: clamp(red, CHANNEL_MAX),
            green: clamp(green, CHANNEL_MAX),
            blue: clamp(blue, CHANNEL_MAX),
            alpha: clamp(alpha, 1.0),
        }
    }

    /// White with the given alpha, the color of placed light sources.
    pub fn white(alpha: f32) -> GloamingResult<Self> {
        Self::new(CHANNEL_MAX, CHANNEL_MAX, CHANNEL_MAX, alpha)
    }

    /// Black with the given alpha, the color of the player sight cut-out.
    pub fn black(alpha: f32) -> GloamingResult<Self> {
        Self::new(0.0, 0.0, 0.0, alpha)
    }

    /// Red channel (0-255).
    #[must_use]
    pub const fn red(&self) -> f32 {
        self.red
    }

    /// Green channel (0-255).
    #[must_use]
    pub const fn green(&self) -> f32 {
        self.green
    }

    /// Blue channel (0-255).
    #[must_use]
    pub const fn blue(&self) -> f32 {
        self.blue
    }

    /// Alpha channel (0-1).
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Channels as `[red, green, blue, alpha]`.
    #[must_use]
    pub const fn to_array(&self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Builds a color from `[red, green, blue, alpha]`.
    pub fn from_array(channels: [f32; 4]) -> GloamingResult<Self> {
        Self::new(channels[0], channels[1], channels[2], channels[3])
    }

    /// Parses `{red, green, blue, alpha}`, with numbers or numeric strings.
    ///
    /// The object itself may be a JSON document stored in a string.
    pub fn from_json(value: &Value) -> GloamingResult<Self> {
        let object = json::unwrap_nested(value);
        let channel = |key: &str| json::field_number(&object, key).map_or(f32::NAN, |v| v as f32);
        Self::new(
            channel("red"),
            channel("green"),
            channel("blue"),
            channel("alpha"),
        )
    }

    /// CSS `rgba(...)` string. Color channels are truncated to integers.
    ///
    /// `forced_alpha` replaces the alpha, e.g. `Some(0.0)` for the transparent
    /// end of a gradient.
    #[must_use]
    pub fn to_rgba(&self, forced_alpha: Option<f32>) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.red as u8,
            self.green as u8,
            self.blue as u8,
            forced_alpha.unwrap_or(self.alpha)
        )
    }

    /// CSS `rgb(...)` string. Channels are truncated to integers.
    #[must_use]
    pub fn to_rgb(&self) -> String {
        format!(
            "rgb({}, {}, {})",
            self.red as u8, self.green as u8, self.blue as u8
        )
    }

    /// Same color with another alpha, clamped to 0-1.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self::clamped(self.red, self.green, self.blue, alpha)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rgba(None))
    }
}
