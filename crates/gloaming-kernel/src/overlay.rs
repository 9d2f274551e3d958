//! Lighting overlay composition.
//!
//! Each frame the overlay is filled with the global ramp color, then lights are
//! cut out of it and highlights tinted over it. The result is an
//! [`OverlayFrame`]: a draw plan handed to the host renderer, which owns the
//! actual canvas.
//!
//! ## Draw order
//!
//! 1. Fill with the global color
//! 2. Player sight (`DestinationOut`)
//! 3. Light sources (`DestinationOut`)
//! 4. Player lights (`DestinationOut`, then `HardLight`)
//! 5. Highlights (`HardLight`)

use gloaming_common::{ClockReading, GloamingResult, ScreenPoint, ScreenRect, SwitchState};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::areas::AreaSet;
use crate::color::Color;
use crate::lighting::FrameColorMode;
use crate::map_lighting::MapLighting;
use crate::sources::{LightSource, PlayerSight, Shape};
use crate::view::MapView;

/// Canvas compositing operation of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Erases the overlay where the shape is drawn, by the shape's alpha.
    DestinationOut,
    /// Tints the overlay.
    HardLight,
}

/// Radial gradient from the color at `inner_radius` to transparent at
/// `outer_radius`, filling a disc of `radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    /// Center on screen
    pub center: ScreenPoint,
    /// Radius where the fade starts
    pub inner_radius: f32,
    /// Radius where the color is fully transparent
    pub outer_radius: f32,
    /// Radius of the filled disc
    pub radius: f32,
}

impl RadialGradient {
    /// Gradient for a disc of `radius` pixels.
    #[must_use]
    pub fn for_radius(center: ScreenPoint, radius: f32) -> Self {
        Self {
            center,
            inner_radius: radius / 3.0,
            outer_radius: (radius - 1.0).max(0.0),
            radius,
        }
    }
}

/// Geometry of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawShape {
    /// Circle lights
    Gradient(RadialGradient),
    /// Rectangle lights, flat color
    Rect(ScreenRect),
}

/// One draw on the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOp {
    /// Name of the light drawn
    pub label: String,
    /// Geometry
    pub shape: DrawShape,
    /// Color at the center
    pub color: Color,
    /// Compositing
    pub blend: BlendMode,
    /// Union of clip rectangles; empty means unclipped
    pub clip: Vec<ScreenRect>,
}

/// Draw plan for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    /// Overlay width in pixels
    pub width: u32,
    /// Overlay height in pixels
    pub height: u32,
    /// Global color, `None` when the map has no ramp
    pub fill: Option<Color>,
    /// Draws in order
    pub ops: Vec<DrawOp>,
}

impl OverlayFrame {
    /// Draws using a given blend mode.
    pub fn ops_with(&self, blend: BlendMode) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.blend == blend)
    }
}

/// Everything the overlay reads for one frame.
#[derive(Clone, Copy)]
pub struct OverlayInput<'a> {
    /// Lighting of the active map
    pub lighting: &'a MapLighting,
    /// Areas of the active map
    pub areas: &'a AreaSet,
    /// Current clock state
    pub reading: ClockReading,
    /// The map on screen
    pub view: &'a dyn MapView,
    /// Switch values
    pub switches: &'a dyn SwitchState,
}

/// Per-frame overlay composer. Keeps the previous global color for
/// incremental interpolation.
#[derive(Debug, Clone, Default)]
pub struct LightingOverlay {
    mode: FrameColorMode,
    previous: Option<Color>,
}

impl LightingOverlay {
    /// Creates an overlay using the given interpolation mode.
    #[must_use]
    pub const fn new(mode: FrameColorMode) -> Self {
        Self {
            mode,
            previous: None,
        }
    }

    /// Global color of the last composed frame.
    #[must_use]
    pub const fn current_color(&self) -> Option<Color> {
        self.previous
    }

    /// Forgets the previous color. The next frame starts from the ramp's
    /// previous step, as needed after a map change or a clock jump.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Composes the overlay for the current frame.
    pub fn compose(&mut self, input: &OverlayInput<'_>) -> GloamingResult<OverlayFrame> {
        let lighting = input.lighting;
        let fill = self
            .mode
            .frame_color(lighting.global(), input.reading, self.previous);
        self.previous = fill;

        let (width, height) = input.view.screen_size();
        let mut frame = OverlayFrame {
            width,
            height,
            fill,
            ops: Vec::new(),
        };

        if let Some(sight) = lighting.player_sight() {
            frame.ops.push(sight_op(sight, input));
        }
        for light in lighting.light_sources() {
            push_light(&mut frame.ops, light, BlendMode::DestinationOut, input)?;
        }
        for player_light in lighting.player_lights() {
            push_light(
                &mut frame.ops,
                &player_light.light,
                BlendMode::DestinationOut,
                input,
            )?;
            push_light(
                &mut frame.ops,
                &player_light.highlight,
                BlendMode::HardLight,
                input,
            )?;
        }
        for highlight in lighting.highlights() {
            push_light(&mut frame.ops, highlight, BlendMode::HardLight, input)?;
        }

        trace!(
            map = %lighting.map_id(),
            fill = ?fill.map(|c| c.to_rgba(None)),
            ops = frame.ops.len(),
            "Overlay composed"
        );
        Ok(frame)
    }
}

fn sight_op(sight: PlayerSight, input: &OverlayInput<'_>) -> DrawOp {
    let viewport = input.view.viewport();
    let tile = viewport.tile_size as f32;
    let player = input.view.player_screen_position();
    let center = ScreenPoint::new(player.x.trunc(), (player.y - tile / 2.0).trunc());

    DrawOp {
        label: "player_sight".to_string(),
        shape: DrawShape::Gradient(RadialGradient::for_radius(center, sight.radius() * tile)),
        color: sight.color(),
        blend: BlendMode::DestinationOut,
        clip: input.areas.clip_rects(center.to_tile(viewport), viewport),
    }
}

fn push_light(
    ops: &mut Vec<DrawOp>,
    light: &LightSource,
    blend: BlendMode,
    input: &OverlayInput<'_>,
) -> GloamingResult<()> {
    if !light.is_on(input.switches) {
        return Ok(());
    }

    let viewport = input.view.viewport();
    let tile = viewport.tile_size as f32;
    let position = light.position(input.view)?;
    let width = light.width() * tile;
    let height = light.height() * tile;

    let (shape, clip) = match light.shape() {
        Shape::Circle => {
            let standing_on = ScreenPoint::new(position.x, position.y - tile / 2.0);
            (
                DrawShape::Gradient(RadialGradient::for_radius(position, width)),
                input.areas.clip_rects(standing_on.to_tile(viewport), viewport),
            )
        }
        Shape::Rectangle => (
            DrawShape::Rect(ScreenRect::new(
                position.x - width / 2.0,
                position.y - height / 2.0,
                width,
                height,
            )),
            Vec::new(),
        ),
    };

    ops.push(DrawOp {
        label: light.name().to_string(),
        shape,
        color: light.color(),
        blend,
        clip,
    });
    Ok(())
}
