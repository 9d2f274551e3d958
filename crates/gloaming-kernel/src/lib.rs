//! # Gloaming Kernel
//!
//! Time-of-day lighting for tile maps.
//!
//! This crate provides:
//! - Colors and global color ramps keyed by time of day
//! - Per-frame ramp interpolation, incremental or exact
//! - Light sources, highlights, player sight and player lights
//! - Named map areas used to clip circle lights
//! - Per-map lighting cache with defaults and persistence
//! - Overlay composition into a renderer-agnostic draw plan
//!
//! ## Host Boundary
//!
//! The kernel never talks to the game directly. It reads the clock through
//! [`gloaming_common::ClockReading`], switches through
//! [`gloaming_common::SwitchState`] and the map on screen through [`MapView`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod areas;
pub mod color;
mod json;
pub mod lighting;
pub mod map_lighting;
pub mod overlay;
pub mod sources;
pub mod view;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::areas::*;
    pub use crate::color::*;
    pub use crate::lighting::*;
    pub use crate::map_lighting::*;
    pub use crate::overlay::*;
    pub use crate::sources::*;
    pub use crate::view::*;
}

pub use prelude::*;
