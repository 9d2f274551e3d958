//! # Gloaming Common
//!
//! Common types and shared abstractions for Gloaming.
//!
//! This crate provides foundational types used across all Gloaming subsystems:
//! - ID types for switches, variables, maps, map events and areas
//! - Time-of-day values
//! - Tile and screen coordinates
//! - The error taxonomy
//! - Host-facing traits
//! - Save file headers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod host;
pub mod ids;
pub mod time;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::host::*;
    pub use crate::ids::*;
    pub use crate::time::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_to_screen_conversion() {
        let viewport = Viewport::new(2.0, 1.0, 48);
        let screen = TilePoint::new(5.0, 4.0).to_screen(viewport);

        assert_eq!(screen, ScreenPoint::new(168.0, 192.0));
    }

    #[test]
    fn test_tile_rect_to_screen() {
        let viewport = Viewport::new(1.0, 0.0, 48);
        let rect = viewport.tile_rect_to_screen(3.0, 2.0, 2.0, 1.0);

        assert_eq!(rect, ScreenRect::new(96.0, 96.0, 96.0, 48.0));
        assert!(rect.contains(ScreenPoint::new(100.0, 100.0)));
        assert!(!rect.contains(ScreenPoint::new(192.0, 100.0)));
    }
}
