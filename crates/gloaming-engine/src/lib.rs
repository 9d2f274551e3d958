//! # Gloaming Engine
//!
//! Host adapter layer for the Gloaming day/night systems.
//!
//! This crate ties together the gameplay and kernel crates:
//! - Session context shared by every system
//! - Lifecycle hooks publishing map and spriteset events
//! - Plugin commands for the clock and map lighting
//! - Per-frame runtime: clock refresh, then overlay composition
//! - TOML configuration
//! - A headless host and simulation for running without a renderer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod commands;
pub mod config;
pub mod context;
pub mod hooks;
pub mod host;
pub mod runtime;
pub mod simulation;


/// Prelude for convenient imports
pub mod prelude {
    pub use crate::commands::*;
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::hooks::*;
    pub use crate::host::*;
    pub use crate::runtime::*;
    pub use crate::simulation::*;
}

pub use prelude::*;
