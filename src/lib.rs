//! This crate contains the game logic for tilewalk, a terminal tile-map explorer.
//!
//! A character walks a grid of tiles. The main view follows it with a clamped camera and a
//! minimap remembers every tile the main view has ever shown. Sprites are read from disk in the
//! background; the world is only drawn once all of them have either loaded or failed.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

mod app;
mod assets;
mod camera;
mod config;
mod events;
mod file_loader;
mod logging;
mod map;
mod movement;
mod render;
mod session;
mod types;
mod ui;
mod visibility;

pub use app::GameLoop;
pub use config::Config;
pub use logging::init as init_logging;
