//! Pixel Plumber - a single-screen side-scrolling platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, input, physics, collisions, game state)
//! - `level`: Level definitions and validation
//! - `tuning`: Data-driven physics and scoring constants
//! - `hint`: Asynchronous oracle hint worker
//! - `session`: Fixed-rate driver gluing input, simulation and hints together
//! - `autopilot`: Demo input generator for headless runs
//! - `settings`: Runner configuration

pub mod autopilot;
pub mod hint;
pub mod level;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use level::{LevelDef, LevelError};
pub use session::Session;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (one step per display refresh)
    pub const SIM_HZ: u32 = 60;

    /// Full scrollable world width
    pub const WORLD_WIDTH: f32 = 5000.0;
    /// Visible viewport
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Default spawn point (top-left of the player box)
    pub const SPAWN_X: f32 = 50.0;
    pub const SPAWN_Y: f32 = 500.0;
}
