//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed tick per call, no wall clock
//! - Input arrives as an explicit snapshot, never ambient state
//! - Stable iteration order (entity list order)
//! - No rendering, network or platform dependencies

pub mod collision;
pub mod entity;
pub mod input;
pub mod state;
pub mod tick;

pub use collision::{CollisionPass, Fate, resolve};
pub use entity::{Entity, EntityKind};
pub use input::{Control, InputSnapshot};
pub use state::{GameEvent, GameState, GameStatus};
pub use tick::{StepOutcome, step};
