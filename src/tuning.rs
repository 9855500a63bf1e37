//! Data-driven game balance
//!
//! All gameplay constants live here so they can be overridden from the
//! settings file. Defaults reproduce the classic feel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("tuning value {field} must be finite")]
    NonFinite { field: &'static str },
    #[error("friction must be in [0, 1), got {0}")]
    Friction(f32),
    #[error("gravity must be positive, got {0}")]
    Gravity(f32),
    #[error("stomp_bounce_divisor must be positive, got {0}")]
    StompBounceDivisor(f32),
    #[error("stomp_tolerance must not be negative, got {0}")]
    StompTolerance(f32),
}

/// Physics and scoring knobs consumed by the simulation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration added to vy every tick
    pub gravity: f32,
    /// Vertical velocity applied on jump (negative = up)
    pub jump_impulse: f32,
    /// Horizontal acceleration per tick while a direction is held
    pub move_accel: f32,
    /// Horizontal velocity multiplier applied every tick (< 1)
    pub friction: f32,
    /// Points per coin
    pub coin_points: u64,
    /// Points per stomped enemy
    pub stomp_points: u64,
    /// How far below an enemy's top the player's feet may start and still stomp
    pub stomp_tolerance: f32,
    /// Jump impulse divisor for the pop after a stomp
    pub stomp_bounce_divisor: f32,
    /// Downward velocity after bumping a bonus block from below
    pub bonus_bounce: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            jump_impulse: -16.0,
            move_accel: 1.0,
            friction: 0.85,
            coin_points: 100,
            stomp_points: 500,
            stomp_tolerance: 10.0,
            stomp_bounce_divisor: 1.5,
            bonus_bounce: 2.0,
        }
    }
}

impl Tuning {
    /// Reject values the step can't run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let fields = [
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("move_accel", self.move_accel),
            ("friction", self.friction),
            ("stomp_tolerance", self.stomp_tolerance),
            ("stomp_bounce_divisor", self.stomp_bounce_divisor),
            ("bonus_bounce", self.bonus_bounce),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuningError::NonFinite { field });
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(TuningError::Friction(self.friction));
        }
        if self.gravity <= 0.0 {
            return Err(TuningError::Gravity(self.gravity));
        }
        if self.stomp_bounce_divisor <= 0.0 {
            return Err(TuningError::StompBounceDivisor(self.stomp_bounce_divisor));
        }
        if self.stomp_tolerance < 0.0 {
            return Err(TuningError::StompTolerance(self.stomp_tolerance));
        }
        Ok(())
    }

    /// Upward pop applied after a successful stomp
    #[inline]
    pub fn stomp_bounce(&self) -> f32 {
        self.jump_impulse / self.stomp_bounce_divisor
    }

    /// Terminal horizontal speed reached when holding a direction forever
    pub fn max_run_speed(&self) -> f32 {
        self.move_accel * self.friction / (1.0 - self.friction)
    }
}
