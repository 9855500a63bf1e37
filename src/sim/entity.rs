//! Entity records
//!
//! Every simulated object is an axis-aligned rectangle with a velocity and a
//! kind tag. Entities carry no behavior; the tick decides what happens to them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Closed set of entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Player,
    Enemy,
    Platform,
    Coin,
    /// "?" block that asks the oracle for a hint when bumped from below
    BonusBlock,
    Goal,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Enemy => "enemy",
            EntityKind::Platform => "platform",
            EntityKind::Coin => "coin",
            EntityKind::BonusBlock => "bonus-block",
            EntityKind::Goal => "goal",
        }
    }
}

/// A rectangle with velocity and a kind tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identity, unique within a level
    pub id: String,
    pub kind: EntityKind,
    /// Top-left corner (y grows downward)
    pub pos: Vec2,
    /// Width and height, always > 0
    pub size: Vec2,
    pub vel: Vec2,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id: id.into(),
            kind,
            pos,
            size,
            vel: Vec2::ZERO,
        }
    }

    /// Builder-style velocity (patrolling enemies)
    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict AABB overlap. Touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}
