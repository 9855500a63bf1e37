//! Game state and core simulation types
//!
//! A `GameState` is a value: the tick reads one and returns the next, and
//! async hint completions produce a new value with only the hint replaced.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    /// Active gameplay
    Playing,
    /// Hurt by an enemy or fell out of the world
    GameOver,
    /// Reached the flag
    Won,
    /// Frozen by the player, resumable
    Paused,
}

impl GameStatus {
    /// Terminal statuses need a full restart to leave
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Won)
    }
}

/// Things that happened during a tick, for the driver to log or act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { id: String, points: u64 },
    EnemyStomped { id: String, points: u64 },
    PlayerHurt { by: String },
    /// Bumped a bonus block from below
    BonusBumped { id: String },
    /// Ask the oracle for advice at this score
    HintRequested { score: u64 },
    GoalReached,
    FellOutOfWorld,
}

/// Complete game state for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// The player, never part of `entities`
    pub player: Entity,
    /// Everything else (platforms, coins, enemies, bonus blocks, goal)
    pub entities: Vec<Entity>,
    pub score: u64,
    pub status: GameStatus,
    /// Horizontal scroll offset
    pub camera_x: f32,
    /// Latest oracle text, cosmetic only
    pub hint: String,
    /// Scrollable world width
    pub world_width: f32,
    /// Ticks simulated while playing
    pub time_ticks: u64,
}

impl GameState {
    /// Fresh state with the player at `spawn`
    pub fn new(
        spawn: Vec2,
        entities: Vec<Entity>,
        world_width: f32,
        hint: impl Into<String>,
    ) -> Self {
        let player = Entity::new(
            "player",
            EntityKind::Player,
            spawn,
            Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        );
        let mut state = Self {
            player,
            entities,
            score: 0,
            status: GameStatus::Playing,
            camera_x: 0.0,
            hint: hint.into(),
            world_width,
            time_ticks: 0,
        };
        state.camera_x = state.camera_for(state.player.pos.x);
        state
    }

    /// Camera offset that centers `player_x`, clamped to the world
    pub fn camera_for(&self, player_x: f32) -> f32 {
        let max_scroll = (self.world_width - SCREEN_WIDTH).max(0.0);
        (player_x - SCREEN_WIDTH / 2.0).min(max_scroll).max(0.0)
    }

    /// Copy of this state with the hint replaced
    pub fn with_hint(&self, hint: impl Into<String>) -> Self {
        Self {
            hint: hint.into(),
            ..self.clone()
        }
    }

    /// Copy of this state with a different status
    pub fn with_status(&self, status: GameStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Count live entities of a kind
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    pub fn find(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// One-line HUD: zero-padded score, end banner, oracle text
    pub fn hud_line(&self) -> String {
        let banner = match self.status {
            GameStatus::Playing => "",
            GameStatus::Paused => " | PAUSED",
            GameStatus::GameOver => " | GAME OVER",
            GameStatus::Won => " | STAGE CLEAR!",
        };
        if self.hint.is_empty() {
            format!("SCORE {:06}{}", self.score, banner)
        } else {
            format!("SCORE {:06}{} | ORACLE SAYS: \"{}\"", self.score, banner, self.hint)
        }
    }
}
