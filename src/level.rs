//! Level definitions
//!
//! A level is a flat list of entity descriptors plus a goal and a spawn point.
//! Descriptors are plain serde records so levels can live in JSON files.
//! Everything is validated up front; degenerate geometry never reaches the tick.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{Entity, EntityKind, GameState};

/// Hint shown when a level starts
pub const INTRO_HINT: &str = "Find the flag to win!";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("entity '{id}' has non-positive size {width}x{height}")]
    NonPositiveSize { id: String, width: f32, height: f32 },
    #[error("entity '{id}' has a non-finite coordinate")]
    NonFinite { id: String },
    #[error("duplicate entity id '{0}'")]
    DuplicateId(String),
    #[error("level has no goal")]
    MissingGoal,
    #[error("entity '{0}' is a player; the player comes from the spawn point")]
    PlayerInEntityList(String),
    #[error("entity '{id}' is a {kind} and cannot move; only enemies patrol")]
    UnexpectedVelocity { id: String, kind: &'static str },
    #[error("world width {width} is narrower than the {screen}px screen")]
    WorldTooNarrow { width: f32, screen: f32 },
    #[error("spawn point ({x}, {y}) is outside the world")]
    SpawnOutsideWorld { x: f32, y: f32 },
}

/// One non-player entity in a level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDesc {
    /// Generated as `<kind>-<n>` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Patrol speed, enemies only
    #[serde(default)]
    pub vx: f32,
}

impl EntityDesc {
    pub fn new(kind: EntityKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: None,
            kind,
            x,
            y,
            width,
            height,
            vx: 0.0,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn patrol(mut self, vx: f32) -> Self {
        self.vx = vx;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalDesc {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }
}

fn default_world_width() -> f32 {
    WORLD_WIDTH
}

fn default_intro_hint() -> String {
    INTRO_HINT.to_string()
}

/// Complete level layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    #[serde(default = "default_world_width")]
    pub world_width: f32,
    #[serde(default)]
    pub spawn: SpawnPoint,
    #[serde(default)]
    pub entities: Vec<EntityDesc>,
    pub goal: Option<GoalDesc>,
    #[serde(default = "default_intro_hint")]
    pub intro_hint: String,
}

impl LevelDef {
    /// The classic stage: ground, five ledges, 20 coins, 10 walkers, 3 "?" blocks
    pub fn classic() -> Self {
        let world_width = WORLD_WIDTH;
        let mut entities = vec![
            EntityDesc::new(EntityKind::Platform, 0.0, 550.0, world_width, 50.0).id("ground"),
            EntityDesc::new(EntityKind::Platform, 300.0, 400.0, 150.0, 32.0).id("p1"),
            EntityDesc::new(EntityKind::Platform, 500.0, 300.0, 150.0, 32.0).id("p2"),
            EntityDesc::new(EntityKind::Platform, 1000.0, 450.0, 200.0, 32.0).id("p3"),
            EntityDesc::new(EntityKind::Platform, 1400.0, 350.0, 100.0, 32.0).id("p4"),
            EntityDesc::new(EntityKind::Platform, 1800.0, 250.0, 300.0, 32.0).id("p5"),
        ];

        // Coins zig-zag across three heights
        entities.extend((0..20).map(|i| {
            let x = 400.0 + i as f32 * 200.0;
            let y = 450.0 - (i % 3) as f32 * 50.0;
            EntityDesc::new(EntityKind::Coin, x, y, 24.0, 24.0).id(format!("coin-{i}"))
        }));

        // Walkers stand on the ground and head left
        entities.extend((0..10).map(|i| {
            let x = 800.0 + i as f32 * 450.0;
            EntityDesc::new(EntityKind::Enemy, x, 518.0, 32.0, 32.0)
                .id(format!("enemy-{i}"))
                .patrol(-2.0)
        }));

        entities.extend(
            [(400.0, 250.0), (1100.0, 300.0), (2000.0, 150.0)]
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| {
                    EntityDesc::new(EntityKind::BonusBlock, x, y, 40.0, 40.0)
                        .id(format!("bonus-{}", i + 1))
                }),
        );

        Self {
            world_width,
            spawn: SpawnPoint::default(),
            entities,
            goal: Some(GoalDesc {
                x: world_width - 200.0,
                y: 450.0,
                width: 60.0,
                height: 100.0,
            }),
            intro_hint: INTRO_HINT.to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level from {} ({} entities)",
            path.display(),
            level.entities.len()
        );
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Turn descriptors into entities, assigning ids and checking every rule
    pub fn entities(&self) -> Result<Vec<Entity>, LevelError> {
        if self.world_width.is_nan() || self.world_width < SCREEN_WIDTH {
            return Err(LevelError::WorldTooNarrow {
                width: self.world_width,
                screen: SCREEN_WIDTH,
            });
        }
        let SpawnPoint { x, y } = self.spawn;
        if !x.is_finite() || !y.is_finite() || x < 0.0 || x > self.world_width - PLAYER_WIDTH {
            return Err(LevelError::SpawnOutsideWorld { x, y });
        }

        let goal = self.goal.ok_or(LevelError::MissingGoal)?;
        let goal_desc = EntityDesc::new(EntityKind::Goal, goal.x, goal.y, goal.width, goal.height)
            .id("flag");

        let mut seen = HashSet::new();
        let mut counters = HashMap::new();
        let mut entities = Vec::with_capacity(self.entities.len() + 1);

        for desc in self.entities.iter().chain(std::iter::once(&goal_desc)) {
            let id = match &desc.id {
                Some(id) => id.clone(),
                None => {
                    let n = counters.entry(desc.kind).or_insert(0u32);
                    let id = format!("{}-{}", desc.kind.as_str(), n);
                    *n += 1;
                    id
                }
            };
            validate(desc, &id)?;
            if !seen.insert(id.clone()) {
                return Err(LevelError::DuplicateId(id));
            }

            entities.push(
                Entity::new(
                    id,
                    desc.kind,
                    Vec2::new(desc.x, desc.y),
                    Vec2::new(desc.width, desc.height),
                )
                .with_velocity(Vec2::new(desc.vx, 0.0)),
            );
        }

        Ok(entities)
    }

    /// Build the initial game state for this level
    pub fn build(&self) -> Result<GameState, LevelError> {
        let entities = self.entities()?;
        Ok(GameState::new(
            Vec2::new(self.spawn.x, self.spawn.y),
            entities,
            self.world_width,
            self.intro_hint.clone(),
        ))
    }
}

fn validate(desc: &EntityDesc, id: &str) -> Result<(), LevelError> {
    if desc.kind == EntityKind::Player {
        return Err(LevelError::PlayerInEntityList(id.to_string()));
    }
    let coords = [desc.x, desc.y, desc.width, desc.height, desc.vx];
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(LevelError::NonFinite { id: id.to_string() });
    }
    if desc.width <= 0.0 || desc.height <= 0.0 {
        return Err(LevelError::NonPositiveSize {
            id: id.to_string(),
            width: desc.width,
            height: desc.height,
        });
    }
    if desc.vx != 0.0 && desc.kind != EntityKind::Enemy {
        return Err(LevelError::UnexpectedVelocity {
            id: id.to_string(),
            kind: desc.kind.as_str(),
        });
    }
    Ok(())
}
