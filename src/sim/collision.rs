//! Collision response for the player against each entity kind
//!
//! Detection is plain AABB overlap (`Entity::overlaps`). Response is a
//! per-kind function picked by `resolve`, each one free to nudge the working
//! player, award points, raise events, and decide whether the entity lives on.
//!
//! Directional tests compare the player's edges from *before* this tick's
//! movement against the other entity. It's a cheap stand-in for swept
//! collision, so a fast enough player can still tunnel through thin geometry.

use super::entity::{Entity, EntityKind};
use super::state::{GameEvent, GameStatus};
use crate::tuning::Tuning;

/// Whether an entity survives the collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Keep,
    Remove,
}

/// Working state for one collision pass over the entity list
#[derive(Debug, Clone)]
pub struct CollisionPass {
    /// Working copy of the player, already moved for this tick
    pub player: Entity,
    /// Player top edge before this tick's movement
    pub pre_top: f32,
    /// Player bottom edge before this tick's movement
    pub pre_bottom: f32,
    /// Landed on a platform this tick
    pub grounded: bool,
    /// Took damage from an enemy this tick
    pub hurt: bool,
    /// Touched the goal this tick
    pub reached_goal: bool,
    /// Status after the contacts so far; the last damage or goal contact sets it
    pub status: GameStatus,
    pub score: u64,
    pub events: Vec<GameEvent>,
}

impl CollisionPass {
    /// Start a pass. `pre_move` is the player as it was at the start of the tick.
    pub fn new(player: Entity, pre_move: &Entity, score: u64) -> Self {
        Self {
            player,
            pre_top: pre_move.top(),
            pre_bottom: pre_move.bottom(),
            grounded: false,
            hurt: false,
            reached_goal: false,
            status: GameStatus::Playing,
            score,
            events: Vec::new(),
        }
    }

    #[inline]
    fn falling(&self) -> bool {
        self.player.vel.y > 0.0
    }

    #[inline]
    fn rising(&self) -> bool {
        self.player.vel.y < 0.0
    }

    /// Was the player's head at or below `bottom` before moving?
    #[inline]
    fn came_from_below(&self, bottom: f32) -> bool {
        self.rising() && self.pre_top >= bottom
    }
}

/// Apply the response for an overlapping entity
pub fn resolve(pass: &mut CollisionPass, other: &Entity, tuning: &Tuning) -> Fate {
    match other.kind {
        EntityKind::Platform => resolve_platform(pass, other),
        EntityKind::Coin => resolve_coin(pass, other, tuning),
        EntityKind::BonusBlock => resolve_bonus_block(pass, other, tuning),
        EntityKind::Enemy => resolve_enemy(pass, other, tuning),
        EntityKind::Goal => resolve_goal(pass),
        // The player is never in the entity list
        EntityKind::Player => Fate::Keep,
    }
}

/// Land, bonk, or get blocked. Exactly one branch fires, in this order.
fn resolve_platform(pass: &mut CollisionPass, platform: &Entity) -> Fate {
    if pass.falling() && pass.pre_bottom <= platform.top() {
        pass.player.pos.y = platform.top() - pass.player.size.y;
        pass.player.vel.y = 0.0;
        pass.grounded = true;
    } else if pass.came_from_below(platform.bottom()) {
        pass.player.pos.y = platform.bottom();
        pass.player.vel.y = 0.0;
    } else if pass.player.vel.x > 0.0 {
        pass.player.pos.x = platform.left() - pass.player.size.x;
        pass.player.vel.x = 0.0;
    } else if pass.player.vel.x < 0.0 {
        pass.player.pos.x = platform.right();
        pass.player.vel.x = 0.0;
    }
    Fate::Keep
}

fn resolve_coin(pass: &mut CollisionPass, coin: &Entity, tuning: &Tuning) -> Fate {
    pass.score += tuning.coin_points;
    pass.events.push(GameEvent::CoinCollected {
        id: coin.id.clone(),
        points: tuning.coin_points,
    });
    Fate::Remove
}

/// Only a head-bump from below counts. The block stays and can be bumped again.
fn resolve_bonus_block(pass: &mut CollisionPass, block: &Entity, tuning: &Tuning) -> Fate {
    if pass.came_from_below(block.bottom()) {
        pass.player.vel.y = tuning.bonus_bounce;
        pass.events.push(GameEvent::BonusBumped {
            id: block.id.clone(),
        });
        pass.events.push(GameEvent::HintRequested { score: pass.score });
    }
    Fate::Keep
}

/// Stomp when falling onto the head, otherwise the player gets hurt
fn resolve_enemy(pass: &mut CollisionPass, enemy: &Entity, tuning: &Tuning) -> Fate {
    if pass.falling() && pass.pre_bottom <= enemy.top() + tuning.stomp_tolerance {
        pass.player.vel.y = tuning.stomp_bounce();
        pass.score += tuning.stomp_points;
        pass.events.push(GameEvent::EnemyStomped {
            id: enemy.id.clone(),
            points: tuning.stomp_points,
        });
        return Fate::Remove;
    }

    // Damage is reported once per tick; the pass keeps going for pickups
    pass.status = GameStatus::GameOver;
    if !pass.hurt {
        pass.hurt = true;
        pass.events.push(GameEvent::PlayerHurt {
            by: enemy.id.clone(),
        });
    }
    Fate::Keep
}

fn resolve_goal(pass: &mut CollisionPass) -> Fate {
    pass.status = GameStatus::Won;
    if !pass.reached_goal {
        pass.reached_goal = true;
        pass.events.push(GameEvent::GoalReached);
    }
    Fate::Keep
}
