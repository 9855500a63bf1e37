//! Demo driver - the "AI" that plays during headless runs
//!
//! Holds right, and holds jump when something is worth jumping at: a walker
//! coming up ahead, a ledge in the way, or a "?" block overhead.

use crate::sim::{Control, Entity, EntityKind, GameState, InputSnapshot};
use crate::tuning::Tuning;

/// How far ahead (px) a walker triggers a jump
const ENEMY_LOOKAHEAD: f32 = 90.0;
/// How far ahead (px) a ledge side triggers a jump
const WALL_LOOKAHEAD: f32 = 24.0;

/// Pick the controls to hold for the next tick
pub fn drive(state: &GameState, tuning: &Tuning) -> InputSnapshot {
    let mut input = InputSnapshot::holding(&[Control::Right]);
    let player = &state.player;

    // Faster runs need a longer runway to clear a walker
    let lookahead = ENEMY_LOOKAHEAD * (1.0 + player.vel.x.max(0.0) / tuning.max_run_speed());

    let walker_ahead = state.entities.iter().any(|e| {
        e.kind == EntityKind::Enemy && same_lane(player, e) && ahead_within(player, e, lookahead)
    });

    let wall_ahead = state.entities.iter().any(|e| {
        e.kind == EntityKind::Platform
            && e.top() < player.bottom() - 1.0
            && same_lane(player, e)
            && ahead_within(player, e, WALL_LOOKAHEAD)
    });

    // Jump reach is roughly v^2 / 2g
    let reach = tuning.jump_impulse * tuning.jump_impulse / (2.0 * tuning.gravity);
    let block_overhead = state.entities.iter().any(|e| {
        e.kind == EntityKind::BonusBlock
            && e.left() < player.right()
            && e.right() > player.left()
            && e.bottom() < player.top()
            && player.top() - e.bottom() < reach
    });

    if walker_ahead || wall_ahead || block_overhead {
        input.press(Control::Jump);
    }
    input
}

/// Vertical bands overlap
fn same_lane(player: &Entity, other: &Entity) -> bool {
    other.top() < player.bottom() && other.bottom() > player.top()
}

/// `other` starts in front of the player, no further than `distance`
fn ahead_within(player: &Entity, other: &Entity, distance: f32) -> bool {
    let gap = other.left() - player.right();
    (-4.0..=distance).contains(&gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelDef;
    use crate::sim::{GameStatus, step};
    use glam::Vec2;

    fn empty_state() -> GameState {
        GameState::new(Vec2::new(100.0, 502.0), Vec::new(), 5000.0, "")
    }

    #[test]
    fn test_runs_right_when_clear() {
        let input = drive(&empty_state(), &Tuning::default());
        assert!(input.is_held(Control::Right));
        assert!(!input.is_held(Control::Jump));
    }

    #[test]
    fn test_jumps_at_walker() {
        let mut state = empty_state();
        state.entities.push(Entity::new(
            "enemy-0",
            EntityKind::Enemy,
            Vec2::new(200.0, 518.0),
            Vec2::new(32.0, 32.0),
        ));
        assert!(drive(&state, &Tuning::default()).is_held(Control::Jump));

        // Walkers behind don't matter
        state.entities[0].pos.x = 20.0;
        assert!(!drive(&state, &Tuning::default()).is_held(Control::Jump));
    }

    #[test]
    fn test_jumps_at_block_overhead() {
        let mut state = empty_state();
        state.entities.push(Entity::new(
            "bonus-1",
            EntityKind::BonusBlock,
            Vec2::new(110.0, 400.0),
            Vec2::new(40.0, 40.0),
        ));
        assert!(drive(&state, &Tuning::default()).is_held(Control::Jump));
    }

    #[test]
    fn test_autopilot_makes_progress_on_classic() {
        let tuning = Tuning::default();
        let mut state = LevelDef::classic().build().unwrap();
        for _ in 0..600 {
            if state.status != GameStatus::Playing {
                break;
            }
            let input = drive(&state, &tuning);
            state = step(&state, &input, &tuning).state;
        }
        assert!(state.player.pos.x > 300.0 || state.status != GameStatus::Playing);
    }
}
