//! Fixed timestep simulation tick
//!
//! `step` is a pure function: previous state + held controls in, next state
//! and the tick's events out. It never performs I/O; asking the oracle for a
//! hint is reported as a `GameEvent::HintRequested` for the driver to act on.

use super::collision::{CollisionPass, Fate, resolve};
use super::entity::EntityKind;
use super::input::{Control, InputSnapshot};
use super::state::{GameEvent, GameState, GameStatus};
use crate::consts::SCREEN_HEIGHT;
use crate::tuning::Tuning;

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl StepOutcome {
    fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }

    /// Scores of every hint request raised this tick
    pub fn hint_requests(&self) -> impl Iterator<Item = u64> + '_ {
        self.events.iter().filter_map(|e| match e {
            GameEvent::HintRequested { score } => Some(*score),
            _ => None,
        })
    }
}

/// Advance the game state by one tick
pub fn step(state: &GameState, input: &InputSnapshot, tuning: &Tuning) -> StepOutcome {
    // Paused, lost or won: nothing moves
    if state.status != GameStatus::Playing {
        return StepOutcome::unchanged(state);
    }

    let pre_move = &state.player;
    let mut player = state.player.clone();

    // Horizontal: both directions held cancel out
    if input.is_held(Control::Right) {
        player.vel.x += tuning.move_accel;
    }
    if input.is_held(Control::Left) {
        player.vel.x -= tuning.move_accel;
    }
    player.vel.x *= tuning.friction;
    player.pos.x += player.vel.x;

    // Vertical: gravity applies even when standing, the ground re-zeroes it
    player.vel.y += tuning.gravity;
    player.pos.y += player.vel.y;

    // Enemies patrol blindly, no platform or wall checks
    let advanced = state.entities.iter().map(|e| {
        let mut e = e.clone();
        if e.kind == EntityKind::Enemy {
            e.pos.x += e.vel.x;
        }
        e
    });

    // Collision pass: later entities see earlier corrections to the player
    let mut pass = CollisionPass::new(player, pre_move, state.score);
    let mut entities = Vec::with_capacity(state.entities.len());
    for entity in advanced {
        if !pass.player.overlaps(&entity) {
            entities.push(entity);
            continue;
        }
        if resolve(&mut pass, &entity, tuning) == Fate::Keep {
            entities.push(entity);
        }
    }

    let CollisionPass {
        mut player,
        grounded,
        status,
        score,
        mut events,
        ..
    } = pass;

    // No debounce: holding jump re-jumps on every grounded tick
    if grounded && input.is_held(Control::Jump) {
        player.vel.y = tuning.jump_impulse;
    }

    // World bounds
    let max_x = (state.world_width - player.size.x).max(0.0);
    player.pos.x = player.pos.x.min(max_x).max(0.0);
    let fell_out = player.pos.y > SCREEN_HEIGHT;
    if fell_out {
        events.push(GameEvent::FellOutOfWorld);
    }

    // Falling out overrides whatever the contacts decided
    let status = if fell_out { GameStatus::GameOver } else { status };

    let mut next = GameState {
        player,
        entities,
        score,
        status,
        camera_x: 0.0,
        hint: state.hint.clone(),
        world_width: state.world_width,
        time_ticks: state.time_ticks + 1,
    };
    next.camera_x = next.camera_for(next.player.pos.x);

    StepOutcome {
        state: next,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::Entity;
    use glam::Vec2;
    use proptest::prelude::*;

    fn ground() -> Entity {
        Entity::new(
            "ground",
            EntityKind::Platform,
            Vec2::new(0.0, 550.0),
            Vec2::new(WORLD_WIDTH, 50.0),
        )
    }

    /// Player standing still on the ground
    fn resting_state() -> GameState {
        GameState::new(Vec2::new(100.0, 502.0), vec![ground()], WORLD_WIDTH, "")
    }

    /// Player in mid-air with nothing around
    fn airborne_state(x: f32, y: f32) -> GameState {
        GameState::new(Vec2::new(x, y), Vec::new(), WORLD_WIDTH, "")
    }

    fn hold(controls: &[Control]) -> InputSnapshot {
        InputSnapshot::holding(controls)
    }

    #[test]
    fn test_jump_from_rest() {
        let state = resting_state();
        let out = step(&state, &hold(&[Control::Jump]), &Tuning::default());
        assert_eq!(out.state.player.vel.y, -16.0);
        assert_eq!(out.state.player.pos.y, 502.0);
        assert_eq!(out.state.status, GameStatus::Playing);
        assert_eq!(out.state.score, 0);
    }

    #[test]
    fn test_held_jump_retriggers_only_when_grounded() {
        // Holding jump is not debounced: it fires again as soon as the
        // player lands, but not in mid-air
        let tuning = Tuning::default();
        let input = hold(&[Control::Jump]);
        let mut state = step(&resting_state(), &input, &tuning).state;
        assert_eq!(state.player.vel.y, -16.0);

        let mut jumps = 1;
        for _ in 0..60 {
            let next = step(&state, &input, &tuning).state;
            if next.player.vel.y == tuning.jump_impulse {
                jumps += 1;
            }
            state = next;
        }
        // A full jump arc at gravity 0.8 takes ~40 ticks
        assert!(jumps >= 2, "expected the held jump to re-trigger, got {}", jumps);
    }

    #[test]
    fn test_ground_snap_idempotent() {
        let tuning = Tuning::default();
        let mut state = resting_state();
        for _ in 0..10 {
            state = step(&state, &InputSnapshot::new(), &tuning).state;
            assert_eq!(state.player.pos.y, 502.0);
            assert_eq!(state.player.vel.y, 0.0);
        }
    }

    #[test]
    fn test_coin_pickup() {
        let mut state = resting_state();
        state.entities.push(Entity::new(
            "coin-0",
            EntityKind::Coin,
            Vec2::new(105.0, 510.0),
            Vec2::new(24.0, 24.0),
        ));
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert!(out.state.find("coin-0").is_none());
        assert_eq!(out.state.score, 100);
        assert!(out.state.find("ground").is_some());
    }

    #[test]
    fn test_falling_out_of_world() {
        let state = airborne_state(100.0, 601.0);
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.state.status, GameStatus::GameOver);
        assert!(out.events.contains(&GameEvent::FellOutOfWorld));
    }

    #[test]
    fn test_stomp_scenario() {
        let mut state = airborne_state(100.0, 468.0);
        state.player.vel.y = 5.0;
        state.entities.push(
            Entity::new(
                "enemy-0",
                EntityKind::Enemy,
                Vec2::new(100.0, 518.0),
                Vec2::new(32.0, 32.0),
            )
            .with_velocity(Vec2::new(-2.0, 0.0)),
        );
        // Feet at 516 before the move, 521.8 after: overlaps, within tolerance
        let tuning = Tuning::default();
        let out = step(&state, &InputSnapshot::new(), &tuning);
        assert!(out.state.find("enemy-0").is_none());
        assert_eq!(out.state.score, 500);
        assert_eq!(out.state.player.vel.y, tuning.stomp_bounce());
        assert_eq!(out.state.status, GameStatus::Playing);
    }

    #[test]
    fn test_enemy_damage_still_collects_coin() {
        let mut state = resting_state();
        state.entities.push(
            Entity::new(
                "enemy-0",
                EntityKind::Enemy,
                Vec2::new(122.0, 518.0),
                Vec2::new(32.0, 32.0),
            )
            .with_velocity(Vec2::new(-2.0, 0.0)),
        );
        state.entities.push(Entity::new(
            "coin-0",
            EntityKind::Coin,
            Vec2::new(105.0, 510.0),
            Vec2::new(24.0, 24.0),
        ));
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.state.status, GameStatus::GameOver);
        assert!(out.state.find("enemy-0").is_some());
        assert!(out.state.find("coin-0").is_none());
        assert_eq!(out.state.score, 100);
    }

    fn walker(x: f32) -> Entity {
        Entity::new(
            "enemy-0",
            EntityKind::Enemy,
            Vec2::new(x, 518.0),
            Vec2::new(32.0, 32.0),
        )
        .with_velocity(Vec2::new(-2.0, 0.0))
    }

    fn flag() -> Entity {
        Entity::new(
            "flag",
            EntityKind::Goal,
            Vec2::new(110.0, 450.0),
            Vec2::new(60.0, 100.0),
        )
    }

    #[test]
    fn test_goal_after_damage_wins() {
        // The flag comes later in the list, so its contact sets the status
        let mut state = resting_state();
        state.entities.push(walker(122.0));
        state.entities.push(flag());
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.state.status, GameStatus::Won);
        assert!(out.events.contains(&GameEvent::PlayerHurt { by: "enemy-0".into() }));
        assert!(out.events.contains(&GameEvent::GoalReached));
    }

    #[test]
    fn test_damage_after_goal_loses() {
        let mut state = resting_state();
        state.entities.push(flag());
        state.entities.push(walker(122.0));
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.state.status, GameStatus::GameOver);
    }

    #[test]
    fn test_falling_out_overrides_goal() {
        let mut state = airborne_state(100.0, 600.0);
        state.entities.push(Entity::new(
            "flag",
            EntityKind::Goal,
            Vec2::new(90.0, 560.0),
            Vec2::new(60.0, 100.0),
        ));
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert!(out.events.contains(&GameEvent::GoalReached));
        assert_eq!(out.state.status, GameStatus::GameOver);
    }

    #[test]
    fn test_goal_wins() {
        let mut state = resting_state();
        state.entities.push(Entity::new(
            "flag",
            EntityKind::Goal,
            Vec2::new(110.0, 450.0),
            Vec2::new(60.0, 100.0),
        ));
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.state.status, GameStatus::Won);
        assert!(out.state.find("flag").is_some());
    }

    #[test]
    fn test_bonus_block_raises_hint_request() {
        let mut state = airborne_state(100.0, 295.0);
        state.player.vel.y = -10.0;
        state.score = 400;
        state.entities.push(Entity::new(
            "bonus-0",
            EntityKind::BonusBlock,
            Vec2::new(100.0, 250.0),
            Vec2::new(40.0, 40.0),
        ));
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.hint_requests().collect::<Vec<_>>(), vec![400]);
        assert_eq!(out.state.player.vel.y, 2.0);
        // Bonus blocks are never consumed
        assert!(out.state.find("bonus-0").is_some());
        assert_eq!(out.state.hint, "");
    }

    #[test]
    fn test_enemies_patrol() {
        let mut state = airborne_state(100.0, 100.0);
        state.entities.push(
            Entity::new(
                "enemy-0",
                EntityKind::Enemy,
                Vec2::new(800.0, 518.0),
                Vec2::new(32.0, 32.0),
            )
            .with_velocity(Vec2::new(-2.0, 0.0)),
        );
        let out = step(&state, &InputSnapshot::new(), &Tuning::default());
        assert_eq!(out.state.find("enemy-0").map(|e| e.pos.x), Some(798.0));
    }

    #[test]
    fn test_left_edge_clamp() {
        let mut state = resting_state();
        state.player.pos.x = 0.5;
        state.player.vel.x = -3.0;
        let out = step(&state, &hold(&[Control::Left]), &Tuning::default());
        assert_eq!(out.state.player.pos.x, 0.0);
        assert_eq!(out.state.camera_x, 0.0);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let state = resting_state();
        let out = step(
            &state,
            &hold(&[Control::Left, Control::Right]),
            &Tuning::default(),
        );
        assert_eq!(out.state.player.vel.x, 0.0);
        assert_eq!(out.state.player.pos.x, 100.0);
    }

    #[test]
    fn test_paused_is_noop() {
        let state = resting_state().with_status(GameStatus::Paused);
        let out = step(&state, &hold(&[Control::Right]), &Tuning::default());
        assert_eq!(out.state, state);
        assert!(out.events.is_empty());
    }

    proptest! {
        #[test]
        fn prop_friction_decay(vx in -20.0f32..20.0, ticks in 1usize..40) {
            let tuning = Tuning::default();
            let mut state = airborne_state(2500.0, -5000.0);
            state.player.vel.x = vx;
            for _ in 0..ticks {
                let before = state.player.vel.x;
                state = step(&state, &InputSnapshot::new(), &tuning).state;
                prop_assert_eq!(state.player.vel.x, before * tuning.friction);
                prop_assert!(state.player.vel.x.abs() <= before.abs());
            }
        }

        #[test]
        fn prop_gravity_accumulates(start_vy in -10.0f32..10.0, ticks in 1usize..30) {
            let tuning = Tuning::default();
            let mut state = airborne_state(2500.0, -5000.0);
            state.player.vel.y = start_vy;
            for _ in 0..ticks {
                let before = state.player.clone();
                state = step(&state, &InputSnapshot::new(), &tuning).state;
                prop_assert!(state.player.vel.y > before.vel.y);
                prop_assert!((state.player.vel.y - (before.vel.y + tuning.gravity)).abs() < 1e-4);
                prop_assert_eq!(state.player.pos.y, before.pos.y + state.player.vel.y);
            }
        }

        #[test]
        fn prop_camera_within_bounds(x in -100.0f32..6000.0, vx in -30.0f32..30.0) {
            let mut state = airborne_state(x.clamp(0.0, WORLD_WIDTH), 100.0);
            state.player.vel.x = vx;
            let out = step(&state, &hold(&[Control::Right]), &Tuning::default());
            prop_assert!(out.state.camera_x >= 0.0);
            prop_assert!(out.state.camera_x <= WORLD_WIDTH - SCREEN_WIDTH);
            prop_assert!(out.state.player.pos.x >= 0.0);
            prop_assert!(out.state.player.pos.x <= WORLD_WIDTH - PLAYER_WIDTH);
        }

        #[test]
        fn prop_terminal_freeze(
            won in any::<bool>(),
            left in any::<bool>(),
            right in any::<bool>(),
            jump in any::<bool>(),
            repeats in 1usize..10,
        ) {
            let status = if won { GameStatus::Won } else { GameStatus::GameOver };
            let frozen = resting_state().with_status(status);
            let mut input = InputSnapshot::new();
            if left { input.press(Control::Left); }
            if right { input.press(Control::Right); }
            if jump { input.press(Control::Jump); }

            let mut state = frozen.clone();
            for _ in 0..repeats {
                let out = step(&state, &input, &Tuning::default());
                prop_assert!(out.events.is_empty());
                state = out.state;
            }
            prop_assert_eq!(state, frozen);
        }

        #[test]
        fn prop_score_monotone(moves in proptest::collection::vec(0u8..8, 1..120)) {
            let tuning = Tuning::default();
            let mut state = crate::level::LevelDef::classic()
                .build()
                .expect("classic level is valid");
            for bits in moves {
                let mut input = InputSnapshot::new();
                if bits & 1 != 0 { input.press(Control::Left); }
                if bits & 2 != 0 { input.press(Control::Right); }
                if bits & 4 != 0 { input.press(Control::Jump); }
                let next = step(&state, &input, &tuning).state;
                prop_assert!(next.score >= state.score);
                // Removed entities are only ever coins or enemies
                prop_assert_eq!(next.count(EntityKind::Platform), state.count(EntityKind::Platform));
                prop_assert_eq!(next.count(EntityKind::BonusBlock), state.count(EntityKind::BonusBlock));
                prop_assert_eq!(next.count(EntityKind::Goal), state.count(EntityKind::Goal));
                state = next;
            }
        }
    }
}
