//! Game session driver
//!
//! Owns everything that changes between ticks:
//! - the current `GameState` (replaced wholesale every tick)
//! - the held-control snapshot fed by key events
//! - the oracle hint dispatcher, whose replies are merged at tick boundaries

use std::time::Duration;

use crate::hint::HintDispatcher;
use crate::level::{LevelDef, LevelError};
use crate::sim::{GameEvent, GameState, GameStatus, InputSnapshot, step};
use crate::tuning::Tuning;

/// Poll period while waiting for outstanding hints
const SETTLE_POLL: Duration = Duration::from_millis(5);

pub struct Session {
    level: LevelDef,
    tuning: Tuning,
    state: GameState,
    input: InputSnapshot,
    hints: Option<HintDispatcher>,
}

impl Session {
    /// Start the level. Invalid level data is rejected here.
    pub fn new(
        level: LevelDef,
        tuning: Tuning,
        hints: Option<HintDispatcher>,
    ) -> Result<Self, LevelError> {
        let state = level.build()?;
        log::info!(
            "Level ready: {} entities, world {}px wide",
            state.entities.len(),
            state.world_width
        );
        Ok(Self {
            level,
            tuning,
            state,
            input: InputSnapshot::new(),
            hints,
        })
    }

    /// Read-only view for the presentation layer
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Replace the whole held-control set
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    pub fn key_down(&mut self, key: &str) {
        if self.input.key_down(key).is_none() {
            log::trace!("Ignoring unmapped key {}", key);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Run one tick: merge finished hints, step, dispatch new hint requests
    pub fn tick(&mut self) -> Vec<GameEvent> {
        self.merge_hints();

        let outcome = step(&self.state, &self.input, &self.tuning);
        if let Some(hints) = &self.hints {
            for score in outcome.hint_requests() {
                hints.request(score);
            }
        }

        for event in &outcome.events {
            log_event(event);
        }
        if outcome.state.status != self.state.status {
            log::info!(
                "Status {:?} -> {:?} at tick {} (score {})",
                self.state.status,
                outcome.state.status,
                outcome.state.time_ticks,
                outcome.state.score
            );
        }

        self.state = outcome.state;
        outcome.events
    }

    /// Fold the newest finished hint into the state. Returns true if one landed.
    pub fn merge_hints(&mut self) -> bool {
        let Some(reply) = self.hints.as_mut().and_then(|h| h.poll_latest()) else {
            return false;
        };
        log::info!("Oracle says (score {}): {}", reply.score, reply.text);
        self.state = self.state.with_hint(reply.text);
        true
    }

    /// Hint requests still waiting on the service
    pub fn hints_in_flight(&self) -> usize {
        self.hints.as_ref().map_or(0, |h| h.in_flight())
    }

    /// Wait until every outstanding hint has answered, then merge
    pub async fn settle_hints(&mut self) {
        while self.hints_in_flight() > 0 {
            tokio::time::sleep(SETTLE_POLL).await;
        }
        self.merge_hints();
    }

    /// Flip between playing and paused. Terminal states stay put.
    pub fn toggle_pause(&mut self) -> GameStatus {
        let next = match self.state.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            terminal => terminal,
        };
        if next != self.state.status {
            log::info!("{:?} -> {:?}", self.state.status, next);
            self.state = self.state.with_status(next);
        }
        next
    }

    /// Rebuild the level from scratch
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.state = self.level.build()?;
        log::info!("Level restarted");
        Ok(())
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::CoinCollected { id, points } => log::debug!("Coin {} +{}", id, points),
        GameEvent::EnemyStomped { id, points } => log::debug!("Stomped {} +{}", id, points),
        GameEvent::PlayerHurt { by } => log::info!("Hurt by {}", by),
        GameEvent::BonusBumped { id } => log::debug!("Bumped {}", id),
        GameEvent::HintRequested { score } => log::debug!("Hint requested at {}", score),
        GameEvent::GoalReached => log::info!("Reached the flag"),
        GameEvent::FellOutOfWorld => log::info!("Fell out of the world"),
    }
}
