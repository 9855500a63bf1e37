//! Oracle hint worker
//!
//! Bumping a "?" block asks an advice service for a short line of flavor text.
//! The tick never waits for it:
//! - `HintDispatcher::request` spawns an independent task per request
//! - each task sends its reply over a channel, success or not
//! - the driver drains the channel between ticks and keeps the newest reply
//!
//! Failures never surface as errors. They become `FALLBACK_HINT`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Shown when the service fails
pub const FALLBACK_HINT: &str = "The stars are silent today...";
/// Shown when the service answers with nothing
pub const EMPTY_HINT: &str = "Stay curious, plumber!";

#[derive(Debug, Error)]
pub enum HintError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can produce advice for a score
#[async_trait]
pub trait HintService: Send + Sync {
    async fn advise(&self, score: u64) -> Result<String, HintError>;
}

/// Prompt for adapters backed by a text model
pub fn oracle_prompt(score: u64) -> String {
    format!(
        "You are the Oracle in a Super Mario-like game. The player currently has a score of {score}. \
         Give them a very short, funny, 8-bit style piece of advice or a hint (max 15 words). \
         Example: 'Watch out for the Goombas, they have no lunch money!' or 'Jump higher than your bills!'"
    )
}

/// Ask `service` for advice, never failing
pub async fn request_hint(service: &dyn HintService, score: u64) -> String {
    match service.advise(score).await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                EMPTY_HINT.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => {
            log::warn!("Oracle hint failed at score {}: {}", score, e);
            FALLBACK_HINT.to_string()
        }
    }
}

const EARLY_ADVICE: &[&str] = &[
    "Watch out for the walkers, they have no lunch money!",
    "Coins don't grow on trees. They float. Grab them!",
    "Bonk the ? blocks from below. I like visitors.",
    "Jump higher than your bills!",
    "Walkers only go left. Be the right.",
];

const LATE_ADVICE: &[&str] = &[
    "Nice hoard! The flag is east, past the rent.",
    "Stomp first, ask questions never.",
    "Your score is high. Your jumps should be too.",
    "Legends say the flag pays in pure satisfaction.",
    "Land on heads, not on regrets.",
];

/// Score at which the oracle switches to late-game advice
const LATE_GAME_SCORE: u64 = 1000;

/// Offline oracle with canned 8-bit wisdom
///
/// Optional latency and failure rate let the async path and the fallback be
/// exercised without any network.
#[derive(Debug)]
pub struct OracleHints {
    seed: u64,
    latency: Duration,
    failure_rate: f64,
    calls: AtomicU64,
}

impl OracleHints {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            latency: Duration::ZERO,
            failure_rate: 0.0,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Probability in [0, 1] that a call fails
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }
}

#[async_trait]
impl HintService for OracleHints {
    async fn advise(&self, score: u64) -> Result<String, HintError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let mut rng = Pcg32::seed_from_u64(
            self.seed ^ score.wrapping_mul(2654435761) ^ call.rotate_left(32),
        );

        if rng.random_bool(self.failure_rate) {
            return Err(HintError::Unavailable("the crystal ball is cloudy".into()));
        }

        let pool = if score >= LATE_GAME_SCORE {
            LATE_ADVICE
        } else {
            EARLY_ADVICE
        };
        Ok(pool[rng.random_range(0..pool.len())].to_string())
    }
}

/// A finished hint request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReply {
    /// Score the request was made at
    pub score: u64,
    pub text: String,
}

/// Counts one request as in flight until dropped
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fire-and-forget hint requests with a reply channel
pub struct HintDispatcher {
    service: Arc<dyn HintService>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<HintReply>,
    rx: mpsc::UnboundedReceiver<HintReply>,
    in_flight: Arc<AtomicUsize>,
}

impl HintDispatcher {
    pub fn new(service: Arc<dyn HintService>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            runtime,
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start a request. Returns immediately; overlapping requests are independent.
    pub fn request(&self, score: u64) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);
        log::debug!("Oracle hint requested at score {}", score);

        self.runtime.spawn(async move {
            // Dropped last, after the reply is sent, even if this task unwinds
            let _pending = InFlight(in_flight);

            // A panicking service only takes down its own task
            let call = tokio::spawn(async move { request_hint(service.as_ref(), score).await });
            let text = match call.await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Oracle hint task died at score {}: {}", score, e);
                    FALLBACK_HINT.to_string()
                }
            };
            // The receiver only goes away when the dispatcher is dropped
            let _ = tx.send(HintReply { score, text });
        });
    }

    /// Newest reply that arrived since the last poll, if any
    pub fn poll_latest(&mut self) -> Option<HintReply> {
        let mut latest = None;
        while let Ok(reply) = self.rx.try_recv() {
            latest = Some(reply);
        }
        latest
    }

    /// Wait for the next reply
    pub async fn next_reply(&mut self) -> Option<HintReply> {
        self.rx.recv().await
    }

    /// Requests started but not yet answered
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
