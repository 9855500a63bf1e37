//! Runner settings
//!
//! Loaded from an optional JSON file; every field has a default so a file
//! only needs the keys it changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::SIM_HZ;
use crate::hint::{HintService, OracleHints};
use crate::tuning::{Tuning, TuningError};

/// Shortest tick period; `tokio::time::interval` rejects zero
const MIN_TICK_INTERVAL: Duration = Duration::from_nanos(1);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
}

/// Oracle hint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintSettings {
    /// Ask the oracle when a bonus block is bumped
    pub enabled: bool,
    /// Simulated service latency
    pub latency_ms: u64,
    /// Simulated failure probability (0.0 - 1.0)
    pub failure_rate: f64,
}

impl Default for HintSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            latency_ms: 250,
            failure_rate: 0.1,
        }
    }
}

/// Runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation steps per second
    pub tick_hz: u32,
    /// Stop after this many ticks (0 = until the run ends)
    pub max_ticks: u64,
    /// Pace ticks to wall-clock time instead of running flat out
    pub realtime: bool,
    /// Let the demo driver hold the keys
    pub autopilot: bool,
    /// Level file; the classic level when absent
    pub level: Option<PathBuf>,
    /// Seed for the offline oracle
    pub seed: u64,
    pub hints: HintSettings,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_hz: SIM_HZ,
            max_ticks: 60 * 120,
            realtime: false,
            autopilot: true,
            level: None,
            seed: 0x5EED,
            hints: HintSettings::default(),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    /// Load from `path` if given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Wall-clock duration of one tick, never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64).max(MIN_TICK_INTERVAL)
    }

    /// Oracle configured from these settings, if hints are on
    pub fn hint_service(&self) -> Option<Arc<dyn HintService>> {
        if !self.hints.enabled {
            return None;
        }
        let oracle = OracleHints::new(self.seed)
            .with_latency(Duration::from_millis(self.hints.latency_ms))
            .with_failure_rate(self.hints.failure_rate);
        Some(Arc::new(oracle))
    }
}
