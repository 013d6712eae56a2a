//! Wall settings
//!
//! JSON-backed knobs for grid shape, animation pacing, playback
//! buffering, and stream recovery. Startup validates everything numeric;
//! a malformed or out-of-range file is a hard error so the wall never
//! runs half-configured.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for wall settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must be at least 1x1 (got {rows}x{cols})")]
    InvalidGrid { rows: u32, cols: u32 },
    #[error("animation_duration_ms must be greater than zero")]
    ZeroAnimationDuration,
    #[error("max_active_players must be at least 1")]
    ZeroPlayers,
    #[error("retry_threshold must be at least 1")]
    ZeroRetryThreshold,
    #[error("recovery_interval_ms must be greater than zero")]
    ZeroRecoveryInterval,
    #[error("recovery_backoff_cap_ms must be at least recovery_interval_ms")]
    BackoffCapBelowInterval,
    #[error("load_timeout_ms must be greater than zero")]
    ZeroLoadTimeout,
    #[error("health_interval_ms must be greater than zero")]
    ZeroHealthInterval,
}

/// Everything the wall reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallSettings {
    /// Tile grid shape
    pub grid_rows: u32,
    pub grid_cols: u32,
    /// Transition duration; the hold between transitions uses the same value
    pub animation_duration_ms: u64,
    /// Player network buffer passed through to the playback surface
    pub video_buffer_ms: u64,
    /// Upper bound on simultaneously active players
    pub max_active_players: u32,
    /// Consecutive failures before a stream is abandoned
    pub retry_threshold: u32,
    /// Base delay before probing a fallen-back stream
    pub recovery_interval_ms: u64,
    /// Ceiling for the exponential recovery backoff
    pub recovery_backoff_cap_ms: u64,
    /// How long a load may sit without a first frame before it fails
    pub load_timeout_ms: u64,
    /// Cadence of the tracker health tick
    pub health_interval_ms: u64,
    pub start_fullscreen: bool,
}

impl Default for WallSettings {
    fn default() -> Self {
        Self {
            grid_rows: 3,
            grid_cols: 3,
            animation_duration_ms: 8000,
            video_buffer_ms: 15000,
            max_active_players: 15,
            retry_threshold: 3,
            recovery_interval_ms: 60_000,
            recovery_backoff_cap_ms: 600_000,
            load_timeout_ms: 15_000,
            health_interval_ms: 1000,
            start_fullscreen: true,
        }
    }
}

impl WallSettings {
    /// Tiles the wall actually runs: the grid, capped by the player
    /// budget.
    pub fn tile_count(&self) -> usize {
        ((self.grid_rows * self.grid_cols) as usize).min(self.max_active_players as usize)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(ConfigError::InvalidGrid {
                rows: self.grid_rows,
                cols: self.grid_cols,
            });
        }
        if self.animation_duration_ms == 0 {
            return Err(ConfigError::ZeroAnimationDuration);
        }
        if self.max_active_players == 0 {
            return Err(ConfigError::ZeroPlayers);
        }
        if self.retry_threshold == 0 {
            return Err(ConfigError::ZeroRetryThreshold);
        }
        if self.recovery_interval_ms == 0 {
            return Err(ConfigError::ZeroRecoveryInterval);
        }
        if self.recovery_backoff_cap_ms < self.recovery_interval_ms {
            return Err(ConfigError::BackoffCapBelowInterval);
        }
        if self.load_timeout_ms == 0 {
            return Err(ConfigError::ZeroLoadTimeout);
        }
        if self.health_interval_ms == 0 {
            return Err(ConfigError::ZeroHealthInterval);
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: WallSettings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Defaults when `path` does not exist; a file that exists but does
    /// not load or validate stays fatal.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
