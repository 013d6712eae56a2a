//! Per-tile stream health
//!
//! Every tile assigned a stream gets a tracker. Failure events demote
//! Healthy -> Degraded -> Failed; a Failed tile substitutes a local video
//! (FallenBack) and probes the original stream in the background on a
//! capped exponential backoff until it answers again (Recovering ->
//! Healthy). The tracker never touches the player directly: transitions
//! return commands for the coordinator to dispatch, which keeps every
//! transition synchronous and the machine testable on its own.

#![allow(dead_code)]

mod probe;

pub use probe::{HttpProbe, ProbeOutcome, StreamProbe};

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::WallSettings;
use crate::source::{Source, SourceCatalog, SourceKind};

/// Health of a stream-assigned tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamState {
    /// Stream assigned and playing
    Healthy,
    /// Stream assigned, failures under the retry threshold
    Degraded,
    /// Stream abandoned; no substitute running (or the substitute died)
    Failed,
    /// Local video substituted, recovery probe scheduled
    FallenBack,
    /// Recovery probe in flight
    Recovering,
}

impl StreamState {
    pub fn label(&self) -> &'static str {
        match self {
            StreamState::Healthy => "Healthy",
            StreamState::Degraded => "Degraded",
            StreamState::Failed => "Failed",
            StreamState::FallenBack => "Fallback",
            StreamState::Recovering => "Recovering",
        }
    }
}

/// Player instruction produced by a transition, dispatched by the
/// coordinator against the tile this tracker belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Load(Source),
    Play,
    Stop,
}

/// What a health tick asked for.
#[derive(Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub commands: Vec<PlayerCommand>,
    /// Stream URL to probe in the background, if recovery came due
    pub probe_url: Option<String>,
}

/// Retry and recovery knobs, lifted out of [`WallSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failures before the stream is abandoned
    pub retry_threshold: u32,
    /// Base delay before the first recovery probe
    pub recovery_interval: Duration,
    /// Ceiling for the doubled-per-miss probe delay
    pub recovery_backoff_cap: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &WallSettings) -> Self {
        Self {
            retry_threshold: settings.retry_threshold,
            recovery_interval: Duration::from_millis(settings.recovery_interval_ms),
            recovery_backoff_cap: Duration::from_millis(settings.recovery_backoff_cap_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&WallSettings::default())
    }
}

/// State machine guarding one tile's stream assignment.
///
/// Time is injected as a `Duration` since wall start, so the machine is
/// deterministic under test. `tick` drives only time-based transitions
/// and is idempotent for a repeated `now`.
#[derive(Debug, Clone)]
pub struct StreamTracker {
    /// The stream this tile exists to show; never replaced
    stream: Source,
    /// What the visible player currently holds
    assigned: Source,
    /// Local substitute while the stream is down
    fallback: Option<Source>,
    state: StreamState,
    consecutive_failures: u32,
    /// Missed recovery probes since falling back; drives the backoff
    recovery_attempts: u32,
    last_attempt: Option<Duration>,
    next_recovery_at: Option<Duration>,
    policy: RetryPolicy,
}

impl StreamTracker {
    /// `stream` must be a [`SourceKind::Stream`] source.
    pub fn new(stream: Source, policy: RetryPolicy) -> Self {
        debug_assert_eq!(stream.kind, SourceKind::Stream);
        let assigned = stream.clone();
        Self {
            stream,
            assigned,
            fallback: None,
            state: StreamState::Healthy,
            consecutive_failures: 0,
            recovery_attempts: 0,
            last_attempt: None,
            next_recovery_at: None,
            policy,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Source the visible player currently holds.
    pub fn assigned(&self) -> &Source {
        &self.assigned
    }

    /// The original stream, regardless of what is currently playing.
    pub fn stream(&self) -> &Source {
        &self.stream
    }

    pub fn fallback(&self) -> Option<&Source> {
        self.fallback.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn next_recovery_at(&self) -> Option<Duration> {
        self.next_recovery_at
    }

    /// Playback started on the visible player.
    pub fn on_playback_started(&mut self, now: Duration) -> Vec<PlayerCommand> {
        self.consecutive_failures = 0;
        match self.state {
            StreamState::Degraded => {
                log::info!("Stream {} recovered before the retry threshold", self.stream.locator);
                self.state = StreamState::Healthy;
                Vec::new()
            }
            StreamState::Failed => {
                if self.assigned.kind == SourceKind::Stream {
                    // The abandoned stream came back on its own
                    log::info!("Stream {} started by itself after being abandoned", self.stream.locator);
                    self.state = StreamState::Healthy;
                    self.next_recovery_at = None;
                    self.recovery_attempts = 0;
                } else {
                    // A fallback that had died earlier managed a late start
                    self.state = StreamState::FallenBack;
                    if self.next_recovery_at.is_none() {
                        self.schedule_recovery(now);
                    }
                }
                Vec::new()
            }
            // Healthy: routine start. FallenBack/Recovering: the local
            // substitute starting, which changes nothing.
            StreamState::Healthy | StreamState::FallenBack | StreamState::Recovering => Vec::new(),
        }
    }

    /// Playback failed on the visible player.
    pub fn on_playback_failed(
        &mut self,
        now: Duration,
        catalog: &mut SourceCatalog,
    ) -> Vec<PlayerCommand> {
        match self.state {
            StreamState::Healthy => {
                self.consecutive_failures = 1;
                self.state = StreamState::Degraded;
                log::warn!(
                    "Stream {} failed ({}/{})",
                    self.stream.locator,
                    self.consecutive_failures,
                    self.policy.retry_threshold
                );
                self.reload_assigned(now)
            }
            StreamState::Degraded => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.policy.retry_threshold {
                    log::warn!(
                        "Stream {} exhausted {} retries, abandoning",
                        self.stream.locator,
                        self.policy.retry_threshold
                    );
                    catalog.mark_stream_failed(&self.stream.locator);
                    self.try_fallback(now, catalog)
                } else {
                    log::warn!(
                        "Stream {} failed ({}/{})",
                        self.stream.locator,
                        self.consecutive_failures,
                        self.policy.retry_threshold
                    );
                    self.reload_assigned(now)
                }
            }
            StreamState::Failed => {
                // Still dark; a local may have appeared since
                self.try_fallback(now, catalog)
            }
            StreamState::FallenBack | StreamState::Recovering => {
                // The substitute itself died; rotate to another local
                let mut excluding = HashSet::new();
                if self.assigned.kind == SourceKind::Local {
                    excluding.insert(self.assigned.locator.clone());
                }
                match catalog.pick(SourceKind::Local, &excluding) {
                    Some(local) => {
                        log::warn!(
                            "Fallback video {} failed, switching to {}",
                            self.assigned.locator,
                            local.locator
                        );
                        self.assigned = local.clone();
                        self.fallback = Some(local.clone());
                        self.state = StreamState::FallenBack;
                        self.last_attempt = Some(now);
                        vec![PlayerCommand::Load(local), PlayerCommand::Play]
                    }
                    None => {
                        log::warn!(
                            "Fallback video {} failed with no replacement available",
                            self.assigned.locator
                        );
                        self.state = StreamState::Failed;
                        // Probe backoff does not apply to the local
                        // recheck; re-arm at the base interval
                        self.recovery_attempts = 0;
                        self.schedule_recovery(now);
                        vec![PlayerCommand::Stop]
                    }
                }
            }
        }
    }

    /// Drive time-based transitions. Safe to call repeatedly with the
    /// same `now`; only the first call past a deadline acts on it.
    pub fn tick(&mut self, now: Duration, catalog: &mut SourceCatalog) -> TickOutcome {
        match self.state {
            StreamState::FallenBack if self.recovery_due(now) => {
                self.next_recovery_at = None;
                self.state = StreamState::Recovering;
                self.last_attempt = Some(now);
                log::info!(
                    "Probing stream {} (attempt {})",
                    self.stream.locator,
                    self.recovery_attempts + 1
                );
                TickOutcome {
                    commands: Vec::new(),
                    probe_url: Some(self.stream.locator.clone()),
                }
            }
            StreamState::Failed if self.recovery_due(now) => {
                self.next_recovery_at = None;
                TickOutcome {
                    commands: self.try_fallback(now, catalog),
                    probe_url: None,
                }
            }
            _ => TickOutcome::default(),
        }
    }

    /// Outcome of a background liveness probe for this tile's stream.
    pub fn on_probe_result(&mut self, now: Duration, alive: bool) -> Vec<PlayerCommand> {
        match self.state {
            StreamState::Recovering | StreamState::FallenBack => {
                if alive {
                    log::info!("Stream {} is back, restoring", self.stream.locator);
                    self.state = StreamState::Healthy;
                    self.assigned = self.stream.clone();
                    self.fallback = None;
                    self.consecutive_failures = 0;
                    self.recovery_attempts = 0;
                    self.next_recovery_at = None;
                    self.reload_assigned(now)
                } else {
                    self.recovery_attempts += 1;
                    self.state = StreamState::FallenBack;
                    self.schedule_recovery(now);
                    log::info!(
                        "Stream {} still down after {} probe(s), next attempt in {:?}",
                        self.stream.locator,
                        self.recovery_attempts,
                        self.next_recovery_at.map(|at| at.saturating_sub(now))
                    );
                    Vec::new()
                }
            }
            // Stale result: the state moved on while the probe ran
            _ => Vec::new(),
        }
    }

    fn reload_assigned(&mut self, now: Duration) -> Vec<PlayerCommand> {
        self.last_attempt = Some(now);
        vec![
            PlayerCommand::Load(self.assigned.clone()),
            PlayerCommand::Play,
        ]
    }

    /// Substitute a local video for the dead stream. Every local is a
    /// candidate, including one that died on this tile earlier and may
    /// be back. With nothing to pick the tile parks Failed, stops the
    /// visible player, and keeps re-checking on the recovery cadence.
    fn try_fallback(&mut self, now: Duration, catalog: &mut SourceCatalog) -> Vec<PlayerCommand> {
        match catalog.pick(SourceKind::Local, &HashSet::new()) {
            Some(local) => {
                log::info!(
                    "Tile for stream {} falling back to {}",
                    self.stream.locator,
                    local.locator
                );
                self.assigned = local.clone();
                self.fallback = Some(local.clone());
                self.state = StreamState::FallenBack;
                self.recovery_attempts = 0;
                self.last_attempt = Some(now);
                self.schedule_recovery(now);
                vec![PlayerCommand::Load(local), PlayerCommand::Play]
            }
            None => {
                log::warn!(
                    "No local fallback available for stream {}",
                    self.stream.locator
                );
                let parking = self.state != StreamState::Failed;
                self.state = StreamState::Failed;
                self.recovery_attempts = 0;
                self.schedule_recovery(now);
                if parking {
                    vec![PlayerCommand::Stop]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Set the next recovery deadline: base interval doubled per missed
    /// probe, capped.
    fn schedule_recovery(&mut self, now: Duration) {
        let exponent = self.recovery_attempts.min(16);
        let delay = self
            .policy
            .recovery_interval
            .saturating_mul(1u32 << exponent)
            .min(self.policy.recovery_backoff_cap);
        self.next_recovery_at = Some(now + delay);
    }

    fn recovery_due(&self, now: Duration) -> bool {
        self.next_recovery_at.is_some_and(|at| now >= at)
    }
}
