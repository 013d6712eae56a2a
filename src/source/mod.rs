//! Source inventory for the wall
//!
//! The immutable list of everything the wall can play, plus the
//! selection bookkeeping around it: recently-picked local videos rotate
//! out of the pool for a while, and streams reported dead stay excluded
//! until the pool runs dry and the failure set resets.

#![allow(dead_code)]

mod playlist;
mod scan;

pub use playlist::{load_stream_list, parse_stream_list, PlaylistError};
pub use scan::{is_video_file, scan_video_files, VIDEO_EXTENSIONS};

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// What a source points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Local,
    Stream,
}

/// A playable item: a local video file or an HLS stream URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub kind: SourceKind,
    pub locator: String,
}

impl Source {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Local,
            locator: path.into(),
        }
    }

    pub fn stream(url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Stream,
            locator: url.into(),
        }
    }

    /// Short label for overlays: file name for locals, host for streams.
    pub fn display_name(&self) -> String {
        match self.kind {
            SourceKind::Local => Path::new(&self.locator)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.locator.clone()),
            SourceKind::Stream => {
                let trimmed = self
                    .locator
                    .trim_start_matches("https://")
                    .trim_start_matches("http://");
                trimmed.split('/').next().unwrap_or(trimmed).to_string()
            }
        }
    }
}

/// Inventory of sources with pick bookkeeping.
pub struct SourceCatalog {
    sources: Vec<Source>,
    recently_used: VecDeque<String>,
    failed_streams: HashSet<String>,
    rng: StdRng,
}

impl SourceCatalog {
    pub fn new(sources: Vec<Source>) -> Self {
        Self::with_rng(sources, StdRng::from_os_rng())
    }

    /// Deterministic picks for tests.
    pub fn with_seed(sources: Vec<Source>, seed: u64) -> Self {
        Self::with_rng(sources, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sources: Vec<Source>, rng: StdRng) -> Self {
        Self {
            sources,
            recently_used: VecDeque::new(),
            failed_streams: HashSet::new(),
            rng,
        }
    }

    /// Every source of the given kind, in catalog order.
    pub fn all(&self, kind: SourceKind) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(move |s| s.kind == kind)
    }

    pub fn count(&self, kind: SourceKind) -> usize {
        self.all(kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Uniform random pick among eligible sources of `kind`, or `None`
    /// when nothing is eligible. Having no sources is a valid state, not
    /// an error. `excluding` holds locators the caller wants skipped
    /// (e.g. streams already on other tiles, or a fallback that just
    /// died).
    pub fn pick(&mut self, kind: SourceKind, excluding: &HashSet<String>) -> Option<Source> {
        match kind {
            SourceKind::Stream => self.pick_stream(excluding),
            SourceKind::Local => self.pick_local(excluding),
        }
    }

    /// Mark a stream as dead so picks skip it. Trackers call this when a
    /// stream exhausts its retries.
    pub fn mark_stream_failed(&mut self, locator: &str) {
        if self.failed_streams.insert(locator.to_string()) {
            log::warn!("Marking stream as failed: {}", locator);
        }
    }

    pub fn clear_failed_streams(&mut self) {
        self.failed_streams.clear();
    }

    pub fn failed_stream_count(&self) -> usize {
        self.failed_streams.len()
    }

    fn pick_stream(&mut self, excluding: &HashSet<String>) -> Option<Source> {
        let eligible: Vec<Source> = self
            .sources
            .iter()
            .filter(|s| {
                s.kind == SourceKind::Stream
                    && !excluding.contains(&s.locator)
                    && !self.failed_streams.contains(&s.locator)
            })
            .cloned()
            .collect();
        if let Some(pick) = eligible.choose(&mut self.rng) {
            return Some(pick.clone());
        }

        // Everything is excluded or failed. Forget the failures and give
        // the remaining pool one more chance.
        if !self.failed_streams.is_empty() {
            log::info!(
                "Stream pool exhausted, clearing {} failed entries",
                self.failed_streams.len()
            );
            self.failed_streams.clear();
            let eligible: Vec<Source> = self
                .sources
                .iter()
                .filter(|s| s.kind == SourceKind::Stream && !excluding.contains(&s.locator))
                .cloned()
                .collect();
            return eligible.choose(&mut self.rng).cloned();
        }
        None
    }

    fn pick_local(&mut self, excluding: &HashSet<String>) -> Option<Source> {
        let pool: Vec<Source> = self
            .sources
            .iter()
            .filter(|s| s.kind == SourceKind::Local && !excluding.contains(&s.locator))
            .cloned()
            .collect();
        if pool.is_empty() {
            return None;
        }

        let mut fresh: Vec<Source> = pool
            .iter()
            .filter(|s| !self.recently_used.contains(&s.locator))
            .cloned()
            .collect();
        if fresh.is_empty() {
            // Every local has had a recent turn; start the rotation over
            self.recently_used.clear();
            fresh = pool;
        }

        let pick = fresh.choose(&mut self.rng).cloned()?;
        self.remember_local(&pick.locator);
        Some(pick)
    }

    /// Record a local pick, keeping the recency window at
    /// `min(local_count / 2, 20)` entries.
    fn remember_local(&mut self, locator: &str) {
        let cap = (self.count(SourceKind::Local) / 2).min(20);
        if cap == 0 {
            return;
        }
        self.recently_used.push_back(locator.to_string());
        while self.recently_used.len() > cap {
            self.recently_used.pop_front();
        }
    }
}
