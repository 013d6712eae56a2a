//! Placeholder playback surface
//!
//! Stands in for a real video backend: it validates that each assigned
//! source is actually playable and reports lifecycle events, while the
//! pixels themselves are painted by the UI layer. Local files are
//! checked on the spot; stream URLs are checked over HTTP on a worker
//! thread so a dead host never stalls a frame.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use crate::config::WallSettings;
use crate::source::{Source, SourceKind};
use crate::stream::{HttpProbe, ProbeOutcome, StreamProbe};
use crate::wall::{PlayerEvent, PlayerSurface, TileId};

#[derive(Debug, Clone, Default)]
struct Slot {
    source: Option<Source>,
    playing: bool,
}

/// Surface that emits realistic player lifecycle events without
/// decoding any video.
pub struct PlaceholderSurface {
    slots: HashMap<TileId, Slot>,
    pending: Vec<PlayerEvent>,
    checker: HttpProbe,
    /// Network buffer a real backend would be configured with
    buffer: Duration,
}

impl PlaceholderSurface {
    pub fn new(settings: &WallSettings) -> Self {
        Self {
            slots: HashMap::new(),
            pending: Vec::new(),
            checker: HttpProbe::new(settings.load_timeout()),
            buffer: Duration::from_millis(settings.video_buffer_ms),
        }
    }

    /// What a backend's open call would require: present, a regular
    /// file, and not empty.
    fn local_file_ok(path: &str) -> bool {
        match fs::metadata(path) {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }
}

impl PlayerSurface for PlaceholderSurface {
    fn create_player(&mut self, tile: TileId) {
        log::debug!(
            "Creating player slot for {} ({}ms network buffer)",
            tile,
            self.buffer.as_millis()
        );
        self.slots.insert(tile, Slot::default());
    }

    fn load(&mut self, tile: TileId, source: &Source) {
        let slot = self.slots.entry(tile).or_default();
        slot.source = Some(source.clone());
        slot.playing = false;
        match source.kind {
            SourceKind::Local => {
                if Self::local_file_ok(&source.locator) {
                    self.pending.push(PlayerEvent::Started(tile));
                } else {
                    log::warn!("Local file missing or empty: {}", source.locator);
                    self.pending.push(PlayerEvent::Failed(tile));
                }
            }
            SourceKind::Stream => {
                self.checker.begin(tile, &source.locator);
            }
        }
    }

    fn play(&mut self, tile: TileId) {
        if let Some(slot) = self.slots.get_mut(&tile) {
            slot.playing = true;
        }
    }

    fn stop(&mut self, tile: TileId) {
        if let Some(slot) = self.slots.get_mut(&tile) {
            slot.playing = false;
            slot.source = None;
        }
    }

    fn poll_events(&mut self) -> Vec<PlayerEvent> {
        let mut events = std::mem::take(&mut self.pending);
        for (tile, outcome) in self.checker.poll() {
            // A verdict can arrive after the tile moved on to a local
            // source; only forward it while a stream is still loaded.
            let still_stream = self
                .slots
                .get(&tile)
                .and_then(|slot| slot.source.as_ref())
                .is_some_and(|source| source.kind == SourceKind::Stream);
            if !still_stream {
                log::debug!("Dropping stale stream verdict for {}", tile);
                continue;
            }
            match outcome {
                ProbeOutcome::Alive => events.push(PlayerEvent::Started(tile)),
                ProbeOutcome::Dead => events.push(PlayerEvent::Failed(tile)),
            }
        }
        events
    }
}
