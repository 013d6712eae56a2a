//! Playback surface seam
//!
//! The wall drives whatever actually plays media through this trait. The
//! built-in placeholder surface and the test fakes both live behind it,
//! and a real media backend would slot in the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::Source;

/// Identifies a tile for surface and probe callbacks. Tile ids are dense
/// indices assigned at wall construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}", self.0)
    }
}

/// Event reported by the playback surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The loaded source produced its first frame (or was confirmed
    /// reachable) and is playing.
    Started(TileId),
    /// Load or mid-playback failure.
    Failed(TileId),
}

impl PlayerEvent {
    pub fn tile(&self) -> TileId {
        match self {
            PlayerEvent::Started(tile) | PlayerEvent::Failed(tile) => *tile,
        }
    }
}

/// What the coordinator needs from a playback backend. All calls are
/// fire-and-forget; problems come back as [`PlayerEvent::Failed`] rather
/// than errors, so one bad tile never unwinds the wall.
pub trait PlayerSurface {
    /// Create the player behind `tile`. Called once per tile, before any
    /// other call for that tile.
    fn create_player(&mut self, tile: TileId);

    /// Point the tile's player at a new source. Implicitly stops
    /// whatever was playing.
    fn load(&mut self, tile: TileId, source: &Source);

    fn play(&mut self, tile: TileId);

    fn stop(&mut self, tile: TileId);

    /// Drain pending events. Non-blocking; called every frame.
    fn poll_events(&mut self) -> Vec<PlayerEvent>;
}
