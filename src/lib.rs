//! Video Wall Library
//!
//! An animated multi-monitor video wall mixing local files and HLS
//! streams, with automatic stream-to-local fallback and recovery.

pub mod animate;
pub mod app;
pub mod config;
pub mod display;
pub mod layout;
pub mod player;
pub mod source;
pub mod stream;
pub mod ui;
pub mod wall;

// Re-export commonly used types
pub use animate::{AnimationCycle, Easing};
pub use app::VideoWallApp;
pub use config::WallSettings;
pub use display::DisplayRegion;
pub use layout::{compute_layout, LayoutPlan, Pattern, PatternKind, Rect};
pub use source::{Source, SourceCatalog, SourceKind};
pub use stream::{StreamState, StreamTracker};
pub use wall::{TileId, WallCoordinator};
