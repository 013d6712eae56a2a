//! UI components for the wall
//!
//! Rendering only; all wall behavior lives in the coordinator.

pub mod overlay;
pub mod wall_view;

pub use overlay::StatusOverlay;
pub use wall_view::{TileVisual, WallView};
