//! Tile rectangle animation
//!
//! One cycle moves every tile from its current rectangle to the next
//! plan's rectangle over a fixed duration. `advance` writes eased
//! positions into a buffer allocated once at cycle start, so the
//! per-frame cost is a lerp per tile and nothing else.

#![allow(dead_code)]

use std::time::Duration;

use crate::layout::Rect;

/// Easing curve applied to cycle progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    InOutSine,
    OutCubic,
    InOutQuad,
}

impl Easing {
    /// The gentle curves used for wall transitions.
    pub const CYCLE_CURVES: [Easing; 3] = [Easing::InOutSine, Easing::OutCubic, Easing::InOutQuad];

    /// Map linear progress `t` in [0, 1] onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::InOutSine => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::InOutSine => "InOutSine",
            Easing::OutCubic => "OutCubic",
            Easing::InOutQuad => "InOutQuad",
        }
    }
}

/// An in-flight transition between two layout plans.
///
/// `start` and `end` are expected to be the same length; on completion
/// every current rect equals its target exactly.
#[derive(Debug, Clone)]
pub struct AnimationCycle {
    start: Vec<Rect>,
    end: Vec<Rect>,
    current: Vec<Rect>,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
    completed: bool,
}

impl AnimationCycle {
    pub fn new(start: Vec<Rect>, end: Vec<Rect>, duration_ms: u64, easing: Easing) -> Self {
        debug_assert_eq!(start.len(), end.len());
        let current = start.clone();
        Self {
            start,
            end,
            current,
            duration_ms: duration_ms.max(1) as f32,
            elapsed_ms: 0.0,
            easing,
            completed: false,
        }
    }

    /// Advance the cycle. Returns `true` exactly once, on the call where
    /// elapsed time reaches the full duration; afterwards the cycle is
    /// inert and keeps reporting the final rects.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.completed {
            return false;
        }
        self.elapsed_ms = (self.elapsed_ms + dt.as_secs_f32() * 1000.0).min(self.duration_ms);
        if self.elapsed_ms >= self.duration_ms {
            for (current, target) in self.current.iter_mut().zip(&self.end) {
                *current = *target;
            }
            self.completed = true;
            return true;
        }
        let eased = self.easing.apply(self.elapsed_ms / self.duration_ms);
        for ((current, from), to) in self.current.iter_mut().zip(&self.start).zip(&self.end) {
            *current = from.lerp(to, eased);
        }
        false
    }

    /// Interpolated rects for this frame.
    pub fn rects(&self) -> &[Rect] {
        &self.current
    }

    pub fn target(&self) -> &[Rect] {
        &self.end
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }
}
