//! Transient status messages
//!
//! Short-lived notices the wall surfaces over the video: fallbacks,
//! recoveries, layout changes. Each message expires on its own; the app
//! prunes the queue every frame and paints whatever is left in the
//! bottom-left corner of the primary display.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Vec2};

/// Oldest messages drop first beyond this depth.
const MAX_MESSAGES: usize = 5;

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    /// Time since app start at which the message disappears
    expires_at: Duration,
}

/// Queue of self-expiring status lines.
#[derive(Debug, Default)]
pub struct StatusOverlay {
    messages: VecDeque<StatusMessage>,
}

impl StatusOverlay {
    const DISPLAY_TIME: Duration = Duration::from_secs(4);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, now: Duration, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.messages.push_back(StatusMessage {
            text,
            expires_at: now + Self::DISPLAY_TIME,
        });
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    /// Drop expired messages. Messages are pushed in time order, so the
    /// front always expires first.
    pub fn prune(&mut self, now: Duration) {
        while self.messages.front().is_some_and(|m| m.expires_at <= now) {
            self.messages.pop_front();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.text.as_str())
    }

    /// Paint the queue in the bottom-left corner of `rect`.
    pub fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        let margin = 16.0;
        let line_height = 24.0;
        let count = self.messages.len();
        for (i, message) in self.messages.iter().enumerate() {
            let pos = Pos2::new(
                rect.min.x + margin,
                rect.max.y - margin - line_height * (count - i) as f32,
            );
            let chip = egui::Rect::from_min_size(
                pos,
                Vec2::new(12.0 + message.text.chars().count() as f32 * 7.5, 20.0),
            );
            painter.rect_filled(chip, 4.0, Color32::from_rgba_unmultiplied(0, 0, 0, 180));
            painter.text(
                pos + Vec2::new(6.0, 3.0),
                Align2::LEFT_TOP,
                &message.text,
                FontId::proportional(13.0),
                Color32::from_gray(220),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_expire_in_push_order() {
        let mut overlay = StatusOverlay::new();
        overlay.push(Duration::from_secs(0), "first");
        overlay.push(Duration::from_secs(2), "second");
        assert_eq!(overlay.len(), 2);

        overlay.prune(Duration::from_secs(3));
        assert_eq!(overlay.len(), 2, "neither has expired yet");

        overlay.prune(Duration::from_secs(4));
        assert_eq!(overlay.lines().collect::<Vec<_>>(), vec!["second"]);

        overlay.prune(Duration::from_secs(6));
        assert!(overlay.is_empty());
    }

    #[test]
    fn queue_depth_is_capped() {
        let mut overlay = StatusOverlay::new();
        for i in 0..8 {
            overlay.push(Duration::from_millis(i), format!("message {}", i));
        }
        assert_eq!(overlay.len(), MAX_MESSAGES);
        assert_eq!(overlay.lines().next(), Some("message 3"));
    }
}
