//! Wall rendering
//!
//! Paints tiles into a display viewport. Tile geometry arrives in
//! virtual desktop coordinates; each viewport maps the slice of the
//! desktop it covers onto its own pixels, so a tile animating across a
//! display boundary shows up on both displays at once.

#![allow(dead_code)]

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Stroke, Vec2};

use crate::display::DisplayRegion;
use crate::layout;
use crate::stream::StreamState;

/// Everything the view needs to paint one tile.
#[derive(Debug, Clone)]
pub struct TileVisual {
    /// Geometry in virtual desktop coordinates
    pub rect: layout::Rect,
    /// Short source label; empty for an idle tile
    pub label: String,
    /// Tracker state for stream tiles, `None` for local-only tiles
    pub state: Option<StreamState>,
    /// Per-tile phase so neighbouring tiles do not pulse in sync
    pub seed: u32,
    pub occupied: bool,
}

/// Paints the wall into display viewports or a scaled preview window.
pub struct WallView {
    /// Show display name and state chips over the tiles
    pub show_info: bool,
}

impl Default for WallView {
    fn default() -> Self {
        Self { show_info: true }
    }
}

impl WallView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the slice of the wall covered by one display.
    pub fn show_display(
        &self,
        ui: &mut egui::Ui,
        display: &DisplayRegion,
        tiles: &[TileVisual],
        time: f32,
    ) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);

        painter.rect_filled(rect, 0.0, Color32::BLACK);

        let bounds = display.bounds();
        let scale_x = rect.width() / bounds.width.max(1.0);
        let scale_y = rect.height() / bounds.height.max(1.0);
        for tile in tiles {
            if !tile.rect.intersects(&bounds) {
                continue;
            }
            let screen = egui::Rect::from_min_size(
                Pos2::new(
                    rect.min.x + (tile.rect.x - bounds.x) * scale_x,
                    rect.min.y + (tile.rect.y - bounds.y) * scale_y,
                ),
                Vec2::new(tile.rect.width * scale_x, tile.rect.height * scale_y),
            );
            draw_tile(&painter, screen, tile, time, self.show_info);
        }

        if self.show_info {
            let info = format!("{} - {}×{}", display.name, display.width, display.height);
            chip(
                &painter,
                rect.min + Vec2::new(16.0, 16.0),
                &info,
                Color32::from_gray(220),
            );
        }
    }

    /// Paint the whole virtual desktop scaled into one window, with the
    /// display outlines drawn behind the tiles (windowed mode).
    pub fn show_canvas(
        &self,
        ui: &mut egui::Ui,
        displays: &[DisplayRegion],
        tiles: &[TileVisual],
        time: f32,
    ) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);

        painter.rect_filled(rect, 0.0, Color32::BLACK);

        let canvas = layout::union_bounds(displays);
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return;
        }
        let scale = (rect.width() / canvas.width).min(rect.height() / canvas.height);
        let offset = Vec2::new(
            rect.min.x + (rect.width() - canvas.width * scale) * 0.5,
            rect.min.y + (rect.height() - canvas.height * scale) * 0.5,
        );
        let to_screen = |r: &layout::Rect| -> egui::Rect {
            egui::Rect::from_min_size(
                Pos2::new(offset.x + (r.x - canvas.x) * scale, offset.y + (r.y - canvas.y) * scale),
                Vec2::new(r.width * scale, r.height * scale),
            )
        };

        for display in displays {
            let outline = to_screen(&display.bounds());
            painter.rect_stroke(outline, 0.0, Stroke::new(1.0, Color32::from_gray(60)));
            painter.text(
                outline.min + Vec2::new(6.0, 4.0),
                Align2::LEFT_TOP,
                &display.name,
                FontId::proportional(12.0),
                Color32::from_gray(90),
            );
        }
        for tile in tiles {
            draw_tile(&painter, to_screen(&tile.rect), tile, time, self.show_info);
        }
    }
}

fn draw_tile(painter: &egui::Painter, rect: egui::Rect, visual: &TileVisual, time: f32, info: bool) {
    if !visual.occupied {
        painter.rect_filled(rect, 0.0, Color32::from_gray(12));
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(40)));
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No Source",
            FontId::proportional(16.0),
            Color32::from_gray(100),
        );
        return;
    }

    if visual.state == Some(StreamState::Failed) {
        // Nothing is decoding here; flat static instead of the gradient
        painter.rect_filled(rect, 0.0, Color32::from_gray(20));
    } else {
        draw_feed(painter, rect, visual.seed, time);
    }

    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(25)));

    if !info {
        return;
    }
    if !visual.label.is_empty() {
        chip(
            painter,
            Pos2::new(rect.min.x + 8.0, rect.max.y - 26.0),
            &visual.label,
            Color32::from_gray(220),
        );
    }
    if let Some(state) = visual.state {
        let (text, color) = state_chip(state);
        let width = chip_width(text);
        chip(
            painter,
            Pos2::new(rect.max.x - width - 8.0, rect.min.y + 8.0),
            text,
            color,
        );
    }
}

/// Animated gradient standing in for decoded video.
fn draw_feed(painter: &egui::Painter, rect: egui::Rect, seed: u32, time: f32) {
    let phase = (seed % 16) as f32 * 0.7;
    let steps = 24;
    let step_width = rect.width() / steps as f32;

    for i in 0..steps {
        let t = i as f32 / steps as f32;
        let wave = ((t * 4.0 + time * 2.0 + phase).sin() * 0.5 + 0.5) * 0.3;

        let r = ((t + wave) * 80.0 + 40.0) as u8;
        let g = ((1.0 - t + wave) * 60.0 + 40.0) as u8;
        let b = ((wave * 2.0) * 100.0 + 80.0) as u8;

        let x = rect.min.x + i as f32 * step_width;
        let strip = egui::Rect::from_min_size(
            Pos2::new(x, rect.min.y),
            Vec2::new(step_width + 1.0, rect.height()),
        );
        painter.rect_filled(strip, 0.0, Color32::from_rgb(r, g, b));
    }

    // Scanlines effect
    for y in (0..rect.height() as i32).step_by(4) {
        let line_y = rect.min.y + y as f32;
        painter.line_segment(
            [Pos2::new(rect.min.x, line_y), Pos2::new(rect.max.x, line_y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(0, 0, 0, 30)),
        );
    }
}

fn state_chip(state: StreamState) -> (&'static str, Color32) {
    match state {
        StreamState::Healthy => ("LIVE", Color32::GREEN),
        StreamState::Degraded => ("RETRYING", Color32::YELLOW),
        StreamState::Failed => ("OFFLINE", Color32::RED),
        StreamState::FallenBack => ("FALLBACK", Color32::LIGHT_BLUE),
        StreamState::Recovering => ("PROBING", Color32::from_rgb(190, 140, 255)),
    }
}

fn chip_width(text: &str) -> f32 {
    8.0 + text.chars().count() as f32 * 7.5
}

fn chip(painter: &egui::Painter, pos: Pos2, text: &str, text_color: Color32) {
    let rect = egui::Rect::from_min_size(pos, Vec2::new(chip_width(text), 18.0));
    painter.rect_filled(rect, 2.0, Color32::from_rgba_unmultiplied(0, 0, 0, 180));
    painter.text(
        pos + Vec2::new(4.0, 2.0),
        Align2::LEFT_TOP,
        text,
        FontId::monospace(12.0),
        text_color,
    );
}
