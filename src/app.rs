//! Main application state and UI
//!
//! Owns the wall coordinator and drives it from the frame loop. The
//! primary display paints in the main window; every other display gets
//! an immediate viewport positioned over it. Escape quits, F11 toggles
//! fullscreen on the main window, Right arrow reshuffles sources.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::WallSettings;
use crate::display::{enumerate_displays, DisplayRegion};
use crate::player::PlaceholderSurface;
use crate::source::SourceCatalog;
use crate::stream::{HttpProbe, StreamState};
use crate::ui::{StatusOverlay, TileVisual, WallView};
use crate::wall::WallCoordinator;

/// How often the display set is re-checked for hotplug.
const DISPLAY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Main application state
pub struct VideoWallApp {
    wall: WallCoordinator,
    view: WallView,
    overlay: StatusOverlay,
    /// Tracker states last frame, diffed for overlay notices
    previous_states: Vec<Option<StreamState>>,
    /// Scaled single-window preview instead of fullscreen viewports
    windowed: bool,
    fullscreen: bool,
    last_update: Instant,
    started: Instant,
    last_display_poll: Instant,
}

impl VideoWallApp {
    /// Create a new application instance
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: WallSettings,
        catalog: SourceCatalog,
        displays: Vec<DisplayRegion>,
        windowed: bool,
    ) -> Self {
        log::info!("Initializing video wall...");

        let fullscreen = settings.start_fullscreen && !windowed;
        let surface = PlaceholderSurface::new(&settings);
        let probe = HttpProbe::new(settings.load_timeout());
        let wall = WallCoordinator::new(
            settings,
            displays,
            catalog,
            Box::new(surface),
            Box::new(probe),
        );
        let previous_states = wall.tile_states();
        let now = Instant::now();

        log::info!("Video wall initialized");
        Self {
            wall,
            view: WallView::new(),
            overlay: StatusOverlay::new(),
            previous_states,
            windowed,
            fullscreen,
            last_update: now,
            started: now,
            last_display_poll: now,
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| quit_requested(i)) {
            log::info!("Quit requested - shutting down");
            self.wall.shutdown();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::F11)) {
            self.fullscreen = !self.fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.fullscreen));
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.overlay.push(self.started.elapsed(), "Reshuffling sources");
            self.wall.refresh_sources();
        }
    }

    /// Turn tracker transitions into overlay notices.
    fn emit_status_changes(&mut self) {
        let now = self.started.elapsed();
        let states = self.wall.tile_states();
        for (index, (previous, current)) in
            self.previous_states.iter().zip(&states).enumerate()
        {
            if previous == current {
                continue;
            }
            let name = self
                .wall
                .stream_name(index)
                .unwrap_or_else(|| format!("tile {}", index));
            match current {
                Some(StreamState::Degraded) => {
                    self.overlay.push(now, format!("{}: stream degraded, retrying", name))
                }
                Some(StreamState::FallenBack) => {
                    self.overlay.push(now, format!("{}: stream down, playing local video", name))
                }
                Some(StreamState::Recovering) => {
                    self.overlay.push(now, format!("{}: checking stream", name))
                }
                Some(StreamState::Healthy) if previous.is_some() => {
                    self.overlay.push(now, format!("{}: stream restored", name))
                }
                Some(StreamState::Failed) => {
                    self.overlay.push(now, format!("{}: stream offline", name))
                }
                _ => {}
            }
        }
        self.previous_states = states;
    }

    fn tile_visuals(&self) -> Vec<TileVisual> {
        self.wall
            .tiles()
            .iter()
            .enumerate()
            .map(|(index, tile)| TileVisual {
                rect: tile.rect,
                label: tile
                    .source
                    .as_ref()
                    .map(|s| s.display_name())
                    .unwrap_or_default(),
                state: self.wall.tile_state(index),
                seed: index as u32,
                occupied: tile.source.is_some(),
            })
            .collect()
    }

    /// Show a fullscreen viewport over every non-primary display.
    fn show_secondary_viewports(&mut self, ctx: &egui::Context, visuals: &[TileVisual], time: f32) {
        use std::sync::atomic::{AtomicBool, Ordering};

        // The quit keys land in whichever viewport has focus; picked up
        // here on the next frame
        static QUIT_PRESSED: AtomicBool = AtomicBool::new(false);

        if QUIT_PRESSED.swap(false, Ordering::SeqCst) {
            log::info!("Quit requested in an output viewport - shutting down");
            self.wall.shutdown();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let secondary: Vec<DisplayRegion> = self
            .wall
            .displays()
            .iter()
            .filter(|d| !d.primary)
            .cloned()
            .collect();
        let view = &self.view;

        for display in secondary {
            let viewport_id = egui::ViewportId::from_hash_of(("wall-display", display.id));
            let viewport_builder = egui::ViewportBuilder::default()
                .with_title(format!("Video Wall - {}", display.name))
                .with_inner_size([display.width as f32, display.height as f32])
                .with_position([display.x as f32, display.y as f32])
                .with_decorations(false);

            ctx.show_viewport_immediate(viewport_id, viewport_builder, |ctx, _class| {
                if ctx.input(|i| quit_requested(i)) {
                    QUIT_PRESSED.store(true, Ordering::SeqCst);
                }
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));

                egui::CentralPanel::default()
                    .frame(egui::Frame::none().fill(egui::Color32::BLACK))
                    .show(ctx, |ui| {
                        view.show_display(ui, &display, visuals, time);
                    });
            });
        }
    }
}

/// Either quit chord: Escape, or Ctrl+Q (Cmd+Q on macOS).
fn quit_requested(input: &egui::InputState) -> bool {
    input.key_pressed(egui::Key::Escape)
        || (input.modifiers.command && input.key_pressed(egui::Key::Q))
}

impl eframe::App for VideoWallApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Calculate delta time
        let now = Instant::now();
        let dt = now.duration_since(self.last_update);
        self.last_update = now;

        self.handle_keys(ctx);

        // Pick up display hotplug on a slow cadence
        if self.last_display_poll.elapsed() >= DISPLAY_POLL_INTERVAL {
            self.last_display_poll = now;
            self.wall.set_displays(enumerate_displays());
        }

        self.wall.update(dt);
        self.emit_status_changes();

        let elapsed = self.started.elapsed();
        self.overlay.prune(elapsed);
        let time = elapsed.as_secs_f32();
        let visuals = self.tile_visuals();

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                if self.windowed {
                    self.view.show_canvas(ui, self.wall.displays(), &visuals, time);
                } else if let Some(primary) = self.wall.displays().iter().find(|d| d.primary) {
                    self.view.show_display(ui, primary, &visuals, time);
                }
                self.overlay.paint(ui.painter(), ui.max_rect());
            });

        if self.wall.is_shut_down() {
            // Close command already sent; stop driving viewports
            return;
        }
        if !self.windowed {
            self.show_secondary_viewports(ctx, &visuals, time);
        }

        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(key: egui::Key, modifiers: egui::Modifiers) -> bool {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            modifiers,
            events: vec![egui::Event::Key {
                key,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers,
            }],
            ..Default::default()
        };
        ctx.begin_frame(input);
        let hit = ctx.input(|i| quit_requested(i));
        let _ = ctx.end_frame();
        hit
    }

    #[test]
    fn escape_requests_quit() {
        assert!(chord(egui::Key::Escape, egui::Modifiers::NONE));
    }

    #[test]
    fn ctrl_q_requests_quit() {
        assert!(chord(egui::Key::Q, egui::Modifiers::COMMAND));
    }

    #[test]
    fn plain_q_does_not_quit() {
        assert!(!chord(egui::Key::Q, egui::Modifiers::NONE));
    }
}
