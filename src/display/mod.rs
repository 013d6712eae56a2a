//! Display discovery
//!
//! Snapshot of the monitors the wall spans. Enumeration is best-effort:
//! xrandr output on Linux, a single 1080p region when nothing can be
//! queried. The app re-enumerates on a slow cadence and hands the new
//! snapshot to the wall when it changes.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::layout::Rect;

/// A single physical display the wall can place tiles on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRegion {
    pub id: u32,
    pub name: String,
    /// Top-left corner in virtual desktop coordinates
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

impl DisplayRegion {
    pub fn new(id: u32, name: impl Into<String>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            width,
            height,
            primary: false,
        }
    }

    /// Region bounds as layout geometry.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x as f32, self.y as f32, self.width as f32, self.height as f32)
    }
}

/// Enumerate connected displays, falling back to a single 1920x1080
/// region when the platform query yields nothing.
pub fn enumerate_displays() -> Vec<DisplayRegion> {
    let displays = platform_enumerate();
    if displays.is_empty() {
        log::warn!("No displays detected, assuming a single 1920x1080 display");
        vec![fallback_display()]
    } else {
        log::info!("Enumerated {} display(s)", displays.len());
        displays
    }
}

fn fallback_display() -> DisplayRegion {
    DisplayRegion {
        id: 0,
        name: "Default".to_string(),
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
        primary: true,
    }
}

#[cfg(target_os = "linux")]
fn platform_enumerate() -> Vec<DisplayRegion> {
    use std::process::Command;

    let output = match Command::new("xrandr").arg("--query").output() {
        Ok(out) if out.status.success() => out,
        Ok(_) => {
            log::warn!("xrandr exited with an error");
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Failed to run xrandr: {}", e);
            return Vec::new();
        }
    };

    parse_xrandr(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(target_os = "linux"))]
fn platform_enumerate() -> Vec<DisplayRegion> {
    Vec::new()
}

/// Parse `xrandr --query` output. Connected displays report a geometry
/// token shaped like `1920x1080+0+0`.
fn parse_xrandr(text: &str) -> Vec<DisplayRegion> {
    let mut displays = Vec::new();

    for line in text.lines() {
        if !line.contains(" connected") {
            continue;
        }
        let name = match line.split_whitespace().next() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let primary = line.contains(" primary ");
        let geometry = line
            .split_whitespace()
            .find(|token| token.contains('x') && token.contains('+'));
        let Some(geometry) = geometry else {
            // Connected but inactive output (no current mode)
            continue;
        };

        let mut parts = geometry.split('+');
        let size = parts.next().unwrap_or("");
        let x = parts.next().and_then(|v| v.parse::<i32>().ok());
        let y = parts.next().and_then(|v| v.parse::<i32>().ok());
        let mut size_parts = size.split('x');
        let width = size_parts.next().and_then(|v| v.parse::<u32>().ok());
        let height = size_parts.next().and_then(|v| v.parse::<u32>().ok());

        if let (Some(x), Some(y), Some(width), Some(height)) = (x, y, width, height) {
            let id = displays.len() as u32;
            displays.push(DisplayRegion {
                id,
                name,
                x,
                y,
                width,
                height,
                primary,
            });
        }
    }

    if !displays.is_empty() && !displays.iter().any(|d| d.primary) {
        displays[0].primary = true;
    }
    displays
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Screen 0: minimum 320 x 200, current 3840 x 1080, maximum 16384 x 16384
HDMI-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 509mm x 286mm
   1920x1080     60.00*+
DP-1 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 509mm x 286mm
   1920x1080     60.00*+
DP-2 disconnected (normal left inverted right x axis y axis)
";

    #[test]
    fn parses_connected_displays() {
        let displays = parse_xrandr(SAMPLE);
        assert_eq!(displays.len(), 2);

        assert_eq!(displays[0].name, "HDMI-1");
        assert!(displays[0].primary);
        assert_eq!((displays[0].x, displays[0].y), (0, 0));
        assert_eq!((displays[0].width, displays[0].height), (1920, 1080));

        assert_eq!(displays[1].name, "DP-1");
        assert!(!displays[1].primary);
        assert_eq!((displays[1].x, displays[1].y), (1920, 0));
    }

    #[test]
    fn skips_disconnected_and_inactive_outputs() {
        let text = "\
HDMI-1 connected (normal left inverted right x axis y axis)
DP-2 disconnected 1920x1080+0+0 (normal)
";
        // HDMI-1 has no geometry token, DP-2 is disconnected
        assert!(parse_xrandr(text).is_empty());
    }

    #[test]
    fn first_display_promoted_to_primary_when_none_marked() {
        let text = "DP-1 connected 2560x1440+0+0 (normal) 600mm x 340mm\n";
        let displays = parse_xrandr(text);
        assert_eq!(displays.len(), 1);
        assert!(displays[0].primary);
    }

    #[test]
    fn bounds_converts_to_layout_rect() {
        let display = DisplayRegion::new(3, "DP-1", -1920, 120, 1920, 1080);
        let bounds = display.bounds();
        assert_eq!(bounds.x, -1920.0);
        assert_eq!(bounds.y, 120.0);
        assert_eq!(bounds.width, 1920.0);
        assert_eq!(bounds.height, 1080.0);
    }
}
