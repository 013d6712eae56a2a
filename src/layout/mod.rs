//! Layout computation for the video wall
//!
//! Pure geometry: given a pattern, a tile count, and the current display
//! regions, produce one rectangle per tile. There are no clocks and no
//! hidden randomness — the `Random` pattern carries its own seed — so
//! identical inputs always produce identical plans.
//!
//! Grid, Feature, Columns and Rows partition each display separately, so
//! no tile ever straddles a display edge. Spiral, Diagonal and Random
//! treat the union of all displays as one continuous canvas.

#![allow(dead_code)]

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::display::DisplayRegion;

/// Attempts per tile before the Random pattern gives up and uses the
/// tile's grid cell instead.
const RANDOM_ATTEMPTS_PER_TILE: usize = 40;

/// Axis-aligned tile rectangle in virtual desktop coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self { x: 0.0, y: 0.0, width, height }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered_at(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// True when `other` lies entirely inside this rectangle, edges
    /// included, with half-pixel tolerance for accumulated float error.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x - 0.5
            && other.y >= self.y - 0.5
            && other.x + other.width <= self.x + self.width + 0.5
            && other.y + other.height <= self.y + self.height + 0.5
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Component-wise interpolation toward `other`, `t` in [0, 1].
    pub fn lerp(&self, other: &Rect, t: f32) -> Rect {
        Rect {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            width: self.width + (other.width - self.width) * t,
            height: self.height + (other.height - self.height) * t,
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Wall arrangement. `Feature` carries the tile index that gets the large
/// cell; `Random` carries the sampling seed so plans stay reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Grid,
    Feature { featured: usize },
    Columns,
    Rows,
    Spiral,
    Diagonal,
    Random { seed: u64 },
}

impl Pattern {
    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Grid => PatternKind::Grid,
            Pattern::Feature { .. } => PatternKind::Feature,
            Pattern::Columns => PatternKind::Columns,
            Pattern::Rows => PatternKind::Rows,
            Pattern::Spiral => PatternKind::Spiral,
            Pattern::Diagonal => PatternKind::Diagonal,
            Pattern::Random { .. } => PatternKind::Random,
        }
    }
}

/// Pattern discriminant used for rotation bookkeeping and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    Grid,
    Feature,
    Columns,
    Rows,
    Spiral,
    Diagonal,
    Random,
}

impl PatternKind {
    pub const ALL: [PatternKind; 7] = [
        PatternKind::Grid,
        PatternKind::Feature,
        PatternKind::Columns,
        PatternKind::Rows,
        PatternKind::Spiral,
        PatternKind::Diagonal,
        PatternKind::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Grid => "Grid",
            PatternKind::Feature => "Feature",
            PatternKind::Columns => "Columns",
            PatternKind::Rows => "Rows",
            PatternKind::Spiral => "Spiral",
            PatternKind::Diagonal => "Diagonal",
            PatternKind::Random => "Random",
        }
    }
}

/// One rectangle per tile, indexed by tile id. Later indices draw on top
/// when rects overlap (Spiral, Diagonal, Random).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub pattern: Pattern,
    pub rects: Vec<Rect>,
}

impl LayoutPlan {
    fn empty(pattern: Pattern) -> Self {
        Self { pattern, rects: Vec::new() }
    }
}

/// Compute tile geometry for a pattern. Deterministic: the same inputs
/// always yield the same plan.
pub fn compute_layout(pattern: Pattern, tile_count: usize, displays: &[DisplayRegion]) -> LayoutPlan {
    if tile_count == 0 || displays.is_empty() {
        return LayoutPlan::empty(pattern);
    }

    let rects = match pattern {
        Pattern::Grid => per_display_grid(tile_count, displays),
        Pattern::Feature { featured } => feature_layout(tile_count, displays, featured),
        Pattern::Columns => per_display_strips(tile_count, displays, true),
        Pattern::Rows => per_display_strips(tile_count, displays, false),
        Pattern::Spiral => spiral_layout(tile_count, displays),
        Pattern::Diagonal => diagonal_layout(tile_count, displays),
        Pattern::Random { seed } => random_layout(tile_count, displays, seed),
    };

    LayoutPlan { pattern, rects }
}

/// Bounding box of all display regions.
pub fn union_bounds(displays: &[DisplayRegion]) -> Rect {
    let mut iter = displays.iter();
    let mut bounds = match iter.next() {
        Some(display) => display.bounds(),
        None => return Rect::default(),
    };
    for display in iter {
        bounds = bounds.union(&display.bounds());
    }
    bounds
}

/// Tiles charged to each display: contiguous index blocks, the first
/// `tile_count % displays` displays absorbing the remainder.
fn split_counts(tile_count: usize, displays: usize) -> Vec<usize> {
    let base = tile_count / displays;
    let extra = tile_count % displays;
    (0..displays).map(|i| base + usize::from(i < extra)).collect()
}

/// Near-square (rows, cols) able to hold `n` cells.
fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (rows, cols)
}

/// Append `n` row-major grid cells covering `bounds`.
fn grid_cells(bounds: Rect, n: usize, out: &mut Vec<Rect>) {
    if n == 0 {
        return;
    }
    let (rows, cols) = grid_dims(n);
    let cell_w = bounds.width / cols as f32;
    let cell_h = bounds.height / rows as f32;
    for i in 0..n {
        let row = i / cols;
        let col = i % cols;
        out.push(Rect::new(
            bounds.x + col as f32 * cell_w,
            bounds.y + row as f32 * cell_h,
            cell_w,
            cell_h,
        ));
    }
}

fn per_display_grid(tile_count: usize, displays: &[DisplayRegion]) -> Vec<Rect> {
    let counts = split_counts(tile_count, displays.len());
    let mut rects = Vec::with_capacity(tile_count);
    for (display, count) in displays.iter().zip(counts) {
        grid_cells(display.bounds(), count, &mut rects);
    }
    rects
}

/// Columns (`vertical`) or Rows: equal strips per display.
fn per_display_strips(tile_count: usize, displays: &[DisplayRegion], vertical: bool) -> Vec<Rect> {
    let counts = split_counts(tile_count, displays.len());
    let mut rects = Vec::with_capacity(tile_count);
    for (display, count) in displays.iter().zip(counts) {
        if count == 0 {
            continue;
        }
        let bounds = display.bounds();
        if vertical {
            let strip_w = bounds.width / count as f32;
            for i in 0..count {
                rects.push(Rect::new(bounds.x + i as f32 * strip_w, bounds.y, strip_w, bounds.height));
            }
        } else {
            let strip_h = bounds.height / count as f32;
            for i in 0..count {
                rects.push(Rect::new(bounds.x, bounds.y + i as f32 * strip_h, bounds.width, strip_h));
            }
        }
    }
    rects
}

fn feature_layout(tile_count: usize, displays: &[DisplayRegion], featured: usize) -> Vec<Rect> {
    if tile_count < 2 {
        return per_display_grid(tile_count, displays);
    }
    let featured = featured % tile_count;
    let counts = split_counts(tile_count, displays.len());
    let mut rects = Vec::with_capacity(tile_count);
    let mut start = 0;
    for (display, count) in displays.iter().zip(counts) {
        let owns_featured = featured >= start && featured < start + count;
        if owns_featured && count >= 2 {
            feature_cells(display.bounds(), count, featured - start, &mut rects);
        } else {
            grid_cells(display.bounds(), count, &mut rects);
        }
        start += count;
    }
    rects
}

/// The featured tile takes a 2x2 cell block at the display's top-left;
/// everything else fills the remaining cells row-major. The grid is sized
/// for `n + 3` cells so the block plus `n - 1` singles always fit.
fn feature_cells(bounds: Rect, n: usize, featured: usize, out: &mut Vec<Rect>) {
    let (rows, cols) = grid_dims(n + 3);
    let rows = rows.max(2);
    let cols = cols.max(2);
    let cell_w = bounds.width / cols as f32;
    let cell_h = bounds.height / rows as f32;
    let block = Rect::new(bounds.x, bounds.y, cell_w * 2.0, cell_h * 2.0);

    let mut free = (0..rows * cols)
        .map(|i| (i / cols, i % cols))
        .filter(|&(row, col)| row >= 2 || col >= 2);

    for i in 0..n {
        if i == featured {
            out.push(block);
            continue;
        }
        let (row, col) = match free.next() {
            Some(cell) => cell,
            // Cannot run dry with a grid sized for n + 3 cells
            None => (rows - 1, cols - 1),
        };
        out.push(Rect::new(
            bounds.x + col as f32 * cell_w,
            bounds.y + row as f32 * cell_h,
            cell_w,
            cell_h,
        ));
    }
}

/// Fixed tile size for the free-form patterns, scaled to the canvas and
/// the tile count.
fn free_tile_size(canvas: &Rect, tile_count: usize) -> Vec2 {
    let denom = (tile_count as f32).sqrt().ceil() + 1.0;
    Vec2::new(canvas.width / denom, canvas.height / denom)
}

/// Clamp `rect` so it sits fully inside `bounds`. Assumes `rect` is no
/// larger than `bounds`.
fn clamp_into(mut rect: Rect, bounds: &Rect) -> Rect {
    rect.x = rect.x.clamp(bounds.x, bounds.x + bounds.width - rect.width);
    rect.y = rect.y.clamp(bounds.y, bounds.y + bounds.height - rect.height);
    rect
}

/// Tile centers along an elliptical Archimedean spiral around the canvas
/// center, radius growing with the index.
fn spiral_layout(tile_count: usize, displays: &[DisplayRegion]) -> Vec<Rect> {
    const TURNS: f32 = 2.5;

    let canvas = union_bounds(displays);
    let size = free_tile_size(&canvas, tile_count);
    let center = canvas.center();
    let max_radius_x = (canvas.width - size.x) / 2.0;
    let max_radius_y = (canvas.height - size.y) / 2.0;

    let mut rects = Vec::with_capacity(tile_count);
    for i in 0..tile_count {
        let t = i as f32 / tile_count.max(2) as f32;
        let angle = t * TURNS * std::f32::consts::TAU;
        let tile_center = Vec2::new(
            center.x + angle.cos() * t * max_radius_x,
            center.y + angle.sin() * t * max_radius_y,
        );
        let rect = Rect::centered_at(tile_center, size.x, size.y);
        rects.push(clamp_into(rect, &canvas));
    }
    rects
}

/// Tile centers spaced evenly along the canvas diagonal, top-left to
/// bottom-right.
fn diagonal_layout(tile_count: usize, displays: &[DisplayRegion]) -> Vec<Rect> {
    let canvas = union_bounds(displays);
    let size = free_tile_size(&canvas, tile_count);

    let mut rects = Vec::with_capacity(tile_count);
    for i in 0..tile_count {
        let t = (i as f32 + 0.5) / tile_count as f32;
        let tile_center = Vec2::new(canvas.x + t * canvas.width, canvas.y + t * canvas.height);
        let rect = Rect::centered_at(tile_center, size.x, size.y);
        rects.push(clamp_into(rect, &canvas));
    }
    rects
}

/// Rejection-sampled scatter: random position and a mildly random size
/// per tile, rejecting overlaps with already-placed tiles. A tile that
/// exhausts its attempts falls back to its grid cell so every tile gets a
/// valid rect.
fn random_layout(tile_count: usize, displays: &[DisplayRegion], seed: u64) -> Vec<Rect> {
    let canvas = union_bounds(displays);
    let base = free_tile_size(&canvas, tile_count);
    let fallback = per_display_grid(tile_count, displays);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rects: Vec<Rect> = Vec::with_capacity(tile_count);
    for i in 0..tile_count {
        let mut placed = None;
        for _ in 0..RANDOM_ATTEMPTS_PER_TILE {
            let scale = rng.random_range(0.7..1.2f32);
            let width = (base.x * scale).min(canvas.width);
            let height = (base.y * scale).min(canvas.height);
            let x = canvas.x + rng.random_range(0.0..=(canvas.width - width).max(0.0));
            let y = canvas.y + rng.random_range(0.0..=(canvas.height - height).max(0.0));
            let candidate = Rect::new(x, y, width, height);
            if !rects.iter().any(|r| r.intersects(&candidate)) {
                placed = Some(candidate);
                break;
            }
        }
        rects.push(placed.unwrap_or(fallback[i]));
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_1080p() -> Vec<DisplayRegion> {
        vec![DisplayRegion::new(0, "Main", 0, 0, 1920, 1080)]
    }

    fn side_by_side(count: usize) -> Vec<DisplayRegion> {
        (0..count)
            .map(|i| DisplayRegion::new(i as u32, format!("D{}", i), i as i32 * 1920, 0, 1920, 1080))
            .collect()
    }

    fn assert_inside_one_display(rects: &[Rect], displays: &[DisplayRegion]) {
        for rect in rects {
            let inside = displays.iter().any(|d| d.bounds().encloses(rect));
            assert!(inside, "rect {:?} straddles a display edge", rect);
        }
    }

    #[test]
    fn grid_nine_tiles_single_display() {
        let plan = compute_layout(Pattern::Grid, 9, &single_1080p());
        assert_eq!(plan.rects.len(), 9);
        for rect in &plan.rects {
            assert_eq!(rect.width, 640.0);
            assert_eq!(rect.height, 360.0);
        }
        // Row-major: tile 4 is the center cell
        assert_eq!(plan.rects[4], Rect::new(640.0, 360.0, 640.0, 360.0));
        assert_eq!(plan.rects[8], Rect::new(1280.0, 720.0, 640.0, 360.0));
    }

    #[test]
    fn grid_is_deterministic() {
        let displays = side_by_side(2);
        let a = compute_layout(Pattern::Grid, 7, &displays);
        let b = compute_layout(Pattern::Grid, 7, &displays);
        assert_eq!(a, b);
    }

    #[test]
    fn grid_sixteen_tiles_four_displays() {
        let displays = side_by_side(4);
        let plan = compute_layout(Pattern::Grid, 16, &displays);
        assert_eq!(plan.rects.len(), 16);
        for rect in &plan.rects {
            assert_eq!(rect.width, 960.0);
            assert_eq!(rect.height, 540.0);
        }
        // Four tiles per display, in contiguous index blocks
        for (i, display) in displays.iter().enumerate() {
            let block = &plan.rects[i * 4..(i + 1) * 4];
            for rect in block {
                assert!(display.bounds().encloses(rect));
            }
        }
    }

    #[test]
    fn grid_never_straddles_displays() {
        let displays = side_by_side(3);
        for count in [1, 2, 5, 9, 12, 17] {
            let plan = compute_layout(Pattern::Grid, count, &displays);
            assert_eq!(plan.rects.len(), count);
            assert_inside_one_display(&plan.rects, &displays);
        }
    }

    #[test]
    fn columns_partition_full_height() {
        let plan = compute_layout(Pattern::Columns, 4, &single_1080p());
        assert_eq!(plan.rects.len(), 4);
        for (i, rect) in plan.rects.iter().enumerate() {
            assert_eq!(rect.x, i as f32 * 480.0);
            assert_eq!(rect.width, 480.0);
            assert_eq!(rect.height, 1080.0);
            assert_eq!(rect.y, 0.0);
        }
    }

    #[test]
    fn rows_partition_full_width() {
        let plan = compute_layout(Pattern::Rows, 3, &single_1080p());
        assert_eq!(plan.rects.len(), 3);
        for (i, rect) in plan.rects.iter().enumerate() {
            assert_eq!(rect.y, i as f32 * 360.0);
            assert_eq!(rect.width, 1920.0);
            assert_eq!(rect.height, 360.0);
        }
    }

    #[test]
    fn strips_stay_on_their_display() {
        let displays = side_by_side(2);
        let columns = compute_layout(Pattern::Columns, 6, &displays);
        let rows = compute_layout(Pattern::Rows, 6, &displays);
        assert_inside_one_display(&columns.rects, &displays);
        assert_inside_one_display(&rows.rects, &displays);
    }

    #[test]
    fn feature_tile_gets_largest_area() {
        let plan = compute_layout(Pattern::Feature { featured: 2 }, 6, &single_1080p());
        assert_eq!(plan.rects.len(), 6);
        let featured_area = plan.rects[2].area();
        for (i, rect) in plan.rects.iter().enumerate() {
            if i != 2 {
                assert!(featured_area > rect.area());
            }
        }
    }

    #[test]
    fn feature_cells_do_not_overlap() {
        let plan = compute_layout(Pattern::Feature { featured: 0 }, 8, &single_1080p());
        for i in 0..plan.rects.len() {
            for j in (i + 1)..plan.rects.len() {
                assert!(
                    !plan.rects[i].intersects(&plan.rects[j]),
                    "tiles {} and {} overlap",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn feature_with_one_tile_degrades_to_grid() {
        let displays = single_1080p();
        let feature = compute_layout(Pattern::Feature { featured: 0 }, 1, &displays);
        let grid = compute_layout(Pattern::Grid, 1, &displays);
        assert_eq!(feature.rects, grid.rects);
    }

    #[test]
    fn spiral_stays_in_canvas() {
        let displays = side_by_side(2);
        let canvas = union_bounds(&displays);
        let plan = compute_layout(Pattern::Spiral, 12, &displays);
        assert_eq!(plan.rects.len(), 12);
        for rect in &plan.rects {
            assert!(canvas.encloses(rect), "{:?} escapes the canvas", rect);
        }
    }

    #[test]
    fn diagonal_centers_are_monotonic() {
        let plan = compute_layout(Pattern::Diagonal, 5, &single_1080p());
        let centers: Vec<Vec2> = plan.rects.iter().map(|r| r.center()).collect();
        for pair in centers.windows(2) {
            assert!(pair[1].x >= pair[0].x);
            assert!(pair[1].y >= pair[0].y);
        }
    }

    #[test]
    fn random_is_deterministic_per_seed() {
        let displays = single_1080p();
        let a = compute_layout(Pattern::Random { seed: 99 }, 10, &displays);
        let b = compute_layout(Pattern::Random { seed: 99 }, 10, &displays);
        assert_eq!(a, b);

        let c = compute_layout(Pattern::Random { seed: 100 }, 10, &displays);
        assert_ne!(a.rects, c.rects);
    }

    #[test]
    fn random_tiles_stay_in_canvas() {
        let displays = side_by_side(2);
        let canvas = union_bounds(&displays);
        let plan = compute_layout(Pattern::Random { seed: 7 }, 14, &displays);
        assert_eq!(plan.rects.len(), 14);
        for rect in &plan.rects {
            assert!(canvas.encloses(rect));
        }
    }

    #[test]
    fn random_always_yields_a_rect_per_tile() {
        // Far more tiles than rejection sampling can place without
        // overlap: the grid-cell fallback must cover the remainder.
        let plan = compute_layout(Pattern::Random { seed: 1 }, 60, &single_1080p());
        assert_eq!(plan.rects.len(), 60);
        for rect in &plan.rects {
            assert!(rect.width > 0.0 && rect.height > 0.0);
        }
    }

    #[test]
    fn zero_tiles_or_displays_yield_empty_plans() {
        assert!(compute_layout(Pattern::Grid, 0, &single_1080p()).rects.is_empty());
        assert!(compute_layout(Pattern::Grid, 9, &[]).rects.is_empty());
    }

    #[test]
    fn more_displays_than_tiles() {
        let displays = side_by_side(4);
        let plan = compute_layout(Pattern::Grid, 2, &displays);
        assert_eq!(plan.rects.len(), 2);
        assert_inside_one_display(&plan.rects, &displays);
    }

    #[test]
    fn union_bounds_spans_offset_displays() {
        let displays = vec![
            DisplayRegion::new(0, "A", 0, 0, 1920, 1080),
            DisplayRegion::new(1, "B", 1920, -500, 2560, 1440),
        ];
        let canvas = union_bounds(&displays);
        assert_eq!(canvas.x, 0.0);
        assert_eq!(canvas.y, -500.0);
        assert_eq!(canvas.width, 4480.0);
        assert_eq!(canvas.height, 1580.0);
    }

    #[test]
    fn rect_lerp_midpoint() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 100.0, 200.0, 200.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, Rect::new(50.0, 50.0, 150.0, 150.0));
    }

    #[test]
    fn split_counts_distributes_remainder_first() {
        assert_eq!(split_counts(16, 4), vec![4, 4, 4, 4]);
        assert_eq!(split_counts(10, 4), vec![3, 3, 2, 2]);
        assert_eq!(split_counts(2, 4), vec![1, 1, 0, 0]);
    }

    #[test]
    fn grid_dims_near_square() {
        assert_eq!(grid_dims(9), (3, 3));
        assert_eq!(grid_dims(4), (2, 2));
        assert_eq!(grid_dims(10), (3, 4));
        assert_eq!(grid_dims(1), (1, 1));
    }
}
