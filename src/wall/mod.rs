//! Wall coordination
//!
//! Owns the tiles and every cadence that drives them: the frame advance
//! for animation, the health tick for stream trackers, and the layout
//! clock that starts a fresh arrangement after each hold period. All of
//! it runs cooperatively on the UI thread; per-frame work is O(tile
//! count).

#![allow(dead_code)]

mod surface;

pub use surface::{PlayerEvent, PlayerSurface, TileId};

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::animate::{AnimationCycle, Easing};
use crate::config::WallSettings;
use crate::display::DisplayRegion;
use crate::layout::{compute_layout, Pattern, PatternKind, Rect};
use crate::source::{Source, SourceCatalog, SourceKind};
use crate::stream::{PlayerCommand, ProbeOutcome, RetryPolicy, StreamProbe, StreamState, StreamTracker};

/// How many recently used patterns the rotation avoids.
const PATTERN_MEMORY: usize = 2;

/// One cell of the wall.
#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    /// Current geometry in virtual desktop coordinates
    pub rect: Rect,
    /// What the tile's player holds right now
    pub source: Option<Source>,
}

/// Drives tiles, trackers, and the animation clock.
pub struct WallCoordinator {
    settings: WallSettings,
    displays: Vec<DisplayRegion>,
    tiles: Vec<Tile>,
    /// Tracker per stream-assigned tile, index-aligned with `tiles`
    trackers: Vec<Option<StreamTracker>>,
    catalog: SourceCatalog,
    surface: Box<dyn PlayerSurface>,
    probe: Box<dyn StreamProbe>,
    cycle: Option<AnimationCycle>,
    pattern: Pattern,
    recent_patterns: VecDeque<PatternKind>,
    featured_cursor: usize,
    /// Time left on the current arrangement before the next transition
    hold_remaining: Duration,
    health_accumulator: Duration,
    /// Time since wall start, the `now` handed to trackers
    clock: Duration,
    rng: StdRng,
    shut_down: bool,
}

impl WallCoordinator {
    pub fn new(
        settings: WallSettings,
        displays: Vec<DisplayRegion>,
        catalog: SourceCatalog,
        surface: Box<dyn PlayerSurface>,
        probe: Box<dyn StreamProbe>,
    ) -> Self {
        Self::build(settings, displays, catalog, surface, probe, StdRng::from_os_rng())
    }

    /// Deterministic pattern and easing picks for tests.
    pub fn with_seed(
        settings: WallSettings,
        displays: Vec<DisplayRegion>,
        catalog: SourceCatalog,
        surface: Box<dyn PlayerSurface>,
        probe: Box<dyn StreamProbe>,
        seed: u64,
    ) -> Self {
        Self::build(settings, displays, catalog, surface, probe, StdRng::seed_from_u64(seed))
    }

    fn build(
        settings: WallSettings,
        displays: Vec<DisplayRegion>,
        catalog: SourceCatalog,
        surface: Box<dyn PlayerSurface>,
        probe: Box<dyn StreamProbe>,
        rng: StdRng,
    ) -> Self {
        let tile_count = settings.tile_count();
        let pattern = Pattern::Grid;
        let plan = compute_layout(pattern, tile_count, &displays);

        let tiles: Vec<Tile> = (0..tile_count)
            .map(|i| Tile {
                id: TileId(i),
                rect: plan.rects.get(i).copied().unwrap_or_default(),
                source: None,
            })
            .collect();
        let trackers = vec![None; tile_count];

        let mut coordinator = Self {
            hold_remaining: settings.animation_duration(),
            settings,
            displays,
            tiles,
            trackers,
            catalog,
            surface,
            probe,
            cycle: None,
            pattern,
            recent_patterns: VecDeque::from([PatternKind::Grid]),
            featured_cursor: 0,
            health_accumulator: Duration::ZERO,
            clock: Duration::ZERO,
            rng,
            shut_down: false,
        };

        log::info!(
            "Wall starting with {} tile(s) across {} display(s)",
            coordinator.tiles.len(),
            coordinator.displays.len()
        );
        for index in 0..coordinator.tiles.len() {
            coordinator.surface.create_player(TileId(index));
        }
        coordinator.assign_initial_sources();
        coordinator
    }

    /// Give every tile a source: a stream no other tile holds while the
    /// pool lasts, then local videos, then nothing.
    fn assign_initial_sources(&mut self) {
        let mut assigned_streams: HashSet<String> = HashSet::new();
        for index in 0..self.tiles.len() {
            let tile = TileId(index);
            if let Some(stream) = self.catalog.pick(SourceKind::Stream, &assigned_streams) {
                assigned_streams.insert(stream.locator.clone());
                self.trackers[index] = Some(StreamTracker::new(
                    stream.clone(),
                    RetryPolicy::from_settings(&self.settings),
                ));
                self.load_and_play(tile, stream);
            } else if let Some(local) = self.catalog.pick(SourceKind::Local, &HashSet::new()) {
                self.load_and_play(tile, local);
            } else {
                log::info!("No source available for {}", tile);
            }
        }
        let streaming = self.trackers.iter().filter(|t| t.is_some()).count();
        log::info!(
            "Assigned {} stream tile(s), {} local/idle tile(s)",
            streaming,
            self.tiles.len() - streaming
        );
    }

    /// Advance the wall by one frame. Events are pumped first, then the
    /// health tick when due, then the animation and layout clock — so
    /// health processing always lands before this frame renders.
    pub fn update(&mut self, dt: Duration) {
        if self.shut_down {
            return;
        }
        self.clock += dt;
        self.pump_events();

        self.health_accumulator += dt;
        let health_interval = self.settings.health_interval();
        while self.health_accumulator >= health_interval {
            self.health_accumulator -= health_interval;
            self.tick_health();
        }

        self.advance_frame(dt);
    }

    /// Route surface and probe events to the trackers.
    fn pump_events(&mut self) {
        for event in self.surface.poll_events() {
            if event.tile().0 >= self.tiles.len() {
                log::error!("Surface reported an unknown tile: {:?}", event);
                continue;
            }
            match event {
                PlayerEvent::Started(tile) => self.on_started(tile),
                PlayerEvent::Failed(tile) => self.on_failed(tile),
            }
        }
        for (tile, outcome) in self.probe.poll() {
            if tile.0 >= self.tiles.len() {
                continue;
            }
            self.on_probe_result(tile, outcome);
        }
    }

    fn on_started(&mut self, tile: TileId) {
        let now = self.clock;
        let Some(tracker) = self.trackers[tile.0].as_mut() else {
            return;
        };
        let commands = tracker.on_playback_started(now);
        self.dispatch(tile, commands);
    }

    fn on_failed(&mut self, tile: TileId) {
        let now = self.clock;
        let Some(tracker) = self.trackers[tile.0].as_mut() else {
            self.replace_local_tile(tile);
            return;
        };
        let commands = tracker.on_playback_failed(now, &mut self.catalog);
        self.dispatch(tile, commands);
    }

    fn on_probe_result(&mut self, tile: TileId, outcome: ProbeOutcome) {
        let now = self.clock;
        let Some(tracker) = self.trackers[tile.0].as_mut() else {
            return;
        };
        let commands = tracker.on_probe_result(now, outcome == ProbeOutcome::Alive);
        self.dispatch(tile, commands);
    }

    /// A tile playing plain local content failed; swap in another local.
    fn replace_local_tile(&mut self, tile: TileId) {
        let excluding: HashSet<String> = self.tiles[tile.0]
            .source
            .iter()
            .map(|s| s.locator.clone())
            .collect();
        match self.catalog.pick(SourceKind::Local, &excluding) {
            Some(local) => {
                log::warn!("Local video failed on {}, swapping to {}", tile, local.display_name());
                self.load_and_play(tile, local);
            }
            None => {
                log::warn!("Local video failed on {} with no replacement", tile);
                self.tiles[tile.0].source = None;
                self.surface.stop(tile);
            }
        }
    }

    /// Run every tracker's time-based transitions.
    fn tick_health(&mut self) {
        let now = self.clock;
        for index in 0..self.trackers.len() {
            let Some(tracker) = self.trackers[index].as_mut() else {
                continue;
            };
            let outcome = tracker.tick(now, &mut self.catalog);
            let tile = TileId(index);
            if let Some(url) = outcome.probe_url {
                self.probe.begin(tile, &url);
            }
            self.dispatch(tile, outcome.commands);
        }
    }

    fn load_and_play(&mut self, tile: TileId, source: Source) {
        self.tiles[tile.0].source = Some(source.clone());
        self.surface.load(tile, &source);
        self.surface.play(tile);
    }

    fn dispatch(&mut self, tile: TileId, commands: Vec<PlayerCommand>) {
        for command in commands {
            match command {
                PlayerCommand::Load(source) => {
                    self.tiles[tile.0].source = Some(source.clone());
                    self.surface.load(tile, &source);
                }
                PlayerCommand::Play => self.surface.play(tile),
                PlayerCommand::Stop => self.surface.stop(tile),
            }
        }
    }

    /// Animation step plus the layout clock: holds the current
    /// arrangement for one animation duration, then transitions to the
    /// next over another.
    fn advance_frame(&mut self, dt: Duration) {
        if let Some(cycle) = self.cycle.as_mut() {
            let completed = cycle.advance(dt);
            for (tile, rect) in self.tiles.iter_mut().zip(cycle.rects()) {
                tile.rect = *rect;
            }
            if completed {
                log::debug!("Transition complete, holding {}", self.pattern.kind().name());
                self.cycle = None;
                self.hold_remaining = self.settings.animation_duration();
            }
        } else if self.hold_remaining <= dt {
            self.hold_remaining = Duration::ZERO;
            self.start_next_cycle();
        } else {
            self.hold_remaining -= dt;
        }
    }

    /// Pick the next pattern and animate every tile toward it.
    fn start_next_cycle(&mut self) {
        let pattern = self.next_pattern();
        let plan = compute_layout(pattern, self.tiles.len(), &self.displays);
        if plan.rects.len() != self.tiles.len() {
            log::warn!(
                "Layout for {} produced {} rect(s) for {} tile(s), keeping current arrangement",
                pattern.kind().name(),
                plan.rects.len(),
                self.tiles.len()
            );
            self.hold_remaining = self.settings.animation_duration();
            return;
        }
        let start: Vec<Rect> = self.tiles.iter().map(|t| t.rect).collect();
        let easing = Easing::CYCLE_CURVES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Easing::InOutSine);
        log::info!(
            "Starting {} transition ({} easing)",
            pattern.kind().name(),
            easing.name()
        );
        self.pattern = pattern;
        self.cycle = Some(AnimationCycle::new(
            start,
            plan.rects,
            self.settings.animation_duration_ms,
            easing,
        ));
    }

    /// Rotate patterns, avoiding the most recent few.
    fn next_pattern(&mut self) -> Pattern {
        let candidates: Vec<PatternKind> = PatternKind::ALL
            .iter()
            .copied()
            .filter(|kind| !self.recent_patterns.contains(kind))
            .collect();
        let kind = candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(PatternKind::Grid);
        self.recent_patterns.push_back(kind);
        while self.recent_patterns.len() > PATTERN_MEMORY {
            self.recent_patterns.pop_front();
        }
        match kind {
            PatternKind::Grid => Pattern::Grid,
            PatternKind::Feature => {
                let featured = self.featured_cursor % self.tiles.len().max(1);
                self.featured_cursor = self.featured_cursor.wrapping_add(1);
                Pattern::Feature { featured }
            }
            PatternKind::Columns => Pattern::Columns,
            PatternKind::Rows => Pattern::Rows,
            PatternKind::Spiral => Pattern::Spiral,
            PatternKind::Diagonal => Pattern::Diagonal,
            PatternKind::Random => Pattern::Random { seed: self.rng.random() },
        }
    }

    /// Start the next arrangement now instead of waiting out the hold.
    pub fn request_layout_change(&mut self) {
        if self.shut_down {
            return;
        }
        self.start_next_cycle();
    }

    /// Reassign every tile a fresh source and start a new arrangement
    /// (manual refresh).
    pub fn refresh_sources(&mut self) {
        if self.shut_down {
            return;
        }
        log::info!("Manual refresh: reassigning all sources");
        for index in 0..self.tiles.len() {
            self.surface.stop(TileId(index));
            self.tiles[index].source = None;
            self.trackers[index] = None;
        }
        self.assign_initial_sources();
        self.start_next_cycle();
    }

    /// Apply a new display snapshot: any in-flight transition is
    /// discarded and the layout recomputed immediately. Tracker states
    /// survive the reshape.
    pub fn set_displays(&mut self, displays: Vec<DisplayRegion>) {
        if self.shut_down || displays == self.displays {
            return;
        }
        log::info!("Display set changed: now {} display(s)", displays.len());
        self.displays = displays;
        self.cycle = None;
        let plan = compute_layout(self.pattern, self.tiles.len(), &self.displays);
        for (tile, rect) in self.tiles.iter_mut().zip(&plan.rects) {
            tile.rect = *rect;
        }
        self.hold_remaining = self.settings.animation_duration();
    }

    /// Stop every player and halt all cadences. Idempotent; events
    /// arriving afterwards are dropped.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        log::info!("Shutting down wall");
        self.shut_down = true;
        self.cycle = None;
        for index in 0..self.tiles.len() {
            self.surface.stop(TileId(index));
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn displays(&self) -> &[DisplayRegion] {
        &self.displays
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn is_animating(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Tracker state for a tile; `None` for local-only or idle tiles.
    pub fn tile_state(&self, index: usize) -> Option<StreamState> {
        self.trackers.get(index).and_then(|t| t.as_ref()).map(|t| t.state())
    }

    /// Display name of the stream a tile exists to show, even while a
    /// local substitute is playing.
    pub fn stream_name(&self, index: usize) -> Option<String> {
        self.trackers
            .get(index)
            .and_then(|t| t.as_ref())
            .map(|t| t.stream().display_name())
    }

    pub fn tile_states(&self) -> Vec<Option<StreamState>> {
        self.trackers
            .iter()
            .map(|t| t.as_ref().map(|t| t.state()))
            .collect()
    }

    pub fn stream_count(&self) -> usize {
        self.catalog.count(SourceKind::Stream)
    }

    pub fn local_count(&self) -> usize {
        self.catalog.count(SourceKind::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceCall {
        Create(TileId),
        Load(TileId, Source),
        Play(TileId),
        Stop(TileId),
    }

    #[derive(Default)]
    struct SurfaceState {
        calls: Vec<SurfaceCall>,
        pending: Vec<PlayerEvent>,
    }

    struct FakeSurface(Rc<RefCell<SurfaceState>>);

    impl PlayerSurface for FakeSurface {
        fn create_player(&mut self, tile: TileId) {
            self.0.borrow_mut().calls.push(SurfaceCall::Create(tile));
        }
        fn load(&mut self, tile: TileId, source: &Source) {
            self.0.borrow_mut().calls.push(SurfaceCall::Load(tile, source.clone()));
        }
        fn play(&mut self, tile: TileId) {
            self.0.borrow_mut().calls.push(SurfaceCall::Play(tile));
        }
        fn stop(&mut self, tile: TileId) {
            self.0.borrow_mut().calls.push(SurfaceCall::Stop(tile));
        }
        fn poll_events(&mut self) -> Vec<PlayerEvent> {
            std::mem::take(&mut self.0.borrow_mut().pending)
        }
    }

    #[derive(Default)]
    struct ProbeState {
        requests: Vec<(TileId, String)>,
        pending: Vec<(TileId, ProbeOutcome)>,
    }

    struct FakeProbe(Rc<RefCell<ProbeState>>);

    impl StreamProbe for FakeProbe {
        fn begin(&mut self, tile: TileId, url: &str) {
            self.0.borrow_mut().requests.push((tile, url.to_string()));
        }
        fn poll(&mut self) -> Vec<(TileId, ProbeOutcome)> {
            std::mem::take(&mut self.0.borrow_mut().pending)
        }
    }

    fn test_settings() -> WallSettings {
        WallSettings {
            grid_rows: 1,
            grid_cols: 2,
            animation_duration_ms: 1000,
            ..WallSettings::default()
        }
    }

    fn one_display() -> Vec<DisplayRegion> {
        vec![DisplayRegion::new(0, "Main", 0, 0, 1920, 1080)]
    }

    fn wall(
        streams: usize,
        locals: usize,
    ) -> (WallCoordinator, Rc<RefCell<SurfaceState>>, Rc<RefCell<ProbeState>>) {
        wall_with_settings(streams, locals, test_settings())
    }

    fn wall_with_settings(
        streams: usize,
        locals: usize,
        settings: WallSettings,
    ) -> (WallCoordinator, Rc<RefCell<SurfaceState>>, Rc<RefCell<ProbeState>>) {
        let mut sources = Vec::new();
        for i in 0..streams {
            sources.push(Source::stream(format!("https://example.com/s{}.m3u8", i)));
        }
        for i in 0..locals {
            sources.push(Source::local(format!("/videos/v{}.mp4", i)));
        }
        let catalog = SourceCatalog::with_seed(sources, 5);
        let surface_state = Rc::new(RefCell::new(SurfaceState::default()));
        let probe_state = Rc::new(RefCell::new(ProbeState::default()));
        let coordinator = WallCoordinator::with_seed(
            settings,
            one_display(),
            catalog,
            Box::new(FakeSurface(surface_state.clone())),
            Box::new(FakeProbe(probe_state.clone())),
            9,
        );
        (coordinator, surface_state, probe_state)
    }

    fn loads(state: &Rc<RefCell<SurfaceState>>) -> Vec<(TileId, Source)> {
        state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Load(tile, source) => Some((*tile, source.clone())),
                _ => None,
            })
            .collect()
    }

    fn fail_tile(coordinator: &mut WallCoordinator, state: &Rc<RefCell<SurfaceState>>, tile: TileId) {
        state.borrow_mut().pending.push(PlayerEvent::Failed(tile));
        coordinator.update(Duration::ZERO);
    }

    fn stream_tile(coordinator: &WallCoordinator) -> TileId {
        let index = (0..coordinator.tiles().len())
            .find(|&i| coordinator.tile_state(i).is_some())
            .expect("no stream tile");
        TileId(index)
    }

    #[test]
    fn initial_assignment_creates_loads_and_plays() {
        let (coordinator, surface, _) = wall(2, 0);
        let calls = surface.borrow();
        assert!(calls.calls.contains(&SurfaceCall::Create(TileId(0))));
        assert!(calls.calls.contains(&SurfaceCall::Create(TileId(1))));
        drop(calls);

        let loaded = loads(&surface);
        assert_eq!(loaded.len(), 2);
        // Unique streams while the pool lasts
        assert_ne!(loaded[0].1.locator, loaded[1].1.locator);
        assert_eq!(coordinator.tile_states().iter().filter(|s| s.is_some()).count(), 2);
    }

    #[test]
    fn exhausted_stream_pool_fills_with_locals() {
        let (coordinator, surface, _) = wall(1, 2);
        let loaded = loads(&surface);
        assert_eq!(loaded.len(), 2);
        let kinds: Vec<SourceKind> = loaded.iter().map(|(_, s)| s.kind).collect();
        assert!(kinds.contains(&SourceKind::Stream));
        assert!(kinds.contains(&SourceKind::Local));
        // Only the stream tile has a tracker
        assert_eq!(coordinator.tile_states().iter().filter(|s| s.is_some()).count(), 1);
    }

    #[test]
    fn no_sources_means_idle_tiles_without_loads() {
        let (coordinator, surface, _) = wall(0, 0);
        assert_eq!(coordinator.tiles().len(), 2);
        assert!(loads(&surface).is_empty());
        for tile in coordinator.tiles() {
            assert!(tile.source.is_none());
        }
    }

    #[test]
    fn player_budget_caps_the_tile_count() {
        let settings = WallSettings {
            grid_rows: 3,
            grid_cols: 3,
            max_active_players: 4,
            ..WallSettings::default()
        };
        let (coordinator, _, _) = wall_with_settings(0, 0, settings);
        assert_eq!(coordinator.tiles().len(), 4);
    }

    #[test]
    fn repeated_failures_swap_the_tile_to_a_local() {
        let (mut coordinator, surface, _) = wall(1, 2);
        let tile = stream_tile(&coordinator);

        for _ in 0..3 {
            fail_tile(&mut coordinator, &surface, tile);
        }

        assert_eq!(coordinator.tile_state(tile.0), Some(StreamState::FallenBack));
        let last_load = loads(&surface).pop().expect("no load");
        assert_eq!(last_load.0, tile);
        assert_eq!(last_load.1.kind, SourceKind::Local);
        assert_eq!(
            coordinator.tiles()[tile.0].source.as_ref().map(|s| s.kind),
            Some(SourceKind::Local)
        );
    }

    #[test]
    fn stream_death_without_locals_stops_the_player() {
        let (mut coordinator, surface, _) = wall(1, 0);
        let tile = stream_tile(&coordinator);

        for _ in 0..3 {
            fail_tile(&mut coordinator, &surface, tile);
        }

        assert_eq!(coordinator.tile_state(tile.0), Some(StreamState::Failed));
        assert!(surface.borrow().calls.contains(&SurfaceCall::Stop(tile)));
        // The dead stream stays assigned to the stopped tile
        assert_eq!(
            coordinator.tiles()[tile.0].source.as_ref().map(|s| s.kind),
            Some(SourceKind::Stream)
        );
    }

    #[test]
    fn recovery_probe_round_trip() {
        let (mut coordinator, surface, probe) = wall(1, 2);
        let tile = stream_tile(&coordinator);
        let original = coordinator.tiles()[tile.0].source.clone().expect("source");

        for _ in 0..3 {
            fail_tile(&mut coordinator, &surface, tile);
        }
        assert_eq!(coordinator.tile_state(tile.0), Some(StreamState::FallenBack));

        // Ride the health tick past the recovery deadline
        coordinator.update(Duration::from_secs(61));
        assert_eq!(coordinator.tile_state(tile.0), Some(StreamState::Recovering));
        let requests = probe.borrow().requests.clone();
        assert_eq!(requests, vec![(tile, original.locator.clone())]);

        // Probe verdict: alive. The original stream returns to the tile.
        probe.borrow_mut().pending.push((tile, ProbeOutcome::Alive));
        coordinator.update(Duration::ZERO);
        assert_eq!(coordinator.tile_state(tile.0), Some(StreamState::Healthy));
        let last_load = loads(&surface).pop().expect("no load");
        assert_eq!(last_load.1, original);
    }

    #[test]
    fn layout_clock_holds_then_animates() {
        let (mut coordinator, _, _) = wall(0, 0);
        assert!(!coordinator.is_animating());

        coordinator.update(Duration::from_millis(500));
        assert!(!coordinator.is_animating());

        coordinator.update(Duration::from_millis(500));
        assert!(coordinator.is_animating(), "hold elapsed, transition should start");

        coordinator.update(Duration::from_millis(1000));
        assert!(!coordinator.is_animating(), "transition should have completed");
    }

    #[test]
    fn pattern_rotation_avoids_recent_patterns() {
        let (mut coordinator, _, _) = wall(0, 0);
        let mut kinds = vec![coordinator.pattern().kind()];
        for _ in 0..8 {
            coordinator.request_layout_change();
            kinds.push(coordinator.pattern().kind());
        }
        for window in kinds.windows(3) {
            assert_ne!(window[0], window[1]);
            assert_ne!(window[1], window[2]);
            assert_ne!(window[0], window[2]);
        }
    }

    #[test]
    fn display_change_discards_cycle_and_keeps_tracker_state() {
        let (mut coordinator, surface, _) = wall(1, 2);
        let tile = stream_tile(&coordinator);
        for _ in 0..3 {
            fail_tile(&mut coordinator, &surface, tile);
        }
        coordinator.request_layout_change();
        assert!(coordinator.is_animating());

        let displays = vec![
            DisplayRegion::new(0, "A", 0, 0, 1920, 1080),
            DisplayRegion::new(1, "B", 1920, 0, 1920, 1080),
        ];
        coordinator.set_displays(displays.clone());
        assert!(!coordinator.is_animating());
        assert_eq!(coordinator.tile_state(tile.0), Some(StreamState::FallenBack));

        // Tiles land inside the new virtual desktop immediately
        let canvas = crate::layout::union_bounds(&displays);
        for tile in coordinator.tiles() {
            assert!(
                canvas.encloses(&tile.rect),
                "tile rect {:?} outside new displays",
                tile.rect
            );
        }
    }

    #[test]
    fn shutdown_stops_players_and_freezes_the_wall() {
        let (mut coordinator, surface, _) = wall(1, 1);
        coordinator.shutdown();
        {
            let state = surface.borrow();
            let stops = state
                .calls
                .iter()
                .filter(|c| matches!(c, SurfaceCall::Stop(_)))
                .count();
            assert_eq!(stops, 2);
        }

        // Events after shutdown are ignored
        let before = surface.borrow().calls.len();
        surface.borrow_mut().pending.push(PlayerEvent::Failed(TileId(0)));
        coordinator.update(Duration::from_secs(5));
        assert_eq!(surface.borrow().calls.len(), before);
        assert!(!coordinator.is_animating());
    }

    #[test]
    fn manual_refresh_reassigns_sources() {
        let (mut coordinator, surface, _) = wall(2, 0);
        let before = loads(&surface).len();
        coordinator.refresh_sources();
        assert!(loads(&surface).len() > before);
        assert!(coordinator.is_animating());
    }

    #[test]
    fn local_tile_failure_swaps_to_another_local() {
        let (mut coordinator, surface, _) = wall(0, 3);
        let tile = TileId(0);
        let first = coordinator.tiles()[0].source.clone().expect("source");
        fail_tile(&mut coordinator, &surface, tile);
        let replacement = coordinator.tiles()[0].source.clone().expect("replacement");
        assert_ne!(first, replacement);
        assert_eq!(replacement.kind, SourceKind::Local);
    }

    #[test]
    fn unknown_tile_events_are_dropped() {
        let (mut coordinator, surface, _) = wall(1, 1);
        let before = surface.borrow().calls.len();
        surface.borrow_mut().pending.push(PlayerEvent::Failed(TileId(99)));
        coordinator.update(Duration::ZERO);
        assert_eq!(surface.borrow().calls.len(), before);
    }
}
