//! Scenario runner - drives a mounted route panel through feed scenarios.
//!
//! Every scenario mounts a `RoutePanel` on an in-memory `LayerSet`, feeds it
//! frames from a seeded `Fleet`, and checks after each cycle that the
//! surface agrees with the controller. At the end the full action log is
//! replayed, every action applied twice, onto a fresh surface which must
//! end up identical.

use crate::exporter::{CycleTrigger, SimCycle, SimExport};
use crate::fleet::Fleet;
use crate::scenarios::ScenarioId;

use tracing::{debug, info, warn};
use trackmap_core::geometry::{duration_secs, format_duration};
use trackmap_core::{FrameUpdate, MapOptions, Observation, PanelConfig, RawFrame, RoutePanel, TrackMapError};
use trackmap_env::{FrameRevision, LayerSet, PanelId, RenderSurface, Selection, SyncAction};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Update cycles executed, mount excluded
    pub cycles: u64,

    /// Entities in the last aggregated state
    pub final_entity_count: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Actions applied to the surface
    pub actions_applied: u64,

    /// `AnimateCenterTo` actions
    pub recenters: u64,

    /// Route layers built
    pub route_builds: u64,

    /// Overlay layers added
    pub overlay_adds: u64,

    /// Selection resets after empty frames
    pub selection_resets: u64,

    /// Cycles aborted on a malformed frame
    pub aborted_cycles: u64,
}

impl ScenarioMetrics {
    fn record(&mut self, actions: &[SyncAction]) {
        self.actions_applied += actions.len() as u64;
        for action in actions {
            match action {
                SyncAction::AnimateCenterTo { .. } => self.recenters += 1,
                SyncAction::AddRouteLayer { .. } => self.route_builds += 1,
                SyncAction::AddOverlayLayer { .. } => self.overlay_adds += 1,
                SyncAction::ResetSelection { .. } => self.selection_resets += 1,
                _ => {}
            }
        }
    }
}

fn ensure(condition: bool, reason: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason())
    }
}

fn count(actions: &[SyncAction], matches: impl Fn(&SyncAction) -> bool) -> usize {
    actions.iter().filter(|a| matches(a)).count()
}

fn is_recenter(action: &SyncAction) -> bool {
    matches!(action, SyncAction::AnimateCenterTo { .. })
}

// ============================================================================
// SESSION (one mounted panel + its feed)
// ============================================================================

/// A mounted panel, the fleet feeding it and everything recorded so far.
struct Session {
    panel: RoutePanel<LayerSet>,
    fleet: Fleet,
    config: PanelConfig,
    options: MapOptions,

    /// Revision of the last frame delivered by the feed
    revision: FrameRevision,

    /// Rows of the last frame the panel accepted
    last_rows: usize,

    export: SimExport,
    metrics: ScenarioMetrics,
}

impl Session {
    /// Ticks the fleet `ticks` times, then mounts on the resulting frame.
    fn start(runner: &ScenarioRunner, scenario: ScenarioId, ticks: usize) -> Result<Self, String> {
        // Fleet seed kept apart from the panel id seed
        let fleet_seed = runner.seed.wrapping_mul(0x9e3779b97f4a7c15);
        let mut fleet = Fleet::new(fleet_seed, runner.vehicles, runner.options.center());
        for _ in 0..ticks {
            fleet.tick();
        }

        let frame = fleet.frame();
        let panel = RoutePanel::mount_with_id(
            PanelId::from_seed(runner.seed),
            LayerSet::new(),
            runner.config.clone(),
            &runner.options,
            FrameUpdate::new(FrameRevision(0), &frame),
        )
        .map_err(|e| format!("mount failed: {}", e))?;

        let mut session = Self {
            panel,
            fleet,
            config: runner.config.clone(),
            options: runner.options.clone(),
            revision: FrameRevision(0),
            last_rows: frame.len(),
            export: SimExport::new(scenario.name(), runner.seed, runner.vehicles),
            metrics: ScenarioMetrics::default(),
        };

        let actions = session.panel.surface().log().to_vec();
        session.record(CycleTrigger::Mount, frame.len(), Ok(actions.as_slice()));
        session.verify()?;
        Ok(session)
    }

    fn record(&mut self, trigger: CycleTrigger, rows: usize, outcome: Result<&[SyncAction], &TrackMapError>) {
        let (actions, error) = match outcome {
            Ok(actions) => {
                self.metrics.record(actions);
                (actions.to_vec(), None)
            }
            Err(e) => {
                self.metrics.aborted_cycles += 1;
                (Vec::new(), Some(e.to_string()))
            }
        };

        debug!(
            cycle = self.panel.cycles(),
            ?trigger,
            rows,
            actions = actions.len(),
            "cycle recorded"
        );

        self.export.add_cycle(SimCycle {
            cycle: self.panel.cycles(),
            trigger,
            revision: self.panel.controller().revision().0,
            rows,
            actions,
            error,
        });
    }

    /// Delivers a frame under a new revision.
    fn deliver(&mut self, frame: &RawFrame) -> trackmap_core::Result<Vec<SyncAction>> {
        self.revision = self.revision.next();
        let result = self.panel.update(FrameUpdate::new(self.revision, frame), &self.options);

        match &result {
            Ok(actions) => {
                self.last_rows = frame.len();
                self.record(CycleTrigger::Frame, frame.len(), Ok(actions.as_slice()));
            }
            Err(e) => self.record(CycleTrigger::Frame, frame.len(), Err(e)),
        }
        result
    }

    /// Delivers a frame that must be accepted.
    fn feed(&mut self, frame: &RawFrame) -> Result<Vec<SyncAction>, String> {
        let actions = self
            .deliver(frame)
            .map_err(|e| format!("{} rejected: {}", self.revision, e))?;
        self.verify()?;
        Ok(actions)
    }

    /// Advances the fleet one tick and feeds its window.
    fn tick(&mut self) -> Result<Vec<SyncAction>, String> {
        self.fleet.tick();
        let frame = self.fleet.frame();
        self.feed(&frame)
    }

    fn select(&mut self, selection: Selection) -> Result<Vec<SyncAction>, String> {
        let actions = self.panel.select(selection).map_err(|e| e.to_string())?;
        self.record(CycleTrigger::Select, self.last_rows, Ok(actions.as_slice()));
        self.verify()?;
        Ok(actions)
    }

    fn set_options(&mut self, options: MapOptions) -> Result<Vec<SyncAction>, String> {
        self.options = options;
        let actions = self.panel.set_options(&self.options).map_err(|e| e.to_string())?;
        self.record(CycleTrigger::Options, self.last_rows, Ok(actions.as_slice()));
        self.verify()?;
        Ok(actions)
    }

    /// Checks the surface agrees with the controller and the options.
    fn verify(&self) -> Result<(), String> {
        let layers = self.panel.surface();
        let controller = self.panel.controller();

        ensure(layers.base_url() == Some(self.config.base_tile_url.as_str()), || {
            "base layer missing".to_string()
        })?;

        match (layers.overlay(), self.options.has_overlay()) {
            (Some(overlay), true) => ensure(overlay.url == self.options.tile_url, || {
                format!("overlay shows {} but tile_url is {}", overlay.url, self.options.tile_url)
            })?,
            (None, false) => {}
            (overlay, _) => {
                return Err(format!(
                    "overlay {:?} does not match tile_url {:?}",
                    overlay.map(|o| &o.url),
                    self.options.tile_url
                ))
            }
        }

        ensure(layers.route().is_some() == controller.has_route(), || {
            "route layer presence out of sync".to_string()
        })?;
        if let Some(route) = layers.route() {
            ensure(Some(route.key.as_str()) == controller.selection().key(), || {
                format!("route layer shows {} but selection is {}", route.key, controller.selection())
            })?;
            ensure(route.z_index == self.config.route_z_index, || {
                format!("route layer at z-index {}", route.z_index)
            })?;
        }

        if !controller.state().is_empty() {
            ensure(layers.available_keys() == controller.state().key_list().as_slice(), || {
                "selector keys differ from aggregated keys".to_string()
            })?;
        }

        if let Some(view) = layers.view() {
            let expected = self.options.zoom_level.min(view.max_zoom);
            ensure(view.zoom == expected, || format!("view zoom {} expected {}", view.zoom, expected))?;
        }

        Ok(())
    }

    /// Replays the action log, each action twice, onto a fresh surface.
    fn verify_replay(&self) -> Result<(), String> {
        let layers = self.panel.surface();
        let mut replay = LayerSet::new();
        replay.bind(self.panel.id()).map_err(|e| e.to_string())?;

        for action in layers.log() {
            replay.apply(action).map_err(|e| e.to_string())?;
            replay.apply(action).map_err(|e| e.to_string())?;
        }

        ensure(
            replay.view() == layers.view()
                && replay.base_url() == layers.base_url()
                && replay.overlay() == layers.overlay()
                && replay.route() == layers.route()
                && replay.available_keys() == layers.available_keys()
                && replay.selection() == layers.selection(),
            || "replayed surface differs from live surface".to_string(),
        )
    }
}

// ============================================================================
// RUNNER
// ============================================================================

/// Runs feed scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Vehicles in the fleet
    vehicles: usize,

    /// Frames delivered per scenario
    frames: usize,

    /// Options the panel mounts with
    options: MapOptions,

    config: PanelConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, vehicles: usize) -> Self {
        Self {
            seed,
            vehicles: vehicles.max(1),
            frames: 20,
            options: MapOptions::default(),
            config: PanelConfig::default(),
        }
    }

    /// Sets the number of frames per scenario.
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames.max(1);
        self
    }

    /// Sets the options the panel mounts with.
    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the panel configuration.
    pub fn with_config(mut self, config: PanelConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_with_export(scenario).0
    }

    /// Runs a scenario and also returns the recorded cycles.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, SimExport) {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let mount_ticks = match scenario {
            ScenarioId::FirstArrival => 0,
            _ => 2,
        };

        let (outcome, mut export, metrics, cycles, entities) = match Session::start(self, scenario, mount_ticks) {
            Ok(mut session) => {
                let outcome = match scenario {
                    ScenarioId::FirstArrival => self.run_first_arrival(&mut session),
                    ScenarioId::DataDropout => self.run_data_dropout(&mut session),
                    ScenarioId::SelectionChurn => self.run_selection_churn(&mut session),
                    ScenarioId::TileToggle => self.run_tile_toggle(&mut session),
                    ScenarioId::OutOfOrder => self.run_out_of_order(&mut session),
                    ScenarioId::MalformedFeed => self.run_malformed_feed(&mut session),
                }
                .and_then(|_| session.verify_replay());

                let cycles = session.panel.cycles();
                let entities = session.panel.controller().state().len();
                (outcome, session.export, session.metrics, cycles, entities)
            }
            Err(reason) => (
                Err(reason),
                SimExport::new(scenario.name(), self.seed, self.vehicles),
                ScenarioMetrics::default(),
                0,
                0,
            ),
        };

        let failure_reason = outcome.err();
        if let Some(reason) = &failure_reason {
            warn!("Scenario {} failed: {}", scenario.name(), reason);
        }
        export.finalize(failure_reason.is_none(), failure_reason.clone());

        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            cycles,
            final_entity_count: entities,
            failure_reason,
            metrics,
        };
        (result, export)
    }

    /// TM-001: FirstArrival - recenter exactly once when data first appears.
    fn run_first_arrival(&self, s: &mut Session) -> Result<(), String> {
        let view = s.panel.surface().view().ok_or("no view after mount")?;
        ensure(view.center == self.options.center(), || {
            format!("empty mount centered on {:?}", view.center)
        })?;

        for i in 0..self.frames {
            s.fleet.tick();
            let frame = s.fleet.frame();
            let first = s.fleet.observations().first().map(|o| (o.lon, o.lat));

            let actions = s.feed(&frame)?;
            let recenters: Vec<&SyncAction> = actions.iter().filter(|a| is_recenter(a)).collect();

            if i == 0 {
                ensure(recenters.len() == 1, || format!("{} recenters on first data", recenters.len()))?;
                let view = s.panel.surface().view().ok_or("view lost")?;
                ensure(Some((view.center.lon, view.center.lat)) == first, || {
                    "recenter target is not the first row".to_string()
                })?;
                ensure(
                    view.last_animation.map(|a| a.duration_ms) == Some(self.config.recenter_duration_ms),
                    || "recenter animation duration".to_string(),
                )?;
            } else {
                ensure(recenters.is_empty(), || format!("frame {} recentered again", i))?;
            }
        }

        ensure(s.panel.surface().available_keys() == s.fleet.keys().as_slice(), || {
            "selector keys not in first-seen order".to_string()
        })?;
        ensure(s.metrics.recenters == 1, || format!("{} recenters total", s.metrics.recenters))
    }

    /// TM-002: DataDropout - empty frames clear route and selection.
    fn run_data_dropout(&self, s: &mut Session) -> Result<(), String> {
        let mut expected_recenters = 0;

        for i in 1..=self.frames {
            if i % 4 == 0 {
                let actions = s.feed(&RawFrame::empty())?;
                ensure(
                    actions
                        == vec![
                            SyncAction::ClearRouteLayer,
                            SyncAction::ResetSelection {
                                selection: Selection::None,
                            },
                        ],
                    || format!("empty frame emitted {:?}", actions),
                )?;
                ensure(s.panel.surface().route().is_none(), || "route survived dropout".to_string())?;
                ensure(s.panel.surface().selection().is_none(), || {
                    "selector not reset".to_string()
                })?;
                ensure(s.panel.selection().is_none(), || "selection not reset".to_string())?;
                continue;
            }

            let recovering = s.last_rows == 0;
            let actions = s.tick()?;
            let recenters = count(&actions, is_recenter);
            ensure(recenters == usize::from(recovering), || {
                format!("frame {} recentered {} times (recovering: {})", i, recenters, recovering)
            })?;
            if recovering {
                expected_recenters += 1;
            }

            if s.panel.selection().is_none() {
                let key = s.fleet.random_key().ok_or("fleet is empty")?;
                let actions = s.select(Selection::Key(key.clone()))?;
                ensure(
                    matches!(actions.as_slice(), [SyncAction::AddRouteLayer { key: k, .. }] if *k == key),
                    || format!("select after reset emitted {:?}", actions),
                )?;
            }
        }

        ensure(s.metrics.recenters == expected_recenters, || {
            format!("{} recenters, expected {}", s.metrics.recenters, expected_recenters)
        })
    }

    /// TM-003: SelectionChurn - one remove and one add per swap.
    fn run_selection_churn(&self, s: &mut Session) -> Result<(), String> {
        for i in 0..self.frames {
            s.tick()?;

            let key = s.fleet.random_key().ok_or("fleet is empty")?;
            let had_route = s.panel.controller().has_route();
            let unchanged = s.panel.selection().key() == Some(key.as_str());

            let actions = s.select(Selection::Key(key.clone()))?;
            if unchanged {
                ensure(actions.is_empty(), || format!("reselecting {} emitted {:?}", key, actions))?;
            } else {
                ensure(actions.len() == usize::from(had_route) + 1, || {
                    format!("swap to {} emitted {} actions", key, actions.len())
                })?;
                if had_route {
                    ensure(actions[0] == SyncAction::RemoveRouteLayer, || "swap did not remove first".to_string())?;
                }

                let route = s.panel.controller().state().route(&key).ok_or("selected key not aggregated")?;
                match actions.last() {
                    Some(SyncAction::AddRouteLayer { key: k, geometry, z_index }) => {
                        ensure(*k == key && *z_index == self.config.route_z_index, || {
                            format!("added route {} at {}", k, z_index)
                        })?;
                        ensure(geometry.marker_count() == route.len(), || "marker count".to_string())?;
                        ensure(geometry.segment_count() == route.len().saturating_sub(1), || {
                            "segment count".to_string()
                        })?;
                    }
                    other => return Err(format!("swap ended with {:?}", other)),
                }
            }

            if i % 5 == 4 {
                let actions = s.select(Selection::Key("not-a-vehicle".to_string()))?;
                ensure(actions == vec![SyncAction::RemoveRouteLayer], || {
                    format!("absent key emitted {:?}", actions)
                })?;
                ensure(s.panel.surface().route().is_none(), || "absent key left a route".to_string())?;
            }
        }

        let had_route = s.panel.controller().has_route();
        let actions = s.select(Selection::None)?;
        ensure(actions.len() == usize::from(had_route), || {
            format!("deselect emitted {:?}", actions)
        })
    }

    /// TM-004: TileToggle - overlay swaps and zoom edits.
    fn run_tile_toggle(&self, s: &mut Session) -> Result<(), String> {
        let urls = [
            "",
            "https://tiles.example.org/a/{z}/{x}/{y}.png",
            "https://tiles.example.org/b/{z}/{x}/{y}.png",
            "",
            "https://tiles.example.org/a/{z}/{x}/{y}.png",
        ];

        for i in 0..self.frames {
            let previous = s.options.clone();
            let mut options = previous.clone();
            options.tile_url = urls[i % urls.len()].to_string();
            options.zoom_level = (previous.max_zoom - (i % 4) as f64).max(0.0);

            let mut expected = Vec::new();
            if options.tile_url != previous.tile_url {
                if previous.has_overlay() {
                    expected.push(SyncAction::RemoveOverlayLayer);
                }
                if options.has_overlay() {
                    expected.push(SyncAction::AddOverlayLayer {
                        url: options.tile_url.clone(),
                        z_index: self.config.overlay_z_index,
                    });
                }
            }
            if options.zoom_level != previous.zoom_level {
                expected.push(SyncAction::SetZoom {
                    zoom: options.zoom_level,
                });
            }

            let actions = s.set_options(options)?;
            ensure(actions == expected, || {
                format!("options step {} emitted {:?}, expected {:?}", i, actions, expected)
            })?;

            let actions = s.tick()?;
            ensure(
                !actions.iter().any(|a| {
                    matches!(
                        a,
                        SyncAction::AddOverlayLayer { .. } | SyncAction::RemoveOverlayLayer | SyncAction::SetZoom { .. }
                    )
                }),
                || "frame touched overlay or zoom".to_string(),
            )?;
        }

        Ok(())
    }

    /// TM-005: OutOfOrder - shuffled rows build routes in row order.
    fn run_out_of_order(&self, s: &mut Session) -> Result<(), String> {
        for _ in 0..self.frames {
            s.fleet.tick();
            let rows = s.fleet.shuffled_observations();
            s.feed(&RawFrame::from_observations(&rows))?;

            let mut first_seen: Vec<&str> = Vec::new();
            for row in &rows {
                if !first_seen.contains(&row.key.as_str()) {
                    first_seen.push(&row.key);
                }
            }
            ensure(s.panel.surface().available_keys().iter().map(String::as_str).eq(first_seen.iter().copied()), || {
                "keys not in first-seen order".to_string()
            })?;

            let key = s.fleet.random_key().ok_or("fleet is empty")?;
            // Force a rebuild against this frame
            s.select(Selection::None)?;
            s.select(Selection::Key(key.clone()))?;

            let own: Vec<&Observation> = rows.iter().filter(|r| r.key == key).collect();
            let expected: Vec<String> = own
                .windows(2)
                .map(|pair| format_duration(duration_secs(pair[0].timestamp, pair[1].timestamp)))
                .collect();

            let route = s.panel.surface().route().ok_or("route missing")?;
            // Hover text as the surface sees it, in feature order
            let labels: Vec<&str> = route.geometry.features().filter_map(|f| f.duration_label()).collect();
            ensure(labels == expected, || format!("labels {:?}, expected {:?}", labels, expected))?;
        }
        Ok(())
    }

    /// TM-006: MalformedFeed - broken frames change nothing.
    fn run_malformed_feed(&self, s: &mut Session) -> Result<(), String> {
        if let Some(key) = s.fleet.random_key() {
            s.select(Selection::Key(key))?;
        }

        let mut broken = 0;
        for i in 0..self.frames {
            if i % 3 != 2 {
                s.tick()?;
                continue;
            }

            s.fleet.tick();
            let frame = if i % 2 == 0 {
                s.fleet.truncated_frame(4)
            } else {
                // Declares one row more than the columns hold
                let mut frame = s.fleet.frame();
                frame.length += 1;
                frame
            };

            let log_len = s.panel.surface().log().len();
            let state = s.panel.controller().state().clone();
            let revision = s.panel.controller().revision();

            match s.deliver(&frame) {
                Err(e) if e.is_structural() => {}
                other => return Err(format!("malformed frame accepted: {:?}", other.map(|a| a.len()))),
            }
            broken += 1;

            ensure(s.panel.surface().log().len() == log_len, || "aborted cycle emitted actions".to_string())?;
            ensure(s.panel.controller().state() == &state, || "aborted cycle changed state".to_string())?;
            ensure(s.panel.controller().revision() == revision, || "aborted cycle moved revision".to_string())?;
            s.verify()?;
        }

        ensure(s.metrics.aborted_cycles == broken, || {
            format!("{} aborted cycles, expected {}", s.metrics.aborted_cycles, broken)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_pass() {
        let runner = ScenarioRunner::new(42, 6).with_frames(12);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
        }
    }

    #[test]
    fn test_first_arrival_counts() {
        let result = ScenarioRunner::new(7, 4).with_frames(5).run(ScenarioId::FirstArrival);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.recenters, 1);
        assert_eq!(result.cycles, 5);
        assert_eq!(result.final_entity_count, 4);
    }

    #[test]
    fn test_malformed_feed_counts_aborts() {
        let result = ScenarioRunner::new(3, 3).with_frames(9).run(ScenarioId::MalformedFeed);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.aborted_cycles, 3);
    }

    #[test]
    fn test_export_records_every_cycle() {
        let (result, export) = ScenarioRunner::new(5, 3).with_frames(8).run_with_export(ScenarioId::DataDropout);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(export.passed);
        assert_eq!(export.cycles[0].trigger, CycleTrigger::Mount);
        assert_eq!(export.action_count() as u64, result.metrics.actions_applied);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let runner = ScenarioRunner::new(99, 5).with_frames(6);
        let (_, a) = runner.run_with_export(ScenarioId::SelectionChurn);
        let (_, b) = runner.run_with_export(ScenarioId::SelectionChurn);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_overlay_configured_at_mount() {
        let options = MapOptions {
            tile_url: "https://tiles.example.org/base/{z}/{x}/{y}.png".to_string(),
            ..MapOptions::default()
        };
        let result = ScenarioRunner::new(1, 2)
            .with_frames(6)
            .with_options(options)
            .run(ScenarioId::TileToggle);
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[test]
    fn test_all_scenarios_over_seeds() {
        for seed in 1..=5 {
            let runner = ScenarioRunner::new(seed, 5).with_frames(16);
            for scenario in ScenarioId::all() {
                let result = runner.run(scenario);
                assert!(result.passed, "{} seed={} failed: {:?}", scenario, seed, result.failure_reason);
            }
        }
    }

    #[test]
    fn test_single_vehicle_fleet() {
        let runner = ScenarioRunner::new(11, 1).with_frames(10);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
            assert!(result.final_entity_count <= 1);
        }
    }

    #[test]
    fn test_dropout_export_shape() {
        let (result, export) = ScenarioRunner::new(8, 4)
            .with_frames(8)
            .run_with_export(ScenarioId::DataDropout);
        assert!(result.passed, "{:?}", result.failure_reason);

        let empty_cycles = export
            .cycles
            .iter()
            .filter(|c| c.trigger == CycleTrigger::Frame && c.rows == 0)
            .count();
        assert_eq!(empty_cycles, 2);
        assert_eq!(result.metrics.selection_resets, 2);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["scenario"], "data_dropout");
        assert_eq!(json["passed"], true);
    }

    #[test]
    fn test_low_zoom_overlay_options() {
        let options = MapOptions::from_json_str(
            r#"{"zoom_level": 3, "max_zoom": 12, "tile_url": "https://t/{z}/{x}/{y}.png"}"#,
        )
        .unwrap();
        let runner = ScenarioRunner::new(21, 3).with_frames(10).with_options(options);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
        }
    }

    #[test]
    fn test_custom_panel_config() {
        let config = PanelConfig {
            recenter_duration_ms: 500,
            overlay_z_index: 10,
            route_z_index: 20,
            ..PanelConfig::default()
        };
        let runner = ScenarioRunner::new(5, 3).with_frames(8).with_config(config);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn prop_selection_churn_holds_for_any_seed(seed in any::<u64>(), vehicles in 1usize..8) {
                let result = ScenarioRunner::new(seed, vehicles).with_frames(8).run(ScenarioId::SelectionChurn);
                prop_assert!(result.passed, "{:?}", result.failure_reason);
            }

            #[test]
            fn prop_out_of_order_holds_for_any_seed(seed in any::<u64>()) {
                let result = ScenarioRunner::new(seed, 4).with_frames(6).run(ScenarioId::OutOfOrder);
                prop_assert!(result.passed, "{:?}", result.failure_reason);
            }
        }
    }
}
