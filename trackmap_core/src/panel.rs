//! Route Panel - drives a render surface from frames, options and selection.
//!
//! This module connects the pure sync logic (`SyncController`) to the
//! environment abstraction (`RenderSurface`). Every action the controller
//! emits is applied to the surface immediately, in emission order.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      RoutePanel<S>                       │
//! │                                                          │
//! │   frame ─┐                                               │
//! │ options ─┼──► SyncController ──► Vec<SyncAction> ──┐     │
//! │selector ─┘                                        │     │
//! │                                                    ▼     │
//! │   HoverState ◄── displayed route ◄──── S: RenderSurface  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use trackmap_core::{FrameUpdate, MapOptions, PanelConfig, RawFrame, RoutePanel};
//! use trackmap_env::{FrameRevision, LayerSet, Selection};
//!
//! let frame = RawFrame::empty();
//! let mut panel = RoutePanel::mount(
//!     LayerSet::new(),
//!     PanelConfig::default(),
//!     &MapOptions::default(),
//!     FrameUpdate::new(FrameRevision(0), &frame),
//! )?;
//!
//! panel.select(Selection::from_value("some-key"))?;
//! ```

use crate::error::Result;
use crate::frame::RawFrame;
use crate::options::{MapOptions, PanelConfig};
use crate::selection::SelectorOption;
use crate::style::{FeatureStyle, HoverState};
use crate::sync::{FrameUpdate, SyncController};
use tracing::{debug, info, warn};
use trackmap_env::{FeatureId, PanelId, RenderSurface, RouteGeometry, Selection, SyncAction};

/// One mounted route panel and the surface it owns.
pub struct RoutePanel<S: RenderSurface> {
    /// Panel identifier, also the surface's DOM target
    id: PanelId,

    /// Renderer the panel drives
    surface: S,

    /// Diff and sync state
    controller: SyncController,

    /// Geometry of the route layer currently on the surface
    displayed: Option<RouteGeometry>,

    /// Pointer hover over the displayed route
    hover: HoverState,

    /// Completed update cycles, mount excluded
    cycles: u64,
}

impl<S: RenderSurface> RoutePanel<S> {
    /// Mounts a panel with a fresh identifier.
    pub fn mount(surface: S, config: PanelConfig, options: &MapOptions, frame: FrameUpdate<'_>) -> Result<Self> {
        Self::mount_with_id(PanelId::new(), surface, config, options, frame)
    }

    /// Mounts a panel with a known identifier.
    ///
    /// Binds `surface` to `id`, builds the initial display and applies it.
    pub fn mount_with_id(
        id: PanelId,
        mut surface: S,
        config: PanelConfig,
        options: &MapOptions,
        frame: FrameUpdate<'_>,
    ) -> Result<Self> {
        surface.bind(id)?;
        let (controller, actions) = SyncController::mount(config, options, frame)?;

        let mut panel = Self {
            id,
            surface,
            controller,
            displayed: None,
            hover: HoverState::new(),
            cycles: 0,
        };
        panel.apply(&actions)?;

        info!(panel = %id, target = %id.target(), actions = actions.len(), "panel mounted");
        Ok(panel)
    }

    /// Synchronizes the surface with a frame and options from the host.
    ///
    /// The current selection is carried into the cycle unchanged.
    pub fn update(&mut self, frame: FrameUpdate<'_>, options: &MapOptions) -> Result<Vec<SyncAction>> {
        let before = self.controller.clone();
        let selection = self.controller.selection().clone();
        let actions = self.controller.update(frame, options, &selection)?;
        self.finish_cycle(before, actions)
    }

    /// Applies an options edit with no new frame.
    pub fn set_options(&mut self, options: &MapOptions) -> Result<Vec<SyncAction>> {
        let before = self.controller.clone();
        let selection = self.controller.selection().clone();
        let revision = self.controller.revision();
        // Same revision means the frame is not read
        let unused = RawFrame::empty();
        let actions = self
            .controller
            .update(FrameUpdate::new(revision, &unused), options, &selection)?;
        self.finish_cycle(before, actions)
    }

    /// Handles a pick in the entity selector.
    pub fn select(&mut self, selection: Selection) -> Result<Vec<SyncAction>> {
        let before = self.controller.clone();
        let actions = self.controller.select(selection);
        self.finish_cycle(before, actions)
    }

    /// Handles a raw selector value, `"None"` deselects.
    pub fn select_value(&mut self, value: &str) -> Result<Vec<SyncAction>> {
        self.select(Selection::from_value(value))
    }

    /// Records the feature under the pointer.
    ///
    /// Features that are not part of the displayed route are treated as no
    /// hover. Returns `true` if the route layer needs a restyle.
    pub fn hover(&mut self, feature: Option<FeatureId>) -> bool {
        let feature = feature.filter(|id| {
            self.displayed
                .as_ref()
                .is_some_and(|geometry| geometry.feature(*id).is_some())
        });
        self.hover.set(feature)
    }

    /// Style of a displayed route feature under the current hover.
    pub fn feature_style(&self, id: FeatureId) -> Option<FeatureStyle> {
        let feature = self.displayed.as_ref()?.feature(id)?;
        Some(self.hover.style(feature))
    }

    /// Applies a cycle's actions, rolling the controller back to `before`
    /// if the surface rejects one.
    ///
    /// Actions that were applied ahead of the rejected one are re-emitted
    /// by the next cycle and are idempotent on the surface.
    fn finish_cycle(&mut self, before: SyncController, actions: Vec<SyncAction>) -> Result<Vec<SyncAction>> {
        if let Err(e) = self.apply(&actions) {
            warn!(panel = %self.id, "surface rejected cycle, rolling back: {}", e);
            self.controller = before;
            return Err(e);
        }
        self.cycles += 1;
        debug!(panel = %self.id, cycle = self.cycles, actions = actions.len(), "cycle done");
        Ok(actions)
    }

    fn apply(&mut self, actions: &[SyncAction]) -> Result<()> {
        for action in actions {
            self.surface.apply(action)?;
            match action {
                SyncAction::AddRouteLayer { geometry, .. } => {
                    self.displayed = Some(geometry.clone());
                    self.hover.clear();
                }
                SyncAction::RemoveRouteLayer | SyncAction::ClearRouteLayer => {
                    self.displayed = None;
                    self.hover.clear();
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    pub fn selector_options(&self) -> Vec<SelectorOption> {
        self.controller.selector_options()
    }

    /// Route geometry currently on the surface.
    pub fn displayed_route(&self) -> Option<&RouteGeometry> {
        self.displayed.as_ref()
    }

    pub fn hovered(&self) -> Option<FeatureId> {
        self.hover.hovered()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Unmounts the panel, handing back the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackMapError;
    use crate::frame::Observation;
    use trackmap_env::{EnvError, FrameRevision, LayerSet};

    fn frame() -> RawFrame {
        let rows: Vec<Observation> = [("A", 0.0), ("A", 3000.0), ("B", 0.0)]
            .iter()
            .enumerate()
            .map(|(i, (key, ts))| Observation {
                key: key.to_string(),
                lat: 48.0 + i as f64 * 0.001,
                lon: 11.0,
                weight: 4.0,
                label: "vendor".to_string(),
                timestamp: *ts,
            })
            .collect();
        RawFrame::from_observations(&rows)
    }

    fn mounted(frame: &RawFrame) -> RoutePanel<LayerSet> {
        RoutePanel::mount_with_id(
            PanelId::from_seed(7),
            LayerSet::new(),
            PanelConfig::default(),
            &MapOptions::default(),
            FrameUpdate::new(FrameRevision(0), frame),
        )
        .unwrap()
    }

    #[test]
    fn test_mount_applies_initial_display() {
        let frame = frame();
        let panel = mounted(&frame);
        let layers = panel.surface();

        assert_eq!(layers.panel(), Some(PanelId::from_seed(7)));
        assert!(layers.view().is_some());
        assert!(layers.base_url().is_some());
        assert_eq!(layers.available_keys(), &["A".to_string(), "B".to_string()]);
        assert_eq!(panel.cycles(), 0);
    }

    #[test]
    fn test_surface_bound_elsewhere_fails_mount() {
        let mut layers = LayerSet::new();
        layers.bind(PanelId::from_seed(1)).unwrap();
        let frame = frame();

        let result = RoutePanel::mount_with_id(
            PanelId::from_seed(2),
            layers,
            PanelConfig::default(),
            &MapOptions::default(),
            FrameUpdate::new(FrameRevision(0), &frame),
        );
        assert!(matches!(result, Err(TrackMapError::Surface(EnvError::AlreadyBound(_)))));
    }

    #[test]
    fn test_select_value_shows_route() {
        let frame = frame();
        let mut panel = mounted(&frame);

        panel.select_value("A").unwrap();
        let route = panel.surface().route().unwrap();
        assert_eq!(route.key, "A");
        assert_eq!(route.geometry.segment_count(), 1);
        assert_eq!(panel.displayed_route(), Some(&route.geometry));

        panel.select_value("None").unwrap();
        assert!(panel.surface().route().is_none());
        assert!(panel.displayed_route().is_none());
        assert_eq!(panel.cycles(), 2);
    }

    #[test]
    fn test_hover_restyles_displayed_route() {
        let frame = frame();
        let mut panel = mounted(&frame);
        assert!(!panel.hover(Some(FeatureId::Segment(0))));

        panel.select_value("A").unwrap();
        assert!(panel.hover(Some(FeatureId::Segment(0))));
        let style = panel.feature_style(FeatureId::Segment(0)).unwrap();
        assert_eq!(style.text.unwrap().content, "3s");
        assert!(panel.feature_style(FeatureId::Segment(5)).is_none());

        // Swapping routes forgets the hover
        panel.select_value("B").unwrap();
        assert_eq!(panel.hovered(), None);
    }

    #[test]
    fn test_set_options_only_touches_options() {
        let frame = frame();
        let mut panel = mounted(&frame);
        let options = MapOptions {
            zoom_level: 10.0,
            ..MapOptions::default()
        };

        let actions = panel.set_options(&options).unwrap();
        assert_eq!(actions, vec![SyncAction::SetZoom { zoom: 10.0 }]);
        assert_eq!(panel.surface().view().unwrap().zoom, 10.0);
        assert_eq!(panel.selector_options().len(), 3);
    }

    #[test]
    fn test_update_with_empty_frame_clears() {
        let frame = frame();
        let mut panel = mounted(&frame);
        panel.select_value("B").unwrap();

        let empty = RawFrame::empty();
        panel
            .update(FrameUpdate::new(FrameRevision(1), &empty), &MapOptions::default())
            .unwrap();
        assert!(panel.surface().route().is_none());
        assert_eq!(panel.surface().selection(), &Selection::None);
        assert_eq!(panel.selection(), &Selection::None);
    }

    #[test]
    fn test_into_surface_keeps_applied_log() {
        let frame = frame();
        let mut panel = mounted(&frame);
        panel.select_value("A").unwrap();

        let layers = panel.into_surface();
        let names: Vec<&str> = layers.log().iter().map(SyncAction::name).collect();
        assert_eq!(names.first(), Some(&"create_view"));
        assert_eq!(names.last(), Some(&"add_route_layer"));
        assert!(layers.route().is_some());
    }

    /// Loses its view the first time an overlay is added.
    struct FlakySurface {
        layers: LayerSet,
        fail_overlay: bool,
    }

    impl RenderSurface for FlakySurface {
        fn bind(&mut self, panel: PanelId) -> std::result::Result<(), EnvError> {
            self.layers.bind(panel)
        }

        fn apply(&mut self, action: &SyncAction) -> std::result::Result<(), EnvError> {
            if self.fail_overlay && matches!(action, SyncAction::AddOverlayLayer { .. }) {
                self.fail_overlay = false;
                return Err(EnvError::no_view(action.name()));
            }
            self.layers.apply(action)
        }

        fn panel(&self) -> Option<PanelId> {
            self.layers.panel()
        }
    }

    #[test]
    fn test_rejected_action_is_reemitted() {
        let frame = frame();
        let surface = FlakySurface {
            layers: LayerSet::new(),
            fail_overlay: true,
        };
        let mut panel = RoutePanel::mount_with_id(
            PanelId::from_seed(9),
            surface,
            PanelConfig::default(),
            &MapOptions::default(),
            FrameUpdate::new(FrameRevision(0), &frame),
        )
        .unwrap();

        let options = MapOptions {
            tile_url: "https://t/{z}/{x}/{y}.png".to_string(),
            ..MapOptions::default()
        };
        let err = panel.set_options(&options).unwrap_err();
        assert!(matches!(err, TrackMapError::Surface(EnvError::ViewNotCreated(_))));
        assert!(!panel.controller().has_overlay());
        assert!(panel.surface().layers.overlay().is_none());
        assert_eq!(panel.cycles(), 0);

        let actions = panel.set_options(&options).unwrap();
        assert_eq!(
            actions,
            vec![SyncAction::AddOverlayLayer {
                url: options.tile_url.clone(),
                z_index: 1,
            }]
        );
        assert!(panel.controller().has_overlay());
        assert!(panel.surface().layers.overlay().is_some());
        assert_eq!(panel.cycles(), 1);
    }
}
