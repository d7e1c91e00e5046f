//! The Frame Diff & Sync Controller.
//!
//! Compares what the panel last synchronized (frame revision, options,
//! selection) with what the host now provides and emits the actions that
//! bring the display up to date. Every update runs the same rule list, in
//! this order, and every rule that applies fires:
//!
//! 1. **Recenter** - previous frame had no rows, new frame has some
//! 2. **Re-aggregate** - a new frame revision arrived
//! 3. **Overlay swap** - `tile_url` changed
//! 4. **Zoom** - `zoom_level` changed
//! 5. **Selection** - the selected entity changed
//!
//! The frame is decoded before any rule runs, so a malformed frame aborts
//! the update with no action emitted and no snapshot touched.

use crate::aggregate::{aggregate, AggregatedState};
use crate::error::Result;
use crate::frame::{decode, DecodedFrame, RawFrame};
use crate::geometry::build_route;
use crate::options::{MapOptions, PanelConfig};
use crate::selection::{resolve, selector_options, SelectorOption};
use tracing::{debug, info, warn};
use trackmap_env::{FrameRevision, Selection, SyncAction};

/// A frame as delivered by the data feed, tagged with its revision.
#[derive(Debug, Clone, Copy)]
pub struct FrameUpdate<'a> {
    pub revision: FrameRevision,
    pub frame: &'a RawFrame,
}

impl<'a> FrameUpdate<'a> {
    pub fn new(revision: FrameRevision, frame: &'a RawFrame) -> Self {
        Self { revision, frame }
    }
}

/// Reconciles aggregated state and options against the displayed layers.
#[derive(Debug, Clone)]
pub struct SyncController {
    config: PanelConfig,

    /// Routes of the current frame, replaced wholesale on each new frame
    state: AggregatedState,

    // === Snapshot of the last synchronized inputs ===
    revision: FrameRevision,
    row_count: usize,
    options: MapOptions,
    selection: Selection,

    // === Layers known to exist on the surface ===
    overlay_present: bool,
    route_present: bool,
}

impl SyncController {
    /// Builds the initial display for a freshly mounted panel.
    ///
    /// Emits `CreateView` (centered on the first row when there is data,
    /// otherwise on the configured center), `AddBaseLayer`, the entity list
    /// when the frame has rows, and the overlay when one is configured.
    pub fn mount(
        config: PanelConfig,
        options: &MapOptions,
        frame: FrameUpdate<'_>,
    ) -> Result<(Self, Vec<SyncAction>)> {
        let decoded = decode(frame.frame, config.schema_mode).inspect_err(|e| {
            warn!(revision = %frame.revision, "mount aborted: {}", e);
        })?;

        let mut actions = vec![
            SyncAction::CreateView {
                center: decoded.first_position().unwrap_or_else(|| options.center()),
                zoom: options.zoom_level,
                max_zoom: options.max_zoom,
            },
            SyncAction::AddBaseLayer {
                url: config.base_tile_url.clone(),
            },
        ];

        let state = if decoded.is_empty() {
            AggregatedState::empty()
        } else {
            let state = aggregate(&decoded);
            actions.push(SyncAction::SetAvailableKeys { keys: state.key_list() });
            state
        };

        let overlay_present = options.has_overlay();
        if overlay_present {
            actions.push(SyncAction::AddOverlayLayer {
                url: options.tile_url.clone(),
                z_index: config.overlay_z_index,
            });
        }

        info!(
            revision = %frame.revision,
            rows = decoded.len(),
            entities = state.len(),
            "mounted route panel"
        );

        let controller = Self {
            config,
            state,
            revision: frame.revision,
            row_count: decoded.len(),
            options: options.clone(),
            selection: Selection::None,
            overlay_present,
            route_present: false,
        };

        Ok((controller, actions))
    }

    /// Runs one update cycle against the host's current inputs.
    ///
    /// # Errors
    /// `TrackMapError::MalformedFrame` if a new frame cannot be decoded.
    /// The controller keeps its last good state in that case.
    pub fn update(
        &mut self,
        frame: FrameUpdate<'_>,
        options: &MapOptions,
        selection: &Selection,
    ) -> Result<Vec<SyncAction>> {
        let incoming = if frame.revision != self.revision {
            let decoded = decode(frame.frame, self.config.schema_mode).inspect_err(|e| {
                warn!(revision = %frame.revision, "update aborted, keeping {}: {}", self.revision, e);
            })?;
            Some((frame.revision, decoded))
        } else {
            None
        };

        Ok(self.run(incoming, options, selection.clone()))
    }

    /// Runs an update cycle triggered by the selector alone.
    pub fn select(&mut self, selection: Selection) -> Vec<SyncAction> {
        let options = self.options.clone();
        self.run(None, &options, selection)
    }

    fn run(
        &mut self,
        incoming: Option<(FrameRevision, DecodedFrame<'_>)>,
        options: &MapOptions,
        mut selection: Selection,
    ) -> Vec<SyncAction> {
        let mut actions = Vec::new();

        if let Some((revision, decoded)) = incoming {
            self.sync_frame(&decoded, &mut selection, &mut actions);
            self.revision = revision;
            self.row_count = decoded.len();
        }
        self.sync_overlay(options, &mut actions);
        self.sync_zoom(options, &mut actions);
        self.sync_selection(selection, &mut actions);

        self.options = options.clone();

        for action in &actions {
            debug!(revision = %self.revision, %action, "emit");
        }
        actions
    }

    /// Rules 1 and 2: recenter on first data, then re-aggregate.
    fn sync_frame(&mut self, decoded: &DecodedFrame<'_>, selection: &mut Selection, actions: &mut Vec<SyncAction>) {
        if self.row_count == 0 {
            if let Some(center) = decoded.first_position() {
                actions.push(SyncAction::AnimateCenterTo {
                    center,
                    duration_ms: self.config.recenter_duration_ms,
                });
            }
        }

        if decoded.is_empty() {
            self.state = AggregatedState::empty();
            self.route_present = false;
            *selection = Selection::None;
            actions.push(SyncAction::ClearRouteLayer);
            actions.push(SyncAction::ResetSelection {
                selection: Selection::None,
            });
            info!("frame empty, cleared route and selection");
        } else {
            self.state = aggregate(decoded);
            actions.push(SyncAction::SetAvailableKeys {
                keys: self.state.key_list(),
            });
            info!(
                rows = decoded.len(),
                entities = self.state.len(),
                "re-aggregated frame"
            );
        }
    }

    /// Rule 3: swap the overlay tile layer.
    fn sync_overlay(&mut self, options: &MapOptions, actions: &mut Vec<SyncAction>) {
        if options.tile_url == self.options.tile_url {
            return;
        }

        if self.overlay_present {
            actions.push(SyncAction::RemoveOverlayLayer);
            self.overlay_present = false;
        }
        if options.has_overlay() {
            actions.push(SyncAction::AddOverlayLayer {
                url: options.tile_url.clone(),
                z_index: self.config.overlay_z_index,
            });
            self.overlay_present = true;
        }
    }

    /// Rule 4: follow zoom edits.
    fn sync_zoom(&self, options: &MapOptions, actions: &mut Vec<SyncAction>) {
        if options.zoom_level != self.options.zoom_level {
            actions.push(SyncAction::SetZoom {
                zoom: options.zoom_level,
            });
        }
    }

    /// Rule 5: rebuild the route layer for a new selection.
    fn sync_selection(&mut self, selection: Selection, actions: &mut Vec<SyncAction>) {
        if selection == self.selection {
            return;
        }

        if self.route_present {
            actions.push(SyncAction::RemoveRouteLayer);
            self.route_present = false;
        }

        match resolve(&selection, &self.state) {
            Some((key, route)) => {
                actions.push(SyncAction::AddRouteLayer {
                    key: key.to_string(),
                    geometry: build_route(route),
                    z_index: self.config.route_z_index,
                });
                self.route_present = true;
            }
            None => {
                if let Some(key) = selection.key() {
                    // Selector and data can briefly disagree; show nothing
                    warn!(key, "selected entity not in current frame");
                }
            }
        }

        self.selection = selection;
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Routes of the most recent frame.
    pub fn state(&self) -> &AggregatedState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Revision of the last frame that was synchronized.
    pub fn revision(&self) -> FrameRevision {
        self.revision
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay_present
    }

    pub fn has_route(&self) -> bool {
        self.route_present
    }

    /// Selector entries for the current state.
    pub fn selector_options(&self) -> Vec<SelectorOption> {
        selector_options(&self.state)
    }
}
