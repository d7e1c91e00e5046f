//! The synchronization action vocabulary.
//!
//! One action is one self-contained instruction to the rendering surface.
//! Applying the same action twice leaves the surface in the same state.

use crate::feature::RouteGeometry;
use crate::types::{LonLat, Selection};
use serde::{Deserialize, Serialize};

/// Stacking order of a map layer. Higher draws on top.
pub type ZIndex = i32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// Create the map view. Emitted once, when the panel mounts.
    CreateView {
        center: LonLat,
        zoom: f64,
        max_zoom: f64,
    },
    
    /// Add the base tile layer. Emitted once, when the panel mounts.
    AddBaseLayer { url: String },
    
    /// Pan the view to `center` over `duration_ms`.
    AnimateCenterTo { center: LonLat, duration_ms: u64 },
    
    SetZoom { zoom: f64 },
    
    AddOverlayLayer { url: String, z_index: ZIndex },
    
    RemoveOverlayLayer,
    
    /// Show the route of `key`.
    AddRouteLayer {
        key: String,
        geometry: RouteGeometry,
        z_index: ZIndex,
    },
    
    RemoveRouteLayer,
    
    /// Drop whatever route is displayed because the data went away.
    ClearRouteLayer,
    
    ResetSelection { selection: Selection },
    
    /// Replace the selector's entity list.
    SetAvailableKeys { keys: Vec<String> },
}

impl SyncAction {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SyncAction::CreateView { .. } => "create_view",
            SyncAction::AddBaseLayer { .. } => "add_base_layer",
            SyncAction::AnimateCenterTo { .. } => "animate_center_to",
            SyncAction::SetZoom { .. } => "set_zoom",
            SyncAction::AddOverlayLayer { .. } => "add_overlay_layer",
            SyncAction::RemoveOverlayLayer => "remove_overlay_layer",
            SyncAction::AddRouteLayer { .. } => "add_route_layer",
            SyncAction::RemoveRouteLayer => "remove_route_layer",
            SyncAction::ClearRouteLayer => "clear_route_layer",
            SyncAction::ResetSelection { .. } => "reset_selection",
            SyncAction::SetAvailableKeys { .. } => "set_available_keys",
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::AnimateCenterTo { center, duration_ms } => {
                write!(f, "{}({:.6},{:.6} over {}ms)", self.name(), center.lon, center.lat, duration_ms)
            }
            SyncAction::SetZoom { zoom } => write!(f, "{}({})", self.name(), zoom),
            SyncAction::AddOverlayLayer { url, z_index } => {
                write!(f, "{}({} z={})", self.name(), url, z_index)
            }
            SyncAction::AddRouteLayer { key, geometry, z_index } => write!(
                f,
                "{}({} segments={} markers={} z={})",
                self.name(),
                key,
                geometry.segment_count(),
                geometry.marker_count(),
                z_index
            ),
            SyncAction::ResetSelection { selection } => write!(f, "{}({})", self.name(), selection),
            SyncAction::SetAvailableKeys { keys } => write!(f, "{}({} keys)", self.name(), keys.len()),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_action_serializes_with_tag() {
        let action = SyncAction::AddOverlayLayer {
            url: "https://x/{z}/{x}/{y}.png".to_string(),
            z_index: 1,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "add_overlay_layer");
        assert_eq!(json["z_index"], 1);
    }
    
    #[test]
    fn test_display_names_unit_actions() {
        assert_eq!(SyncAction::RemoveRouteLayer.to_string(), "remove_route_layer");
        assert_eq!(
            SyncAction::ResetSelection { selection: Selection::None }.to_string(),
            "reset_selection(None)"
        );
    }
}
