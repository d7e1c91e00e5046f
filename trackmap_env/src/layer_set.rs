//! In-memory rendering surface modelling the displayed layer set.

use crate::action::{SyncAction, ZIndex};
use crate::error::EnvError;
use crate::feature::RouteGeometry;
use crate::surface::RenderSurface;
use crate::types::{LonLat, PanelId, Selection};

/// A center animation that was requested on the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub target: LonLat,
    pub duration_ms: u64,
}

/// Camera state of the map view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub center: LonLat,
    pub zoom: f64,
    pub max_zoom: f64,
    
    /// Most recent center animation, if any
    pub last_animation: Option<Animation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub url: String,
    pub z_index: ZIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteLayer {
    pub key: String,
    pub geometry: RouteGeometry,
    pub z_index: ZIndex,
}

/// Layer set of one map: base tiles, optional overlay, optional route.
///
/// Records every applied action so callers can inspect what a cycle did.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    panel: Option<PanelId>,
    view: Option<ViewState>,
    base_url: Option<String>,
    overlay: Option<OverlayLayer>,
    route: Option<RouteLayer>,
    available_keys: Vec<String>,
    selection: Selection,
    log: Vec<SyncAction>,
}

impl LayerSet {
    /// Creates an empty, unbound layer set.
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }
    
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
    
    pub fn overlay(&self) -> Option<&OverlayLayer> {
        self.overlay.as_ref()
    }
    
    pub fn route(&self) -> Option<&RouteLayer> {
        self.route.as_ref()
    }
    
    pub fn available_keys(&self) -> &[String] {
        &self.available_keys
    }
    
    /// Selection last pushed to the selector by the core.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
    
    /// Every action applied so far, in order.
    pub fn log(&self) -> &[SyncAction] {
        &self.log
    }
    
    /// Number of layers currently on the map.
    pub fn layer_count(&self) -> usize {
        self.base_url.iter().count() + self.overlay.iter().count() + self.route.iter().count()
    }
    
    fn view_mut(&mut self, action: &SyncAction) -> Result<&mut ViewState, EnvError> {
        self.view.as_mut().ok_or_else(|| EnvError::no_view(action.name()))
    }
}

impl RenderSurface for LayerSet {
    fn bind(&mut self, panel: PanelId) -> Result<(), EnvError> {
        match self.panel {
            Some(bound) if bound != panel => Err(EnvError::AlreadyBound(bound.to_string())),
            _ => {
                self.panel = Some(panel);
                Ok(())
            }
        }
    }
    
    fn apply(&mut self, action: &SyncAction) -> Result<(), EnvError> {
        if self.panel.is_none() {
            return Err(EnvError::Unbound);
        }
        
        match action {
            SyncAction::CreateView { center, zoom, max_zoom } => {
                self.view = Some(ViewState {
                    center: *center,
                    zoom: zoom.min(*max_zoom),
                    max_zoom: *max_zoom,
                    last_animation: None,
                });
            }
            SyncAction::AddBaseLayer { url } => {
                self.base_url = Some(url.clone());
            }
            SyncAction::AnimateCenterTo { center, duration_ms } => {
                let view = self.view_mut(action)?;
                view.center = *center;
                view.last_animation = Some(Animation {
                    target: *center,
                    duration_ms: *duration_ms,
                });
            }
            SyncAction::SetZoom { zoom } => {
                let view = self.view_mut(action)?;
                // The view never zooms past its configured maximum
                view.zoom = zoom.min(view.max_zoom);
            }
            SyncAction::AddOverlayLayer { url, z_index } => {
                self.overlay = Some(OverlayLayer {
                    url: url.clone(),
                    z_index: *z_index,
                });
            }
            SyncAction::RemoveOverlayLayer => {
                self.overlay = None;
            }
            SyncAction::AddRouteLayer { key, geometry, z_index } => {
                self.route = Some(RouteLayer {
                    key: key.clone(),
                    geometry: geometry.clone(),
                    z_index: *z_index,
                });
            }
            SyncAction::RemoveRouteLayer | SyncAction::ClearRouteLayer => {
                self.route = None;
            }
            SyncAction::ResetSelection { selection } => {
                self.selection = selection.clone();
            }
            SyncAction::SetAvailableKeys { keys } => {
                self.available_keys = keys.clone();
            }
        }
        
        tracing::trace!(panel = ?self.panel, %action, "applied");
        self.log.push(action.clone());
        Ok(())
    }
    
    fn panel(&self) -> Option<PanelId> {
        self.panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn bound() -> LayerSet {
        let mut layers = LayerSet::new();
        layers.bind(PanelId::from_seed(1)).unwrap();
        layers
            .apply(&SyncAction::CreateView {
                center: LonLat::new(11.66725, 48.262725),
                zoom: 18.0,
                max_zoom: 22.0,
            })
            .unwrap();
        layers
    }
    
    #[test]
    fn test_apply_requires_binding() {
        let mut layers = LayerSet::new();
        let result = layers.apply(&SyncAction::RemoveRouteLayer);
        assert!(matches!(result, Err(EnvError::Unbound)));
    }
    
    #[test]
    fn test_bind_rejects_second_panel() {
        let mut layers = LayerSet::new();
        layers.bind(PanelId::from_seed(1)).unwrap();
        assert!(layers.bind(PanelId::from_seed(1)).is_ok());
        assert!(matches!(layers.bind(PanelId::from_seed(2)), Err(EnvError::AlreadyBound(_))));
    }
    
    #[test]
    fn test_zoom_requires_view() {
        let mut layers = LayerSet::new();
        layers.bind(PanelId::from_seed(1)).unwrap();
        let result = layers.apply(&SyncAction::SetZoom { zoom: 3.0 });
        assert!(matches!(result, Err(EnvError::ViewNotCreated(_))));
    }
    
    #[test]
    fn test_set_zoom_clamped_to_max() {
        let mut layers = bound();
        layers.apply(&SyncAction::SetZoom { zoom: 30.0 }).unwrap();
        assert_eq!(layers.view().unwrap().zoom, 22.0);
    }
    
    #[test]
    fn test_overlay_add_remove() {
        let mut layers = bound();
        layers
            .apply(&SyncAction::AddOverlayLayer { url: "https://x/{z}/{x}/{y}.png".to_string(), z_index: 1 })
            .unwrap();
        assert_eq!(layers.overlay().unwrap().z_index, 1);
        layers.apply(&SyncAction::RemoveOverlayLayer).unwrap();
        assert!(layers.overlay().is_none());
    }
    
    #[test]
    fn test_replaying_actions_is_idempotent() {
        let actions = vec![
            SyncAction::AddBaseLayer { url: "https://base/{z}/{x}/{y}.png".to_string() },
            SyncAction::AnimateCenterTo { center: LonLat::new(10.0, 20.0), duration_ms: 2000 },
            SyncAction::SetAvailableKeys { keys: vec!["a".to_string(), "b".to_string()] },
            SyncAction::AddRouteLayer { key: "a".to_string(), geometry: RouteGeometry::empty(), z_index: 2 },
            SyncAction::ClearRouteLayer,
            SyncAction::ResetSelection { selection: Selection::None },
        ];
        
        let mut once = bound();
        let mut twice = bound();
        for action in &actions {
            once.apply(action).unwrap();
            twice.apply(action).unwrap();
            twice.apply(action).unwrap();
        }
        
        assert_eq!(once.view(), twice.view());
        assert_eq!(once.base_url(), twice.base_url());
        assert_eq!(once.route(), twice.route());
        assert_eq!(once.available_keys(), twice.available_keys());
        assert_eq!(once.selection(), twice.selection());
        assert_eq!(once.layer_count(), 1);
    }
}
