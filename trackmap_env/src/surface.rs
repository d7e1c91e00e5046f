//! Rendering surface abstraction for route panels.

use crate::action::SyncAction;
use crate::error::EnvError;
use crate::types::PanelId;

/// Abstraction for the map renderer a panel drives.
///
/// # Implementations
///
/// - **Host**: wraps the real map widget (tiles, vector layers, hover)
/// - **Testing / simulation**: `LayerSet`, an in-memory layer model
///
/// # Action Flow
///
/// ```text
/// Panel                          Surface
///   |-- bind(panel_id) ------------>|
///   |-- apply(CreateView) --------->|
///   |-- apply(AddBaseLayer) ------->|
///   |            ...                |
/// ```
///
/// Actions are applied one at a time, in emission order, by a single
/// writer. There is no batching.
pub trait RenderSurface {
    /// Binds the surface to the panel that will drive it.
    ///
    /// # Returns
    /// * `Ok(())` - Bound (rebinding the same panel is allowed)
    /// * `Err(EnvError::AlreadyBound)` - Another panel owns this surface
    fn bind(&mut self, panel: PanelId) -> Result<(), EnvError>;
    
    /// Applies a single synchronization action.
    ///
    /// # Returns
    /// * `Ok(())` - The action took effect
    /// * `Err(EnvError)` - The surface could not apply it
    fn apply(&mut self, action: &SyncAction) -> Result<(), EnvError>;
    
    /// Returns the panel this surface is bound to.
    fn panel(&self) -> Option<PanelId>;
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn bind(&mut self, panel: PanelId) -> Result<(), EnvError> {
        (**self).bind(panel)
    }
    
    fn apply(&mut self, action: &SyncAction) -> Result<(), EnvError> {
        (**self).apply(action)
    }
    
    fn panel(&self) -> Option<PanelId> {
        (**self).panel()
    }
}
