//! Error types for the TrackMap environment abstraction.

use thiserror::Error;

/// Errors raised by a rendering surface while applying actions.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The surface has not been bound to a panel yet
    #[error("Surface is not bound to a panel")]
    Unbound,
    
    /// The surface is already bound to a different panel
    #[error("Surface already bound to panel {0}")]
    AlreadyBound(String),
    
    /// A view-dependent action arrived before the view was created
    #[error("View not created: {0}")]
    ViewNotCreated(String),
}

impl EnvError {
    /// Creates a view-not-created error naming the offending action.
    pub fn no_view(action: impl Into<String>) -> Self {
        Self::ViewNotCreated(action.into())
    }
}
