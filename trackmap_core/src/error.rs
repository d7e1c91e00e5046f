//! Error types for the route panel core.

use thiserror::Error;
use trackmap_env::EnvError;

/// Errors that abort an update cycle.
///
/// Conditions the panel absorbs (a selected key missing from the current
/// data, routes with fewer than two points, timestamps going backwards)
/// are not errors and never appear here.
#[derive(Debug, Error)]
pub enum TrackMapError {
    /// The frame does not have the column layout the decoder expects
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
    
    /// Panel options could not be parsed or are inconsistent
    #[error("Invalid options: {0}")]
    Options(String),
    
    /// Reading an options file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    /// The rendering surface rejected an action
    #[error(transparent)]
    Surface(#[from] EnvError),
}

impl TrackMapError {
    /// Creates a malformed-frame error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedFrame(msg.into())
    }
    
    /// Creates an options error.
    pub fn options(msg: impl Into<String>) -> Self {
        Self::Options(msg.into())
    }
    
    /// Returns true if this error leaves the panel state untouched.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MalformedFrame(_))
    }
}

pub type Result<T> = std::result::Result<T, TrackMapError>;
