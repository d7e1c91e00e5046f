//! TrackMap Environment Abstraction Layer
//!
//! This crate holds the vocabulary shared between the route panel core and
//! the host that embeds it:
//! - **Identity**: the per-instance `PanelId` binding a panel to its surface
//! - **Revisions**: `FrameRevision` tokens supplied by the data feed
//! - **Features**: the projected route geometry handed to the renderer
//! - **Actions**: the `SyncAction` vocabulary the core emits
//!
//! # Core Concept: Action-Driven Rendering
//!
//! The core never touches map layers directly. Every update cycle produces
//! an ordered list of actions that a `RenderSurface` applies one at a time:
//!
//! ```text
//! data feed / options / selector
//!            │
//!     ┌──────▼──────┐     Vec<SyncAction>     ┌───────────────┐
//!     │  core sync  │ ──────────────────────► │ RenderSurface │
//!     └─────────────┘                         └───────────────┘
//! ```
//!
//! `LayerSet` is the in-memory surface used by tests and the simulator.

mod action;
mod error;
mod feature;
mod layer_set;
mod surface;
mod types;

pub use action::{SyncAction, ZIndex};
pub use error::EnvError;
pub use feature::{
    DirectionArrow, FeatureId, MarkerRole, PointMarker, RouteFeature, RouteGeometry, RouteSegment,
};
pub use layer_set::{Animation, LayerSet, OverlayLayer, RouteLayer, ViewState};
pub use surface::RenderSurface;
pub use types::{FrameRevision, LonLat, PanelId, Selection};
