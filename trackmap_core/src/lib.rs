//! TrackMap Core - per-entity route aggregation and incremental map sync
//!
//! This library turns a stream of columnar observation frames into a map
//! display that is kept in step with the host:
//! 1. **Decoding**: typed row access over the six-column frame layout
//! 2. **Aggregation**: rows grouped into per-entity routes, first-seen order
//! 3. **Geometry**: directed segments and weighted markers in Web Mercator
//! 4. **Sync**: a minimal list of layer actions per update cycle
//!
//! ```text
//! RawFrame ─► decode ─► aggregate ─► AggregatedState
//!                                         │ selection
//!                                         ▼
//!            MapOptions ─► SyncController ─► Vec<SyncAction> ─► RenderSurface
//! ```

pub mod aggregate;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod options;
pub mod panel;
pub mod projection;
pub mod selection;
pub mod style;
pub mod sync;

// Re-export key types for convenience
pub use aggregate::{aggregate, AggregatedState, EntityRoute};
pub use error::{Result, TrackMapError};
pub use frame::{decode, Column, DecodedFrame, Field, FieldValue, Observation, RawFrame, Row, SchemaMode};
pub use options::{MapOptions, PanelConfig};
pub use panel::RoutePanel;
pub use selection::{selector_options, SelectorOption};
pub use style::{FeatureStyle, HoverState};
pub use sync::{FrameUpdate, SyncController};
