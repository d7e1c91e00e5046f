//! TrackMap Deterministic Simulation Harness
//!
//! This crate replaces the dashboard around a route panel with a controlled,
//! seeded environment so whole update sequences can be replayed exactly.
//!
//! # Core Principle: One Seed, One Run
//!
//! Everything that varies between runs is derived from a single 64-bit seed:
//! - **Vehicles**: keys, start positions, headings and speeds
//! - **GPS noise**: Gaussian jitter on every fix
//! - **Interaction**: which vehicle the selector picks, row shuffles
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ScenarioRunner                         │
//! │                                                             │
//! │   ┌─────────┐  RawFrame   ┌────────────────┐  SyncAction    │
//! │   │  Fleet  │ ──────────► │ RoutePanel<..> │ ────────────┐  │
//! │   └─────────┘             └────────────────┘             │  │
//! │        ▲ options / selection      │                      ▼  │
//! │        │                          │ checks        ┌──────────┐
//! │   scenario script ◄───────────────┘◄──────────────│ LayerSet │
//! │                                                   └──────────┘
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use trackmap_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42, 8).with_frames(20);
//! let result = runner.run(ScenarioId::DataDropout);
//! assert!(result.passed);
//! ```

mod exporter;
mod fleet;
mod runner;
pub mod scenarios;

pub use exporter::{CycleTrigger, SimCycle, SimExport};
pub use fleet::{Fleet, Vehicle, VENDORS};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
