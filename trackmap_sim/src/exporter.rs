//! JSON exporter for scenario runs.
//!
//! Records every update cycle of a run (what triggered it and the actions
//! it applied) so a run can be inspected or replayed against another
//! surface.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use trackmap_env::SyncAction;

/// What started an update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrigger {
    Mount,
    Frame,
    Options,
    Select,
}

/// One update cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimCycle {
    /// Cycle number, mount is 0
    pub cycle: u64,

    pub trigger: CycleTrigger,

    /// Frame revision the panel held after the cycle
    pub revision: u64,

    /// Rows in the frame the cycle saw
    pub rows: usize,

    /// Actions applied, in order
    pub actions: Vec<SyncAction>,

    /// Why the cycle was aborted, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete scenario export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Vehicles in the fleet
    pub vehicles: usize,

    /// All cycles
    pub cycles: Vec<SimCycle>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, vehicles: usize) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            vehicles,
            cycles: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a cycle.
    pub fn add_cycle(&mut self, cycle: SimCycle) {
        self.cycles.push(cycle);
    }

    /// Total actions across all cycles.
    pub fn action_count(&self) -> usize {
        self.cycles.iter().map(|c| c.actions.len()).sum()
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
