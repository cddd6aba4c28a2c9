//! Metrics and scenario export
//!
//! Serializes harness metrics, scenario results and run digests to JSON
//! for external consumption.

use crate::metrics::SimMetrics;
use crate::replay::RunDigest;
use crate::scenarios::ScenarioResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Combined export containing all simulation outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationExport {
    pub version: String,
    pub seed: u64,
    pub metrics: SimMetrics,
    pub scenarios: Vec<ScenarioResult>,
    pub digests: BTreeMap<String, RunDigest>,
}

impl SimulationExport {
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }
}

/// Build a complete simulation export.
pub fn build_export(
    seed: u64,
    metrics: &SimMetrics,
    scenarios: Vec<ScenarioResult>,
    digests: BTreeMap<String, RunDigest>,
) -> SimulationExport {
    SimulationExport {
        version: crate::VERSION.to_string(),
        seed,
        metrics: metrics.clone(),
        scenarios,
        digests,
    }
}

/// Export complete simulation data as JSON.
pub fn export_json(export: &SimulationExport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(export)
}

/// Write export to a file path.
pub fn write_to_file(export: &SimulationExport, path: &str) -> std::io::Result<()> {
    let json = export_json(export).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}
