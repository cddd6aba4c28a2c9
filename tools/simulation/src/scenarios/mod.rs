//! Scenario modules
//!
//! Each scenario drives the engine into a specific situation, usually by
//! injecting a chosen draw instead of a random one, and reports whether
//! the expected outcome held.

pub mod cancellation;
pub mod empty_dataset;
pub mod long_run;
pub mod moni_clamp;
pub mod price_push;

use serde::{Deserialize, Serialize};

/// Result of a scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub ticks_run: u64,
    pub passed: bool,
    pub details: String,
}

impl ScenarioResult {
    fn new(name: &str, ticks_run: u64, passed: bool, details: String) -> Self {
        Self {
            name: name.to_string(),
            ticks_run,
            passed,
            details,
        }
    }
}

/// Run every scenario with the given RNG seed.
pub fn run_all(seed: u64) -> Vec<ScenarioResult> {
    vec![
        price_push::run_unclamped(),
        price_push::run_clamped(),
        moni_clamp::run(),
        empty_dataset::run(seed, 100),
        cancellation::run(seed),
        long_run::run_live(seed, 10_000),
        long_run::run_upcoming(seed, 10_000),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_pass() {
        for result in run_all(2024) {
            assert!(result.passed, "{}: {}", result.name, result.details);
        }
    }
}
