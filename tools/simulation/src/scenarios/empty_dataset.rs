//! Empty dataset
//!
//! A scheduler over zero rows keeps firing without publishing or
//! panicking.

use market_data::config::LiveMarketConfig;
use market_data::live::LiveMarketSimulator;
use market_data::Snapshot;

use crate::engine::Harness;
use crate::scenarios::ScenarioResult;

pub fn run(seed: u64, ticks: usize) -> ScenarioResult {
    let config = LiveMarketConfig::home();
    let empty = Snapshot::initial(Vec::new());
    let sim = LiveMarketSimulator::new("empty_live", config.clone(), &empty);
    let mut harness = Harness::new(sim, empty, config.delays, seed);

    let fired = harness.run_ticks(ticks);
    let snap = harness.snapshot();
    let passed = fired == ticks && snap.is_empty() && snap.version() == 0;
    ScenarioResult::new(
        "empty_dataset",
        fired as u64,
        passed,
        format!(
            "{fired} fires, {} empty, {} rows, version {}",
            harness.metrics.empty_ticks,
            snap.len(),
            snap.version()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_stays_empty() {
        let r = run(9, 50);
        assert!(r.passed, "{}", r.details);
        assert_eq!(r.ticks_run, 50);
    }
}
