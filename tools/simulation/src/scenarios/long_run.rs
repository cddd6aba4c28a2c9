//! Long runs under the invariant audit

use market_data::config::{LiveMarketConfig, UpcomingMarketConfig};
use market_data::live::LiveMarketSimulator;
use market_data::seed;
use market_data::upcoming::UpcomingMarketSimulator;
use market_data::Snapshot;

use crate::engine::Harness;
use crate::invariants::{audit_live_run, audit_upcoming_run};
use crate::scenarios::ScenarioResult;

/// Home live table: drift, monotonic volumes, percent change, partial
/// mutation.
pub fn run_live(seed: u64, ticks: usize) -> ScenarioResult {
    let config = LiveMarketConfig::home();
    let rows = Snapshot::initial(seed::home_live(seed::reference_time()));
    let sim = LiveMarketSimulator::new("home_live", config.clone(), &rows);
    let mut harness = Harness::new(sim, rows, config.delays, seed);

    let violations = audit_live_run(&mut harness, ticks);
    ScenarioResult::new(
        "long_run_live",
        harness.metrics.fires,
        violations.is_empty(),
        summarize(&violations, harness.metrics.mean_rows_changed()),
    )
}

/// Home upcoming table: score range, monotonic watchers, partial mutation.
pub fn run_upcoming(seed: u64, ticks: usize) -> ScenarioResult {
    let config = UpcomingMarketConfig::home();
    let rows = Snapshot::initial(seed::home_upcoming());
    let sim = UpcomingMarketSimulator::new("home_upcoming", config.clone());
    let mut harness = Harness::new(sim, rows, config.delays, seed);

    let violations = audit_upcoming_run(&mut harness, ticks);
    ScenarioResult::new(
        "long_run_upcoming",
        harness.metrics.fires,
        violations.is_empty(),
        summarize(&violations, harness.metrics.mean_rows_changed()),
    )
}

fn summarize(violations: &[crate::invariants::Violation], mean_rows: f64) -> String {
    match violations.first() {
        None => format!("no violations, {mean_rows:.2} rows/fire"),
        Some(first) => format!(
            "{} violations, first: {} row {:?}: {}",
            violations.len(),
            first.check,
            first.row,
            first.detail
        ),
    }
}
