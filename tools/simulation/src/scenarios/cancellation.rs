//! Cancellation
//!
//! Cancel before the first fire, then advance the virtual clock far
//! past every scheduled fire time.

use market_data::config::LiveMarketConfig;
use market_data::live::LiveMarketSimulator;
use market_data::seed;
use market_data::Snapshot;

use crate::engine::Harness;
use crate::scenarios::ScenarioResult;

const ONE_HOUR_MS: u64 = 3_600_000;

pub fn run(seed: u64) -> ScenarioResult {
    let config = LiveMarketConfig::premarket();
    let rows = Snapshot::initial(seed::premarket_live());
    let sim = LiveMarketSimulator::new("premarket_live", config.clone(), &rows);
    let mut harness = Harness::new(sim, rows, config.delays, seed);

    let first_fire = harness.next_fire_ms().unwrap_or(0);
    harness.advance_to(first_fire.saturating_sub(1));
    harness.cancel();
    let fired = harness.advance_to(ONE_HOUR_MS);

    let version = harness.snapshot().version();
    ScenarioResult::new(
        "cancellation",
        fired as u64,
        fired == 0 && version == 0,
        format!("cancelled at {}ms, {fired} fires after, version {version}", first_fire.saturating_sub(1)),
    )
}
