//! Injected price steps
//!
//! Feeds the live simulator a fixed price step instead of a random one
//! and checks the band clamp against the row's seed price.

use market_data::config::LiveMarketConfig;
use market_data::live::{LiveDraw, LiveMarketSimulator};
use market_data::seed;
use market_data::Snapshot;
use types::market::MarketRow;

use crate::scenarios::ScenarioResult;

const TOLERANCE: f64 = 1e-12;

fn push(seed_price: f64, delta: f64) -> Option<f64> {
    let mut rows = seed::premarket_live();
    rows.truncate(1);
    rows.first_mut()?.last_price = seed_price;
    let seed = Snapshot::initial(rows);

    let sim = LiveMarketSimulator::new("price_push", LiveMarketConfig::premarket(), &seed);
    let draw = LiveDraw {
        price_delta: delta,
        volume_24h_delta: 0.0,
        total_volume_delta: 0.0,
    };
    let row: &MarketRow = seed.get(0)?;
    sim.apply(0, row, draw).map(|next| next.last_price)
}

/// 0.3499 pushed up 2% stays inside the band.
pub fn run_unclamped() -> ScenarioResult {
    let expected = 0.356898;
    match push(0.3499, 0.02) {
        Some(price) => ScenarioResult::new(
            "price_push_unclamped",
            1,
            (price - expected).abs() < TOLERANCE,
            format!("0.3499 * 1.02 = {price}, expected {expected}"),
        ),
        None => ScenarioResult::new("price_push_unclamped", 0, false, "no row".into()),
    }
}

/// 0.10 pushed toward 0.13 stops at the 20% ceiling.
pub fn run_clamped() -> ScenarioResult {
    let expected = 0.12;
    match push(0.10, 0.30) {
        Some(price) => ScenarioResult::new(
            "price_push_clamped",
            1,
            (price - expected).abs() < TOLERANCE,
            format!("0.10 * 1.30 clamped to {price}, expected {expected}"),
        ),
        None => ScenarioResult::new("price_push_clamped", 0, false, "no row".into()),
    }
}
