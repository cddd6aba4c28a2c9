//! Moni score ceiling
//!
//! A score just under the ceiling receives a step that overshoots it.

use market_data::config::UpcomingMarketConfig;
use market_data::seed;
use market_data::upcoming::{UpcomingDraw, UpcomingMarketSimulator};
use types::market::MONI_SCORE_MAX;

use crate::scenarios::ScenarioResult;

/// 39950 + 200 lands exactly on the 40000 ceiling.
pub fn run() -> ScenarioResult {
    let sim = UpcomingMarketSimulator::new("moni_clamp", UpcomingMarketConfig::home());
    let Some(mut row) = seed::home_upcoming().into_iter().next() else {
        return ScenarioResult::new("moni_clamp", 0, false, "no seed rows".into());
    };
    row.moni_score = 39_950;

    let draw = UpcomingDraw {
        watchers: 0.0,
        moni_delta: 200,
        investor_bump: false,
    };
    let next = sim.apply(&row, draw);
    ScenarioResult::new(
        "moni_clamp",
        1,
        next.moni_score == MONI_SCORE_MAX,
        format!("39950 + 200 -> {}, ceiling {MONI_SCORE_MAX}", next.moni_score),
    )
}
