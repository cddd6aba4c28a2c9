//! Upcoming market simulator
//!
//! Watchers only grow. The moni score (home preset) walks within
//! `[0, MONI_SCORE_MAX]` with an upward bias. The investor extra count
//! occasionally gains one.

use rand::Rng;
use types::market::UpcomingRow;

use crate::config::UpcomingMarketConfig;
use crate::scheduler::Simulator;
use crate::snapshot::Snapshot;

/// The random part of one row update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpcomingDraw {
    /// Raw uniform draw; floored before it is added.
    pub watchers: f64,
    pub moni_delta: i64,
    pub investor_bump: bool,
}

pub struct UpcomingMarketSimulator {
    name: String,
    config: UpcomingMarketConfig,
}

impl UpcomingMarketSimulator {
    pub fn new(name: impl Into<String>, config: UpcomingMarketConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn config(&self) -> &UpcomingMarketConfig {
        &self.config
    }

    pub fn draw<R: Rng + ?Sized>(&self, row: &UpcomingRow, rng: &mut R) -> UpcomingDraw {
        let watchers = self.config.watchers.step.sample(rng);
        let moni_delta = self
            .config
            .moni
            .map(|walk| walk.draw(row.moni_score, rng))
            .unwrap_or(0);
        let investor_bump = rng.gen_bool(self.config.investor_bump.probability.clamp(0.0, 1.0));
        UpcomingDraw {
            watchers,
            moni_delta,
            investor_bump,
        }
    }

    pub fn apply(&self, row: &UpcomingRow, draw: UpcomingDraw) -> UpcomingRow {
        let mut next = row.clone();
        next.watcher_count = self.config.watchers.apply(row.watcher_count, draw.watchers);
        if let Some(walk) = self.config.moni {
            next.moni_score = walk.apply(row.moni_score, draw.moni_delta);
        }
        next.investor_extra_count = self
            .config
            .investor_bump
            .apply(row.investor_extra_count, draw.investor_bump);
        next
    }
}

impl Simulator for UpcomingMarketSimulator {
    type Row = UpcomingRow;

    fn name(&self) -> &str {
        &self.name
    }

    fn tick<R: Rng + ?Sized>(&self, current: &Snapshot<UpcomingRow>, rng: &mut R) -> Option<Snapshot<UpcomingRow>> {
        if current.is_empty() {
            return None;
        }
        let updates = self
            .config
            .pick
            .pick(current.len(), rng)
            .into_iter()
            .filter_map(|index| {
                let row = current.get(index)?;
                let draw = self.draw(row, rng);
                Some((index, self.apply(row, draw)))
            })
            .collect();
        Some(current.with_replaced(updates))
    }
}
