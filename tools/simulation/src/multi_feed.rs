//! Multi-feed simulation
//!
//! Runs every dataset of a page side by side on one virtual clock, the
//! way a mounted page runs its schedulers. Aggregates cross-feed
//! metrics.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use market_data::activity::ActivitySimulator;
use market_data::clock::ManualClock;
use market_data::gauges::{BottomStatsSimulator, SentimentSimulator};
use market_data::live::LiveMarketSimulator;
use market_data::seed;
use market_data::stats::StatSetSimulator;
use market_data::upcoming::UpcomingMarketSimulator;
use market_data::{EngineConfig, Simulator, Snapshot};
use serde::Serialize;

use crate::engine::Harness;
use crate::metrics::SimMetrics;
use crate::replay::{self, RunDigest};

/// A harness with its row type erased.
pub trait DatasetRun: Send {
    fn name(&self) -> &str;
    fn advance_to(&mut self, to_ms: u64) -> usize;
    fn cancel(&mut self);
    fn metrics(&self) -> &SimMetrics;
    fn version(&self) -> u64;
    fn digest(&self) -> RunDigest;
}

impl<S> DatasetRun for Harness<S>
where
    S: Simulator,
    S::Row: Serialize,
{
    fn name(&self) -> &str {
        self.simulator().name()
    }

    fn advance_to(&mut self, to_ms: u64) -> usize {
        Harness::advance_to(self, to_ms)
    }

    fn cancel(&mut self) {
        Harness::cancel(self)
    }

    fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }

    fn version(&self) -> u64 {
        self.snapshot().version()
    }

    fn digest(&self) -> RunDigest {
        replay::capture(self)
    }
}

/// All datasets of one page on a shared virtual clock.
pub struct MultiFeedSim {
    runs: Vec<Box<dyn DatasetRun>>,
    clock: Arc<ManualClock>,
    now_ms: u64,
}

impl MultiFeedSim {
    /// Home page: live, upcoming, sentiment, bottom stats, activity.
    /// Dataset `i` runs with seed `seed + i`.
    pub fn home(config: &EngineConfig, start: DateTime<Utc>, seed: u64) -> Self {
        let clock = Arc::new(ManualClock::new(start));

        let live_seed = Snapshot::initial(seed::home_live(start));
        let live = LiveMarketSimulator::new("home_live", config.home_live.clone(), &live_seed);
        let live = Harness::new(live, live_seed.clone(), config.home_live.delays, seed);
        let activity = ActivitySimulator::from_markets(config.activity.clone(), &live_seed, clock.clone())
            .with_live_prices(live.subscribe());
        let sentiment_seed = Snapshot::initial(vec![seed::sentiment()]);
        let sentiment = SentimentSimulator::new(config.sentiment.clone(), &sentiment_seed);

        let runs: Vec<Box<dyn DatasetRun>> = vec![
            Box::new(live),
            Box::new(Harness::new(
                UpcomingMarketSimulator::new("home_upcoming", config.home_upcoming.clone()),
                Snapshot::initial(seed::home_upcoming()),
                config.home_upcoming.delays,
                seed.wrapping_add(1),
            )),
            Box::new(Harness::new(sentiment, sentiment_seed, config.sentiment.delays, seed.wrapping_add(2))),
            Box::new(Harness::new(
                BottomStatsSimulator::new(config.bottom_stats.clone()),
                Snapshot::initial(vec![seed::bottom_stats()]),
                config.bottom_stats.delays,
                seed.wrapping_add(3),
            )),
            Box::new(
                Harness::new(
                    activity,
                    Snapshot::initial(seed::activities(start)),
                    config.activity.delays,
                    seed.wrapping_add(4),
                )
                .with_clock(clock.clone()),
            ),
        ];
        Self { runs, clock, now_ms: 0 }
    }

    /// Pre-market page: live, upcoming, headline stats.
    pub fn premarket(config: &EngineConfig, start: DateTime<Utc>, seed: u64) -> Self {
        let live_seed = Snapshot::initial(seed::premarket_live());
        let live = LiveMarketSimulator::new("premarket_live", config.premarket_live.clone(), &live_seed);

        let runs: Vec<Box<dyn DatasetRun>> = vec![
            Box::new(Harness::new(live, live_seed, config.premarket_live.delays, seed)),
            Box::new(Harness::new(
                UpcomingMarketSimulator::new("premarket_upcoming", config.premarket_upcoming.clone()),
                Snapshot::initial(seed::premarket_upcoming()),
                config.premarket_upcoming.delays,
                seed.wrapping_add(1),
            )),
            Box::new(Harness::new(
                StatSetSimulator,
                Snapshot::initial(seed::stats()),
                config.stats.delays,
                seed.wrapping_add(2),
            )),
        ];
        Self {
            runs,
            clock: Arc::new(ManualClock::new(start)),
            now_ms: 0,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn clock(&self) -> &Arc<ManualClock> {
        &self.clock
    }

    pub fn feed_count(&self) -> usize {
        self.runs.len()
    }

    pub fn run(&self, name: &str) -> Option<&dyn DatasetRun> {
        self.runs.iter().find(|r| r.name() == name).map(|r| r.as_ref())
    }

    /// Advance every dataset to `to_ms`; returns total fires.
    pub fn advance_to(&mut self, to_ms: u64) -> usize {
        let fired = self.runs.iter_mut().map(|r| r.advance_to(to_ms)).sum();
        self.now_ms = self.now_ms.max(to_ms);
        fired
    }

    pub fn advance_by(&mut self, ms: u64) -> usize {
        self.advance_to(self.now_ms.saturating_add(ms))
    }

    /// Unmount: cancel every dataset.
    pub fn cancel_all(&mut self) {
        for run in &mut self.runs {
            run.cancel();
        }
    }

    /// Aggregate metrics across all datasets.
    pub fn aggregate_metrics(&self) -> SimMetrics {
        let mut combined = SimMetrics::new();
        for run in &self.runs {
            combined.merge(run.metrics());
        }
        combined
    }

    pub fn digests(&self) -> BTreeMap<String, RunDigest> {
        self.runs
            .iter()
            .map(|r| (r.name().to_string(), r.digest()))
            .collect()
    }
}
