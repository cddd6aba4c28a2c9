//! Per-page feed bundles
//!
//! Each page owns the schedulers for the datasets it shows. Bundles are
//! built idle; `start` spawns the runs (inside a tokio runtime) and
//! `dispose` cancels every run and closes every feed.

use std::sync::Arc;

use market_data::activity::ActivitySimulator;
use market_data::clock::Clock;
use market_data::gauges::{BottomStatsSimulator, SentimentSimulator};
use market_data::live::LiveMarketSimulator;
use market_data::metrics::EngineMetrics;
use market_data::seed;
use market_data::stats::StatSetSimulator;
use market_data::upcoming::UpcomingMarketSimulator;
use market_data::{EngineConfig, Simulator, Snapshot, SnapshotFeed, TickScheduler};
use tracing::info;
use types::prelude::*;

fn scheduler<S: Simulator>(
    sim: S,
    seed: Snapshot<S::Row>,
    delays: market_data::TickDelays,
    metrics: &Arc<EngineMetrics>,
) -> TickScheduler<S> {
    let feed = Arc::new(SnapshotFeed::new(sim.name().to_string(), seed));
    TickScheduler::new(sim, feed, delays, Arc::clone(metrics))
}

fn start_one<S: Simulator>(sched: &TickScheduler<S>, seed: Option<u64>) {
    match seed {
        Some(seed) => sched.start_seeded(seed),
        None => sched.start(),
    }
}

fn dispose_one<S: Simulator>(sched: &TickScheduler<S>) {
    sched.cancel();
    sched.feed().close();
}

/// Home page: live and upcoming tables, sentiment gauge, bottom stats
/// bar, activity stream. The ended table is static.
pub struct HomeFeeds {
    live: TickScheduler<LiveMarketSimulator>,
    upcoming: TickScheduler<UpcomingMarketSimulator>,
    sentiment: TickScheduler<SentimentSimulator>,
    bottom_stats: TickScheduler<BottomStatsSimulator>,
    activities: TickScheduler<ActivitySimulator>,
    ended: Snapshot<EndedRow>,
}

impl HomeFeeds {
    pub fn new(config: &EngineConfig, clock: Arc<dyn Clock>, metrics: &Arc<EngineMetrics>) -> Self {
        let now = clock.now();

        let live_seed = Snapshot::initial(seed::home_live(now));
        let live_sim = LiveMarketSimulator::new("home_live", config.home_live.clone(), &live_seed);
        let live = scheduler(live_sim, live_seed.clone(), config.home_live.delays, metrics);
        let activity_sim = ActivitySimulator::from_markets(config.activity.clone(), &live_seed, clock)
            .with_live_prices(live.feed().subscribe());

        let sentiment_seed = Snapshot::initial(vec![seed::sentiment()]);
        let sentiment_sim = SentimentSimulator::new(config.sentiment.clone(), &sentiment_seed);

        Self {
            live,
            upcoming: scheduler(
                UpcomingMarketSimulator::new("home_upcoming", config.home_upcoming.clone()),
                Snapshot::initial(seed::home_upcoming()),
                config.home_upcoming.delays,
                metrics,
            ),
            sentiment: scheduler(sentiment_sim, sentiment_seed, config.sentiment.delays, metrics),
            bottom_stats: scheduler(
                BottomStatsSimulator::new(config.bottom_stats.clone()),
                Snapshot::initial(vec![seed::bottom_stats()]),
                config.bottom_stats.delays,
                metrics,
            ),
            activities: scheduler(
                activity_sim,
                Snapshot::initial(seed::activities(now)),
                config.activity.delays,
                metrics,
            ),
            ended: Snapshot::initial(seed::ended_markets(now)),
        }
    }

    /// Start every run. A seed makes the whole page reproducible.
    pub fn start(&self, seed: Option<u64>) {
        start_one(&self.live, seed);
        start_one(&self.upcoming, seed.map(|s| s.wrapping_add(1)));
        start_one(&self.sentiment, seed.map(|s| s.wrapping_add(2)));
        start_one(&self.bottom_stats, seed.map(|s| s.wrapping_add(3)));
        start_one(&self.activities, seed.map(|s| s.wrapping_add(4)));
        info!(seeded = seed.is_some(), "Home feeds started");
    }

    pub fn dispose(&self) {
        dispose_one(&self.live);
        dispose_one(&self.upcoming);
        dispose_one(&self.sentiment);
        dispose_one(&self.bottom_stats);
        dispose_one(&self.activities);
        info!("Home feeds disposed");
    }

    pub fn is_running(&self) -> bool {
        self.live.is_running()
            || self.upcoming.is_running()
            || self.sentiment.is_running()
            || self.bottom_stats.is_running()
            || self.activities.is_running()
    }

    pub fn live(&self) -> &Arc<SnapshotFeed<MarketRow>> {
        self.live.feed()
    }

    pub fn upcoming(&self) -> &Arc<SnapshotFeed<UpcomingRow>> {
        self.upcoming.feed()
    }

    pub fn sentiment(&self) -> &Arc<SnapshotFeed<SentimentGauge>> {
        self.sentiment.feed()
    }

    pub fn bottom_stats(&self) -> &Arc<SnapshotFeed<BottomStats>> {
        self.bottom_stats.feed()
    }

    pub fn activities(&self) -> &Arc<SnapshotFeed<Activity>> {
        self.activities.feed()
    }

    pub fn ended(&self) -> &Snapshot<EndedRow> {
        &self.ended
    }
}

/// Pre-market page: live and upcoming tables plus the headline stats.
pub struct PremarketFeeds {
    live: TickScheduler<LiveMarketSimulator>,
    upcoming: TickScheduler<UpcomingMarketSimulator>,
    stats: TickScheduler<StatSetSimulator>,
}

impl PremarketFeeds {
    pub fn new(config: &EngineConfig, metrics: &Arc<EngineMetrics>) -> Self {
        let live_seed = Snapshot::initial(seed::premarket_live());
        let live_sim =
            LiveMarketSimulator::new("premarket_live", config.premarket_live.clone(), &live_seed);

        Self {
            live: scheduler(live_sim, live_seed, config.premarket_live.delays, metrics),
            upcoming: scheduler(
                UpcomingMarketSimulator::new("premarket_upcoming", config.premarket_upcoming.clone()),
                Snapshot::initial(seed::premarket_upcoming()),
                config.premarket_upcoming.delays,
                metrics,
            ),
            stats: scheduler(
                StatSetSimulator,
                Snapshot::initial(seed::stats()),
                config.stats.delays,
                metrics,
            ),
        }
    }

    pub fn start(&self, seed: Option<u64>) {
        start_one(&self.live, seed);
        start_one(&self.upcoming, seed.map(|s| s.wrapping_add(1)));
        start_one(&self.stats, seed.map(|s| s.wrapping_add(2)));
        info!(seeded = seed.is_some(), "Premarket feeds started");
    }

    pub fn dispose(&self) {
        dispose_one(&self.live);
        dispose_one(&self.upcoming);
        dispose_one(&self.stats);
        info!("Premarket feeds disposed");
    }

    pub fn is_running(&self) -> bool {
        self.live.is_running() || self.upcoming.is_running() || self.stats.is_running()
    }

    pub fn live(&self) -> &Arc<SnapshotFeed<MarketRow>> {
        self.live.feed()
    }

    pub fn upcoming(&self) -> &Arc<SnapshotFeed<UpcomingRow>> {
        self.upcoming.feed()
    }

    pub fn stats(&self) -> &Arc<SnapshotFeed<StatValue>> {
        self.stats.feed()
    }
}

/// Feeds of whichever page is mounted.
pub enum PageFeeds {
    Home(HomeFeeds),
    Premarket(PremarketFeeds),
}

impl PageFeeds {
    pub fn dispose(&self) {
        match self {
            PageFeeds::Home(feeds) => feeds.dispose(),
            PageFeeds::Premarket(feeds) => feeds.dispose(),
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            PageFeeds::Home(feeds) => feeds.is_running(),
            PageFeeds::Premarket(feeds) => feeds.is_running(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_data::clock::ManualClock;
    use std::time::Duration;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_home_feeds_seeded_idle() {
        let metrics = Arc::new(EngineMetrics::new());
        let feeds = HomeFeeds::new(&EngineConfig::default(), clock(), &metrics);
        assert_eq!(feeds.live().latest().len(), 6);
        assert_eq!(feeds.upcoming().latest().len(), 6);
        assert_eq!(feeds.ended().len(), 10);
        assert_eq!(feeds.activities().latest().len(), 10);
        assert_eq!(feeds.sentiment().latest().len(), 1);
        assert!(!feeds.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_feeds_tick_then_dispose() {
        let metrics = Arc::new(EngineMetrics::new());
        let feeds = HomeFeeds::new(&EngineConfig::default(), clock(), &metrics);
        feeds.start(Some(7));
        assert!(feeds.is_running());

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(feeds.live().latest().version() >= 1);
        assert!(feeds.activities().latest().version() >= 1);
        assert!(feeds.sentiment().latest().version() >= 1);

        feeds.dispose();
        assert!(!feeds.is_running());
        assert!(feeds.live().is_closed());

        let frozen = feeds.live().latest().version();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(feeds.live().latest().version(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_premarket_stats_fire_after_eight_seconds() {
        let metrics = Arc::new(EngineMetrics::new());
        let feeds = PremarketFeeds::new(&EngineConfig::default(), &metrics);
        feeds.start(Some(1));

        tokio::time::sleep(Duration::from_millis(7_900)).await;
        assert_eq!(feeds.stats().latest().version(), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(feeds.stats().latest().version(), 1);

        feeds.dispose();
    }
}
