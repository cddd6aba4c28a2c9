//! Tick scheduling
//!
//! A `TickScheduler` owns at most one pending run. Each run is a tokio
//! task that sleeps a jittered delay, asks its simulator for the next
//! snapshot, publishes it, and goes back to sleep.
//!
//! ```text
//!  Idle ──start──▶ Scheduled ──delay──▶ Firing ──publish──▶ Scheduled ─ …
//!                     │                   │
//!                     └──────cancel───────┴──────▶ Cancelled (terminal)
//! ```
//!
//! The fire section (tick + publish) runs under the run's state lock and
//! `cancel` takes the same lock, so once `cancel` returns no snapshot of
//! that run is ever published.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, FeedError};
use crate::feed::SnapshotFeed;
use crate::metrics::EngineMetrics;
use crate::snapshot::Snapshot;

/// Produces the next snapshot of a dataset from the current one.
pub trait Simulator: Send + Sync + 'static {
    type Row: Send + Sync + 'static;

    fn name(&self) -> &str;

    /// `None` when there is nothing to mutate (empty dataset).
    fn tick<R: Rng + ?Sized>(
        &self,
        current: &Snapshot<Self::Row>,
        rng: &mut R,
    ) -> Option<Snapshot<Self::Row>>;
}

/// Uniform delay in `[min_ms, max_ms]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub const fn secs(min: u64, max: u64) -> Self {
        Self::new(min * 1000, max * 1000)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    pub fn contains(&self, delay: Duration) -> bool {
        let ms = delay.as_millis() as u64;
        ms >= self.min_ms && ms <= self.max_ms
    }
}

/// First delay after start, then the delay between fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickDelays {
    pub initial: DelayRange,
    pub repeat: DelayRange,
}

impl TickDelays {
    /// Same range for the first and every later fire.
    pub const fn uniform(range: DelayRange) -> Self {
        Self {
            initial: range,
            repeat: range,
        }
    }

    pub fn validate(&self, dataset: &str) -> Result<(), ConfigError> {
        for range in [self.initial, self.repeat] {
            if range.min_ms > range.max_ms {
                return Err(ConfigError::DelayRange {
                    dataset: dataset.to_string(),
                    min_ms: range.min_ms,
                    max_ms: range.max_ms,
                });
            }
        }
        Ok(())
    }
}

/// Lifecycle of a scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    Idle,
    Scheduled,
    Firing,
    Cancelled,
}

struct Run {
    state: Arc<Mutex<SchedulerState>>,
    handle: JoinHandle<()>,
}

/// Drives one simulator against one feed.
pub struct TickScheduler<S: Simulator> {
    simulator: Arc<S>,
    feed: Arc<SnapshotFeed<S::Row>>,
    delays: TickDelays,
    metrics: Arc<EngineMetrics>,
    run: Mutex<Option<Run>>,
}

impl<S: Simulator> TickScheduler<S> {
    pub fn new(
        simulator: S,
        feed: Arc<SnapshotFeed<S::Row>>,
        delays: TickDelays,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            simulator: Arc::new(simulator),
            feed,
            delays,
            metrics,
            run: Mutex::new(None),
        }
    }

    pub fn feed(&self) -> &Arc<SnapshotFeed<S::Row>> {
        &self.feed
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn delays(&self) -> TickDelays {
        self.delays
    }

    /// Start with an entropy-seeded RNG. Must be called inside a tokio runtime.
    pub fn start(&self) {
        self.start_with_rng(ChaCha8Rng::from_entropy());
    }

    /// Start with a fixed seed; the sequence of snapshots is reproducible.
    pub fn start_seeded(&self, seed: u64) {
        self.start_with_rng(ChaCha8Rng::seed_from_u64(seed));
    }

    /// Cancel any previous run, then schedule the first fire.
    pub fn start_with_rng<R: Rng + Send + 'static>(&self, rng: R) {
        let mut slot = self.run.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            self.cancel_run(&previous);
        }

        let state = Arc::new(Mutex::new(SchedulerState::Scheduled));
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.simulator),
            Arc::clone(&self.feed),
            self.delays,
            Arc::clone(&state),
            Arc::clone(&self.metrics),
            rng,
        ));

        self.metrics.record_started();
        info!(
            simulator = self.simulator.name(),
            initial_min_ms = self.delays.initial.min_ms,
            initial_max_ms = self.delays.initial.max_ms,
            "Tick scheduler started"
        );
        *slot = Some(Run { state, handle });
    }

    /// Cancel the pending run. Synchronous and idempotent.
    pub fn cancel(&self) {
        let slot = self.run.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(run) = slot.as_ref() {
            self.cancel_run(run);
        }
    }

    fn cancel_run(&self, run: &Run) {
        let mut state = run.state.lock().unwrap_or_else(|e| e.into_inner());
        if mark_cancelled(&mut state, self.simulator.name(), &self.metrics) {
            run.handle.abort();
        }
    }

    pub fn state(&self) -> SchedulerState {
        let slot = self.run.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(run) => *run.state.lock().unwrap_or_else(|e| e.into_inner()),
            None => SchedulerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state(),
            SchedulerState::Scheduled | SchedulerState::Firing
        )
    }
}

impl<S: Simulator> Drop for TickScheduler<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Move a run to `Cancelled`. Counted once per run; returns `false` if
/// it was already cancelled.
fn mark_cancelled(state: &mut SchedulerState, simulator: &str, metrics: &EngineMetrics) -> bool {
    if *state == SchedulerState::Cancelled {
        return false;
    }
    *state = SchedulerState::Cancelled;
    metrics.record_cancelled();
    info!(simulator = simulator, "Tick scheduler cancelled");
    true
}

/// One fire: tick and publish. Returns `false` when the run must stop.
pub fn fire_once<S: Simulator, R: Rng + ?Sized>(
    simulator: &S,
    feed: &SnapshotFeed<S::Row>,
    metrics: &EngineMetrics,
    rng: &mut R,
) -> bool {
    let started = Instant::now();
    let current = feed.latest();
    let Some(next) = simulator.tick(&current, rng) else {
        metrics.record_empty_tick();
        debug!(simulator = simulator.name(), "Empty dataset, nothing to publish");
        return true;
    };

    let changed = next.fresh_indices(&current).len();
    metrics.record_tick(changed, started.elapsed().as_nanos() as u64);

    match feed.publish(next) {
        Ok(version) => {
            metrics.record_publish();
            debug!(
                simulator = simulator.name(),
                version,
                rows_changed = changed,
                "Tick published"
            );
            true
        }
        Err(FeedError::Closed { feed }) => {
            metrics.record_publish_failure();
            warn!(simulator = simulator.name(), feed = %feed, "Feed closed, stopping run");
            false
        }
        Err(err) => {
            metrics.record_publish_failure();
            warn!(simulator = simulator.name(), error = %err, "Publish rejected");
            true
        }
    }
}

async fn run_loop<S: Simulator, R: Rng + Send>(
    simulator: Arc<S>,
    feed: Arc<SnapshotFeed<S::Row>>,
    delays: TickDelays,
    state: Arc<Mutex<SchedulerState>>,
    metrics: Arc<EngineMetrics>,
    mut rng: R,
) {
    let mut delay = delays.initial.sample(&mut rng);
    loop {
        tokio::time::sleep(delay).await;

        {
            let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
            if *guard == SchedulerState::Cancelled {
                return;
            }
            *guard = SchedulerState::Firing;
            let keep_going = fire_once(simulator.as_ref(), &feed, &metrics, &mut rng);
            if !keep_going {
                mark_cancelled(&mut guard, simulator.name(), &metrics);
                return;
            }
            *guard = SchedulerState::Scheduled;
        }

        delay = delays.repeat.sample(&mut rng);
    }
}
