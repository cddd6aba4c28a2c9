//! Virtual-clock harness
//!
//! Drives one simulator through the same fire path the tokio scheduler
//! uses, but on a millisecond counter instead of real sleeps. The RNG
//! both samples the delays and feeds the simulator, exactly as a live
//! run does, so a seed fully determines the event log.

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use market_data::clock::ManualClock;
use market_data::metrics::EngineMetrics;
use market_data::scheduler::fire_once;
use market_data::{FeedReader, Simulator, Snapshot, SnapshotFeed, TickDelays};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::SimMetrics;

/// Events emitted by a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    Fired {
        at_ms: u64,
        version: u64,
        rows_changed: Vec<usize>,
        checksum: String,
    },
    Empty {
        at_ms: u64,
    },
    Cancelled {
        at_ms: u64,
    },
}

impl SimEvent {
    pub fn at_ms(&self) -> u64 {
        match self {
            SimEvent::Fired { at_ms, .. }
            | SimEvent::Empty { at_ms }
            | SimEvent::Cancelled { at_ms } => *at_ms,
        }
    }
}

/// Deterministic runner for one dataset.
pub struct Harness<S: Simulator> {
    simulator: S,
    feed: SnapshotFeed<S::Row>,
    seed_snapshot: Snapshot<S::Row>,
    delays: TickDelays,
    engine_metrics: EngineMetrics,
    rng: ChaCha8Rng,
    seed: u64,
    now_ms: u64,
    next_fire_ms: Option<u64>,
    clock: Option<Arc<ManualClock>>,
    pub events: Vec<SimEvent>,
    pub metrics: SimMetrics,
}

impl<S> Harness<S>
where
    S: Simulator,
    S::Row: Serialize,
{
    /// Build a harness and schedule the first fire.
    pub fn new(simulator: S, seed_snapshot: Snapshot<S::Row>, delays: TickDelays, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let first = delays.initial.sample(&mut rng).as_millis() as u64;
        Self {
            feed: SnapshotFeed::new(simulator.name().to_string(), seed_snapshot.clone()),
            simulator,
            seed_snapshot,
            delays,
            engine_metrics: EngineMetrics::new(),
            rng,
            seed,
            now_ms: 0,
            next_fire_ms: Some(first),
            clock: None,
            events: Vec::new(),
            metrics: SimMetrics::new(),
        }
    }

    /// Advance this wall clock in step with virtual time.
    pub fn with_clock(mut self, clock: Arc<ManualClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn seed_snapshot(&self) -> &Snapshot<S::Row> {
        &self.seed_snapshot
    }

    pub fn snapshot(&self) -> Snapshot<S::Row> {
        self.feed.latest()
    }

    /// Reader over this run's snapshots, for simulators that follow it.
    pub fn subscribe(&self) -> FeedReader<S::Row> {
        self.feed.subscribe()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn next_fire_ms(&self) -> Option<u64> {
        self.next_fire_ms
    }

    pub fn is_cancelled(&self) -> bool {
        self.next_fire_ms.is_none()
    }

    pub fn engine_metrics(&self) -> &EngineMetrics {
        &self.engine_metrics
    }

    fn move_clock(&mut self, to_ms: u64) {
        if let Some(clock) = &self.clock {
            clock.advance(ChronoDuration::milliseconds((to_ms - self.now_ms) as i64));
        }
        self.now_ms = to_ms;
    }

    /// Fire everything due up to and including `to_ms`. Returns the
    /// number of fires.
    pub fn advance_to(&mut self, to_ms: u64) -> usize {
        let mut fired = 0;
        while let Some(at) = self.next_fire_ms.filter(|&at| at <= to_ms) {
            self.move_clock(at.max(self.now_ms));
            self.fire();
            fired += 1;
        }
        if to_ms > self.now_ms {
            self.move_clock(to_ms);
        }
        fired
    }

    /// Advance by `ms` from the current virtual time.
    pub fn advance_by(&mut self, ms: u64) -> usize {
        self.advance_to(self.now_ms.saturating_add(ms))
    }

    /// Run exactly `n` fires, however long that takes in virtual time.
    pub fn run_ticks(&mut self, n: usize) -> usize {
        let mut fired = 0;
        while fired < n {
            let Some(at) = self.next_fire_ms else { break };
            fired += self.advance_to(at);
        }
        fired
    }

    fn fire(&mut self) {
        let before = self.feed.latest();
        let keep_going = fire_once(&self.simulator, &self.feed, &self.engine_metrics, &mut self.rng);
        let after = self.feed.latest();

        let event = if after.version() == before.version() {
            SimEvent::Empty { at_ms: self.now_ms }
        } else {
            SimEvent::Fired {
                at_ms: self.now_ms,
                version: after.version(),
                rows_changed: after.fresh_indices(&before),
                checksum: after.checksum(),
            }
        };
        debug!(dataset = self.simulator.name(), at_ms = self.now_ms, ?event, "Harness fire");
        self.push(event);

        self.next_fire_ms = if keep_going {
            let gap = self.delays.repeat.sample(&mut self.rng).as_millis() as u64;
            Some(self.now_ms + gap)
        } else {
            None
        };
    }

    /// Cancel at the current virtual time. Nothing fires afterwards, no
    /// matter how far the clock is advanced.
    pub fn cancel(&mut self) {
        if self.next_fire_ms.take().is_some() {
            self.push(SimEvent::Cancelled { at_ms: self.now_ms });
        }
    }

    fn push(&mut self, event: SimEvent) {
        self.metrics.record_event(&event);
        self.events.push(event);
    }

    /// Checksums of every published snapshot, in order.
    pub fn checksums(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Fired { checksum, .. } => Some(checksum.as_str()),
                _ => None,
            })
            .collect()
    }
}
