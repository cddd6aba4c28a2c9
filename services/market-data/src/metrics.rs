//! Engine counters
//!
//! Shared by every scheduler of a page so one export covers the whole
//! set of feeds. All counters are relaxed atomics; the latency window
//! sits behind a mutex.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Core engine metrics.
pub struct EngineMetrics {
    // Ticks
    pub ticks_fired: AtomicU64,
    pub ticks_empty: AtomicU64,
    pub rows_mutated: AtomicU64,
    pub tick_latency_ns: Mutex<LatencyTracker>,

    // Publishing
    pub snapshots_published: AtomicU64,
    pub publish_failures: AtomicU64,

    // Scheduler lifecycle
    pub schedulers_started: AtomicU64,
    pub schedulers_cancelled: AtomicU64,

    pub alerts: Mutex<Vec<Alert>>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            ticks_fired: AtomicU64::new(0),
            ticks_empty: AtomicU64::new(0),
            rows_mutated: AtomicU64::new(0),
            tick_latency_ns: Mutex::new(LatencyTracker::new(1000)),
            snapshots_published: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            schedulers_started: AtomicU64::new(0),
            schedulers_cancelled: AtomicU64::new(0),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Record a tick that produced a snapshot.
    pub fn record_tick(&self, rows_changed: usize, latency_ns: u64) {
        self.ticks_fired.fetch_add(1, Ordering::Relaxed);
        self.rows_mutated
            .fetch_add(rows_changed as u64, Ordering::Relaxed);
        if let Ok(mut tracker) = self.tick_latency_ns.lock() {
            tracker.record(latency_ns);
        }
    }

    /// Record a tick on an empty dataset.
    pub fn record_empty_tick(&self) {
        self.ticks_fired.fetch_add(1, Ordering::Relaxed);
        self.ticks_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_started(&self) {
        self.schedulers_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.schedulers_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Check alert thresholds and generate alerts.
    pub fn check_thresholds(&self, thresholds: &AlertThresholds) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let failures = self.publish_failures.load(Ordering::Relaxed);
        if failures > thresholds.max_publish_failures {
            alerts.push(Alert {
                level: AlertLevel::Critical,
                metric: "publish_failures".to_string(),
                message: format!(
                    "Publish failures: {} > threshold {}",
                    failures, thresholds.max_publish_failures
                ),
            });
        }

        let fired = self.ticks_fired.load(Ordering::Relaxed);
        let mutated = self.rows_mutated.load(Ordering::Relaxed);
        let published = self.snapshots_published.load(Ordering::Relaxed);
        if published > 0 && mutated > published * thresholds.max_rows_per_tick {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                metric: "rows_per_tick".to_string(),
                message: format!(
                    "Rows mutated per tick above {}: {} rows over {} ticks",
                    thresholds.max_rows_per_tick, mutated, fired
                ),
            });
        }

        if let Ok(tracker) = self.tick_latency_ns.lock() {
            if let Some(p99) = tracker.percentile(99) {
                if p99 > thresholds.max_tick_p99_ns {
                    alerts.push(Alert {
                        level: AlertLevel::Warning,
                        metric: "tick_latency_p99".to_string(),
                        message: format!(
                            "Tick latency p99: {}ns > threshold {}ns",
                            p99, thresholds.max_tick_p99_ns
                        ),
                    });
                }
            }
        }

        if let Ok(mut alert_store) = self.alerts.lock() {
            alert_store.extend(alerts.clone());
        }

        alerts
    }

    /// Export counters keyed by name.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert("ticks_fired".to_string(), self.ticks_fired.load(Ordering::Relaxed));
        m.insert("ticks_empty".to_string(), self.ticks_empty.load(Ordering::Relaxed));
        m.insert("rows_mutated".to_string(), self.rows_mutated.load(Ordering::Relaxed));
        m.insert("snapshots_published".to_string(), self.snapshots_published.load(Ordering::Relaxed));
        m.insert("publish_failures".to_string(), self.publish_failures.load(Ordering::Relaxed));
        m.insert("schedulers_started".to_string(), self.schedulers_started.load(Ordering::Relaxed));
        m.insert("schedulers_cancelled".to_string(), self.schedulers_cancelled.load(Ordering::Relaxed));
        m
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Sliding window of latency samples.
pub struct LatencyTracker {
    samples: Vec<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    pub fn record(&mut self, value: u64) {
        if self.samples.len() >= self.max_samples {
            self.samples.remove(0);
        }
        self.samples.push(value);
    }

    /// Get a percentile value (0-100).
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        let idx = (p as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as u64)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub level: AlertLevel,
    pub metric: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AlertThresholds {
    pub max_publish_failures: u64,
    /// Average rows changed per published snapshot.
    pub max_rows_per_tick: u64,
    pub max_tick_p99_ns: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_publish_failures: 0,
            max_rows_per_tick: 2,
            max_tick_p99_ns: 1_000_000, // 1ms
        }
    }
}
