//! Harness metrics
//!
//! Counts fires, empty ticks and changed rows, and buckets the virtual
//! gap between consecutive fires so delay ranges can be checked at a
//! glance.

use crate::engine::SimEvent;
use serde::{Deserialize, Serialize};

/// Inter-fire gap histogram bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayBucket {
    pub label: String,
    pub lower_ms: u64,
    pub upper_ms: u64,
    pub count: u64,
}

/// Aggregated harness metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimMetrics {
    pub fires: u64,
    pub empty_ticks: u64,
    pub cancels: u64,
    pub rows_changed: u64,
    pub max_rows_changed: usize,
    /// How often each row index changed.
    pub row_hits: Vec<u64>,
    pub delay_buckets: Vec<DelayBucket>,
    pub virtual_elapsed_ms: u64,
    #[serde(skip)]
    last_fire_ms: Option<u64>,
}

impl SimMetrics {
    /// Create empty metrics with default delay buckets.
    pub fn new() -> Self {
        Self {
            delay_buckets: default_buckets(),
            ..Self::default()
        }
    }

    /// Record a single event into metrics.
    pub fn record_event(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Fired {
                at_ms,
                rows_changed,
                ..
            } => {
                self.fires += 1;
                self.rows_changed += rows_changed.len() as u64;
                self.max_rows_changed = self.max_rows_changed.max(rows_changed.len());
                for &index in rows_changed {
                    if self.row_hits.len() <= index {
                        self.row_hits.resize(index + 1, 0);
                    }
                    self.row_hits[index] += 1;
                }
                self.record_fire_time(*at_ms);
            }
            SimEvent::Empty { at_ms } => {
                self.empty_ticks += 1;
                self.record_fire_time(*at_ms);
            }
            SimEvent::Cancelled { at_ms } => {
                self.cancels += 1;
                self.virtual_elapsed_ms = self.virtual_elapsed_ms.max(*at_ms);
            }
        }
    }

    fn record_fire_time(&mut self, at_ms: u64) {
        if let Some(prev) = self.last_fire_ms {
            self.record_delay(at_ms.saturating_sub(prev));
        }
        self.last_fire_ms = Some(at_ms);
        self.virtual_elapsed_ms = self.virtual_elapsed_ms.max(at_ms);
    }

    /// Record one inter-fire gap in milliseconds.
    pub fn record_delay(&mut self, gap_ms: u64) {
        for bucket in &mut self.delay_buckets {
            if gap_ms >= bucket.lower_ms && gap_ms < bucket.upper_ms {
                bucket.count += 1;
                return;
            }
        }
        // Overflow bucket (last)
        if let Some(last) = self.delay_buckets.last_mut() {
            last.count += 1;
        }
    }

    /// Process all events from a slice.
    pub fn ingest_events(&mut self, events: &[SimEvent]) {
        for event in events {
            self.record_event(event);
        }
    }

    /// Fold another run's counters into this one. Delay buckets are summed
    /// by position.
    pub fn merge(&mut self, other: &SimMetrics) {
        self.fires += other.fires;
        self.empty_ticks += other.empty_ticks;
        self.cancels += other.cancels;
        self.rows_changed += other.rows_changed;
        self.max_rows_changed = self.max_rows_changed.max(other.max_rows_changed);
        self.virtual_elapsed_ms = self.virtual_elapsed_ms.max(other.virtual_elapsed_ms);
        for (mine, theirs) in self.delay_buckets.iter_mut().zip(&other.delay_buckets) {
            mine.count += theirs.count;
        }
    }

    /// Fires per virtual minute.
    pub fn fires_per_minute(&self) -> f64 {
        if self.virtual_elapsed_ms == 0 {
            return 0.0;
        }
        self.fires as f64 / (self.virtual_elapsed_ms as f64 / 60_000.0)
    }

    /// Mean rows changed per fire.
    pub fn mean_rows_changed(&self) -> f64 {
        if self.fires == 0 {
            return 0.0;
        }
        self.rows_changed as f64 / self.fires as f64
    }
}

fn default_buckets() -> Vec<DelayBucket> {
    let bounds: [(u64, u64, &str); 6] = [
        (0, 2_000, "<2s"),
        (2_000, 4_000, "2-4s"),
        (4_000, 6_000, "4-6s"),
        (6_000, 10_000, "6-10s"),
        (10_000, 16_000, "10-16s"),
        (16_000, u64::MAX, ">=16s"),
    ];
    bounds
        .iter()
        .map(|(lo, hi, label)| DelayBucket {
            label: label.to_string(),
            lower_ms: *lo,
            upper_ms: *hi,
            count: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(at_ms: u64, rows: Vec<usize>) -> SimEvent {
        SimEvent::Fired {
            at_ms,
            version: 0,
            rows_changed: rows,
            checksum: String::new(),
        }
    }

    #[test]
    fn test_counts_and_row_hits() {
        let mut m = SimMetrics::new();
        m.ingest_events(&[
            fired(3_000, vec![0]),
            fired(7_000, vec![0, 4]),
            SimEvent::Empty { at_ms: 9_500 },
        ]);
        assert_eq!(m.fires, 2);
        assert_eq!(m.empty_ticks, 1);
        assert_eq!(m.rows_changed, 3);
        assert_eq!(m.max_rows_changed, 2);
        assert_eq!(m.row_hits, vec![2, 0, 0, 0, 1]);
        assert_eq!(m.virtual_elapsed_ms, 9_500);
    }

    #[test]
    fn test_delay_buckets() {
        let mut m = SimMetrics::new();
        m.ingest_events(&[fired(0, vec![]), fired(3_000, vec![]), fired(8_000, vec![])]);
        let counts: Vec<u64> = m.delay_buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 1, 1, 0, 0, 0]);

        m.record_delay(60_000);
        assert_eq!(m.delay_buckets.last().unwrap().count, 1);
    }

    #[test]
    fn test_rates() {
        let mut m = SimMetrics::new();
        assert_eq!(m.fires_per_minute(), 0.0);
        assert_eq!(m.mean_rows_changed(), 0.0);
        m.ingest_events(&[fired(30_000, vec![1]), fired(60_000, vec![1, 2])]);
        assert!((m.fires_per_minute() - 2.0).abs() < 1e-9);
        assert!((m.mean_rows_changed() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_merge() {
        let mut a = SimMetrics::new();
        a.ingest_events(&[fired(1_000, vec![0]), fired(4_000, vec![0])]);
        let mut b = SimMetrics::new();
        b.ingest_events(&[fired(2_000, vec![1, 2]), fired(7_000, vec![1])]);
        a.merge(&b);
        assert_eq!(a.fires, 4);
        assert_eq!(a.max_rows_changed, 2);
        assert_eq!(a.delay_buckets.iter().map(|b| b.count).sum::<u64>(), 2);
    }
}
