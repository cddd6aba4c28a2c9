//! Headline stat simulator
//!
//! One stat per tick moves by `randInt(dmin, dmax)` with a fair sign,
//! clamped to the stat's own range. `raw()` changes with the value, so
//! consumers can key their roll animation on it.

use rand::Rng;
use types::stat::StatValue;

use crate::scheduler::Simulator;
use crate::snapshot::Snapshot;
use crate::walk::{stat_apply, stat_draw};

#[derive(Debug, Default)]
pub struct StatSetSimulator;

impl StatSetSimulator {
    pub fn apply(stat: &StatValue, delta: i64) -> StatValue {
        StatValue {
            value: stat_apply(stat.value, delta, stat.min, stat.max),
            ..stat.clone()
        }
    }
}

impl Simulator for StatSetSimulator {
    type Row = StatValue;

    fn name(&self) -> &str {
        "stats"
    }

    fn tick<R: Rng + ?Sized>(&self, current: &Snapshot<StatValue>, rng: &mut R) -> Option<Snapshot<StatValue>> {
        if current.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..current.len());
        let stat = current.get(index)?;
        let delta = stat_draw(stat.delta, rng);
        Some(current.with_replaced(vec![(index, Self::apply(stat, delta))]))
    }
}
