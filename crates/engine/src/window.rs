// Multi-slot windowing: synchronized parallel accumulators

use serde::{Deserialize, Serialize};
use tracing::debug;

use riptide_core::error::{Result, RiptideError};

use crate::stats::{OnlineStats, StatsSnapshot};

/// Snapshot of one slot at cycle close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotStats {
    pub stats: StatsSnapshot,
    /// Push invocations routed to this slot during the cycle (a single push
    /// may carry several values).
    pub pushes: u64,
}

/// Immutable snapshot of all slots for one completed window cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub slots: Vec<SlotStats>,
}

impl Bucket {
    /// Total values accumulated across all slots in this cycle.
    pub fn observations(&self) -> u64 {
        self.slots.iter().map(|s| s.stats.count).sum()
    }
}

/// Synchronizes N parallel `OnlineStats` slots (e.g. bid-side vs. ask-side
/// flow). A cycle closes once every slot has been pushed at least once since
/// the last close; the closed cycle is handed out as an immutable `Bucket`
/// and all slots reset.
#[derive(Debug)]
pub struct MultiSlotWindow {
    slots: Vec<OnlineStats>,
    filled: Vec<bool>,
    pushes: Vec<u64>,
}

impl MultiSlotWindow {
    pub fn new(slots: usize) -> Result<Self> {
        if slots == 0 {
            return Err(RiptideError::EngineError(
                "window needs at least one slot".to_string(),
            ));
        }
        Ok(Self {
            slots: vec![OnlineStats::new(); slots],
            filled: vec![false; slots],
            pushes: vec![0; slots],
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Route `values` into a slot without checking for cycle completion.
    /// Repeated pushes to the same slot accumulate; they never close early.
    pub fn accumulate(&mut self, slot: usize, values: &[f64]) {
        for &v in values {
            self.slots[slot].push(v);
        }
        self.filled[slot] = true;
        self.pushes[slot] += 1;
    }

    /// Route `values` into a slot; returns the closed `Bucket` when this push
    /// completes the cycle. With a single slot every push closes a cycle.
    pub fn push(&mut self, slot: usize, values: &[f64]) -> Option<Bucket> {
        self.accumulate(slot, values);
        if self.filled.iter().all(|f| *f) {
            Some(self.close_cycle())
        } else {
            None
        }
    }

    /// Snapshot all slots into a `Bucket` and reset for the next cycle.
    /// Driven internally by `push`, and externally by time-based callers
    /// that close on a clock boundary instead of slot coverage.
    pub fn close_cycle(&mut self) -> Bucket {
        let bucket = Bucket {
            slots: self
                .slots
                .iter()
                .zip(&self.pushes)
                .map(|(stats, &pushes)| SlotStats {
                    stats: stats.snapshot(),
                    pushes,
                })
                .collect(),
        };
        for slot in &mut self.slots {
            slot.reset();
        }
        self.filled.fill(false);
        self.pushes.fill(0);
        debug!(
            slots = bucket.slots.len(),
            observations = bucket.observations(),
            "window cycle closed"
        );
        bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_slots_rejected() {
        assert!(MultiSlotWindow::new(0).is_err());
    }

    #[test]
    fn test_single_slot_closes_every_push() {
        let mut window = MultiSlotWindow::new(1).unwrap();
        for i in 0..5 {
            let bucket = window.push(0, &[i as f64]).expect("single slot closes");
            assert_eq!(bucket.slots[0].stats.count, 1);
        }
    }

    #[test]
    fn test_cycle_closes_only_when_all_slots_filled() {
        let mut window = MultiSlotWindow::new(2).unwrap();
        assert!(window.push(0, &[1.0]).is_none());
        // same slot again: accumulates, still no close
        assert!(window.push(0, &[2.0]).is_none());
        let bucket = window.push(1, &[10.0]).expect("both slots filled");
        assert_eq!(bucket.slots[0].stats.count, 2);
        assert_eq!(bucket.slots[0].pushes, 2);
        assert_eq!(bucket.slots[1].stats.count, 1);
        assert!((bucket.slots[0].stats.mean - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_slots_reset_after_close() {
        let mut window = MultiSlotWindow::new(2).unwrap();
        window.push(0, &[1.0]);
        window.push(1, &[2.0]).expect("first cycle");
        // next cycle starts empty
        assert!(window.push(0, &[3.0]).is_none());
        let bucket = window.push(1, &[4.0]).expect("second cycle");
        assert_eq!(bucket.slots[0].stats.count, 1);
        assert!((bucket.slots[0].stats.mean - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_multi_value_push() {
        let mut window = MultiSlotWindow::new(1).unwrap();
        let bucket = window.push(0, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(bucket.slots[0].stats.count, 3);
        assert_eq!(bucket.slots[0].pushes, 1);
        assert_eq!(bucket.observations(), 3);
    }
}
