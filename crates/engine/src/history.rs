// Bounded history of closed time buckets

use chrono::NaiveDateTime;

use riptide_core::error::Result;

use crate::ring::RingStore;
use crate::timebucket::{TimeBucket, TimeBucketer};

/// The most recent `depth` closed time-buckets for trend queries, fed by an
/// internal `TimeBucketer`. Memory stays bounded no matter how long the feed
/// runs.
#[derive(Debug)]
pub struct HistoryWindow {
    bucketer: TimeBucketer,
    ring: RingStore<TimeBucket>,
}

impl HistoryWindow {
    pub fn new(interval_secs: i64, depth: usize) -> Result<Self> {
        Ok(Self {
            bucketer: TimeBucketer::new(interval_secs)?,
            ring: RingStore::new(depth)?,
        })
    }

    /// Forward an event; when it closes an interval, retain and return the
    /// closed bucket.
    pub fn push(&mut self, timestamp: NaiveDateTime, values: &[f64]) -> Option<TimeBucket> {
        let closed = self.bucketer.push(timestamp, values)?;
        self.ring.push(closed.clone());
        Some(closed)
    }

    /// Apply `f` to each retained bucket, oldest to newest.
    pub fn get<U, F>(&self, f: F) -> Vec<U>
    where
        F: Fn(&TimeBucket) -> U,
    {
        self.ring.snapshot(f)
    }

    /// Lifetime count of closed buckets.
    pub fn size(&self) -> u64 {
        self.ring.size()
    }

    pub fn interval_secs(&self) -> i64 {
        self.bucketer.interval_secs()
    }

    /// Projected start of the n-th future bucket.
    pub fn next(&self, n: i64) -> NaiveDateTime {
        self.bucketer.next(n)
    }
}
