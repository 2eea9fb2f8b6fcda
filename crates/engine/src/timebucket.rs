// Wall-clock bucketing of the event stream

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use riptide_core::error::{Result, RiptideError};

use crate::window::{Bucket, MultiSlotWindow};

/// A closed window cycle together with the wall-clock start of its interval.
/// Start times are always exact multiples of the interval from the epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBucket {
    pub start: NaiveDateTime,
    pub bucket: Bucket,
}

/// Buckets events by `floor(unix_seconds / interval)`. The first event that
/// lands in a new index closes out and timestamps the previous index's
/// accumulated bucket; events inside one index only accumulate.
#[derive(Debug)]
pub struct TimeBucketer {
    interval_secs: i64,
    window: MultiSlotWindow,
    current_index: Option<i64>,
    last_closed_index: Option<i64>,
}

impl TimeBucketer {
    pub fn new(interval_secs: i64) -> Result<Self> {
        if interval_secs < 1 {
            return Err(RiptideError::EngineError(
                "bucket interval must be at least one second".to_string(),
            ));
        }
        Ok(Self {
            interval_secs,
            window: MultiSlotWindow::new(1)?,
            current_index: None,
            last_closed_index: None,
        })
    }

    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, values: &[f64]) -> Option<TimeBucket> {
        let index = timestamp
            .and_utc()
            .timestamp()
            .div_euclid(self.interval_secs);

        let closed = match self.current_index {
            Some(prev) if index != prev => {
                let bucket = self.window.close_cycle();
                self.last_closed_index = Some(prev);
                self.current_index = Some(index);
                debug!(index = prev, "time bucket closed");
                Some(TimeBucket {
                    start: index_start(prev, self.interval_secs),
                    bucket,
                })
            }
            Some(_) => None,
            None => {
                self.current_index = Some(index);
                None
            }
        };
        self.window.accumulate(0, values);
        closed
    }

    /// Projected start time of the n-th future bucket, counted from the last
    /// closed index (or the index currently accumulating before any close).
    pub fn next(&self, n: i64) -> NaiveDateTime {
        let base = self
            .last_closed_index
            .or(self.current_index)
            .unwrap_or(0);
        index_start(base + n, self.interval_secs)
    }
}

fn index_start(index: i64, interval_secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(index * interval_secs, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> NaiveDateTime {
        DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
    }

    #[test]
    fn test_invalid_interval_rejected() {
        assert!(TimeBucketer::new(0).is_err());
    }

    #[test]
    fn test_same_index_never_emits() {
        let mut tb = TimeBucketer::new(60).unwrap();
        assert!(tb.push(ts(0), &[1.0]).is_none());
        assert!(tb.push(ts(30), &[2.0]).is_none());
        assert!(tb.push(ts(59), &[3.0]).is_none());
    }

    #[test]
    fn test_transition_closes_previous_bucket() {
        let mut tb = TimeBucketer::new(60).unwrap();
        tb.push(ts(10), &[1.0]);
        tb.push(ts(20), &[3.0]);
        let closed = tb.push(ts(61), &[99.0]).expect("index transition");
        assert_eq!(closed.start, ts(0));
        assert_eq!(closed.bucket.slots[0].stats.count, 2);
        assert!((closed.bucket.slots[0].stats.mean - 2.0).abs() < 1e-10);
        // the event that triggered the close belongs to the new bucket
        let next = tb.push(ts(121), &[0.0]).expect("second transition");
        assert_eq!(next.start, ts(60));
        assert_eq!(next.bucket.slots[0].stats.count, 1);
        assert!((next.bucket.slots[0].stats.mean - 99.0).abs() < 1e-10);
    }

    #[test]
    fn test_start_times_never_drift() {
        let mut tb = TimeBucketer::new(60).unwrap();
        // unaligned first event: the bucket start still snaps to the grid
        tb.push(ts(37), &[1.0]);
        let closed = tb.push(ts(60), &[1.0]).unwrap();
        assert_eq!(closed.start, ts(0));
        assert_eq!(closed.start.and_utc().timestamp() % 60, 0);
    }

    #[test]
    fn test_gap_spanning_multiple_intervals() {
        let mut tb = TimeBucketer::new(60).unwrap();
        tb.push(ts(10), &[5.0]);
        // quiet feed: next event three intervals later still closes exactly one bucket
        let closed = tb.push(ts(190), &[6.0]).expect("transition after gap");
        assert_eq!(closed.start, ts(0));
        assert_eq!(closed.bucket.slots[0].stats.count, 1);
    }

    #[test]
    fn test_next_projects_from_last_closed() {
        let mut tb = TimeBucketer::new(60).unwrap();
        tb.push(ts(10), &[1.0]);
        assert_eq!(tb.next(1), ts(60));
        tb.push(ts(70), &[1.0]);
        assert_eq!(tb.next(1), ts(60));
        assert_eq!(tb.next(2), ts(120));
    }
}
