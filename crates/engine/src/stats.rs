// Online statistics over an unbounded scalar stream

use serde::{Deserialize, Serialize};

/// Incremental accumulator using Welford's algorithm: O(1) per push, no raw
/// sample retention. Undefined statistics (empty stream, zero denominators)
/// come back as 0.0 rather than an error so the event loop never stalls;
/// callers gate on `count()` instead.
#[derive(Debug, Clone)]
pub struct OnlineStats {
    count: u64,
    mean: f64,
    m2: f64,
    sum: f64,
    min: f64,
    max: f64,
    pos_sum: f64,
    neg_sum: f64,
}

impl Default for OnlineStats {
    fn default() -> Self {
        Self::new()
    }
}

impl OnlineStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            pos_sum: 0.0,
            neg_sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.sum += value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        if value > 0.0 {
            self.pos_sum += value;
        } else if value < 0.0 {
            self.neg_sum += -value;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    /// Range-based volatility proxy: `(max - min) / |mean|`.
    /// 0.0 for an empty stream, a single sample, or a zero mean.
    pub fn dispersion(&self) -> f64 {
        if self.count == 0 || self.mean == 0.0 {
            return 0.0;
        }
        (self.max - self.min) / self.mean.abs()
    }

    /// Normalized imbalance of positive vs. negative pushed values, in
    /// [-1, 1]. Used downstream to compare parallel flows (e.g. bid vs. ask
    /// notional pushed as signed values). 0.0 when nothing signed was seen.
    pub fn ratio(&self) -> f64 {
        let denom = self.pos_sum + self.neg_sum;
        if denom == 0.0 {
            0.0
        } else {
            (self.pos_sum - self.neg_sum) / denom
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            count: self.count(),
            sum: self.sum(),
            mean: self.mean(),
            variance: self.variance(),
            std_dev: self.std_dev(),
            min: self.min(),
            max: self.max(),
            dispersion: self.dispersion(),
            ratio: self.ratio(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Immutable copy of all derived metrics at one point in the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub dispersion: f64,
    pub ratio: f64,
}
