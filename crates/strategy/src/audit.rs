// Audit trail of scorer evaluations

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use riptide_core::types::Direction;

/// One scorer evaluation, recorded whether or not a signal fired, for later
/// analysis of threshold calibration.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    /// Probability mass accumulated across ranked predictions.
    pub accumulated: f64,
    pub rating: f64,
    /// Sample size of the best-covered prediction.
    pub best_samples: u64,
    pub direction: Direction,
    pub triggered: bool,
    pub sequences: Vec<String>,
}

/// In-memory log handed to the persistence layer by value; the core keeps no
/// knowledge of its storage format.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hand the accumulated records downstream, leaving the log empty.
    pub fn drain(&mut self) -> Vec<AuditRecord> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_record_and_drain() {
        let mut log = AuditLog::new();
        assert!(log.is_empty());
        log.record(AuditRecord {
            id: Uuid::new_v4(),
            symbol: "BTC-USDT".to_string(),
            timestamp: Utc::now().naive_utc(),
            accumulated: 0.4,
            rating: 0.0,
            best_samples: 12,
            direction: Direction::Flat,
            triggered: false,
            sequences: vec![],
        });
        assert_eq!(log.len(), 1);
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());
    }
}
