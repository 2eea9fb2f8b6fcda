// Prediction scoring into trade decisions

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use riptide_core::types::{Decision, Direction, Prediction};

use crate::audit::{AuditLog, AuditRecord};

/// Closed set of scoring behaviors. `Momentum` trades in the predicted
/// direction; `Reversal` fades it. Both share the ranking/accumulation
/// algorithm below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Momentum,
    Reversal,
}

impl std::str::FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "momentum" => Ok(ScorerKind::Momentum),
            "reversal" => Ok(ScorerKind::Reversal),
            other => Err(format!("unknown scorer kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// The best-covered prediction must exceed this sample size.
    pub min_sample_size: u64,
    /// Accumulated blended score must exceed this before a rating is formed.
    pub probability_threshold: f64,
    /// Weight of the smoothed probability in the blended score, in [0, 1].
    pub decay_factor: f64,
    /// Minimum |rating| for a signal.
    pub rating_threshold: f64,
    /// Scales surplus probability mass into the confidence value.
    pub confidence_factor: f64,
}

/// Turns the prediction set of one incoming event into a trade decision.
/// Stateless between calls apart from the audit log.
#[derive(Debug)]
pub struct StrategyScorer {
    kind: ScorerKind,
    config: ScorerConfig,
    audit: AuditLog,
}

impl StrategyScorer {
    pub fn new(kind: ScorerKind, config: ScorerConfig) -> Self {
        Self {
            kind,
            config,
            audit: AuditLog::new(),
        }
    }

    pub fn kind(&self) -> ScorerKind {
        self.kind
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut AuditLog {
        &mut self.audit
    }

    /// Evaluate one event's predictions. Every call is audited; `None` is
    /// the normal "no signal" outcome, never an error.
    pub fn evaluate(
        &mut self,
        symbol: &str,
        timestamp: NaiveDateTime,
        predictions: &HashMap<String, Prediction>,
    ) -> Option<Decision> {
        let best_samples = predictions.values().map(|p| p.samples).max().unwrap_or(0);

        // Rank by blended score, accumulate until the threshold is crossed.
        let mut ranked: Vec<(&String, &Prediction, f64)> = predictions
            .iter()
            .map(|(key, p)| (key, p, self.blended_score(p)))
            .collect();
        ranked.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let mut accumulated = 0.0;
        let mut crossed = false;
        let mut sequences: Vec<String> = Vec::new();
        let mut picked_symbols: Vec<&str> = Vec::new();
        for (key, prediction, score) in &ranked {
            accumulated += score;
            sequences.push((*key).clone());
            picked_symbols.push(prediction.symbol.as_str());
            if accumulated > self.config.probability_threshold {
                crossed = true;
                break;
            }
        }

        // Recency-weighted rating: later symbols in the accumulated run
        // weigh proportionally more.
        let mut weighted = 0.0;
        let mut weights = 0.0;
        for (pos, sym) in picked_symbols.iter().enumerate() {
            let weight = (pos + 1) as f64;
            weighted += weight * sym.parse::<f64>().unwrap_or(0.0);
            weights += weight;
        }
        let rating = if weights > 0.0 { weighted / weights } else { 0.0 };

        let covered = best_samples > self.config.min_sample_size;
        let rated = rating.abs() >= self.config.rating_threshold;
        let raw_direction = Direction::from_rating(rating);
        let direction = match self.kind {
            ScorerKind::Momentum => raw_direction,
            ScorerKind::Reversal => raw_direction.invert(),
        };
        let triggered = covered && crossed && rated && direction != Direction::Flat;

        self.audit.record(AuditRecord {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            timestamp,
            accumulated,
            rating,
            best_samples,
            direction: if triggered { direction } else { Direction::Flat },
            triggered,
            sequences: sequences.clone(),
        });
        debug!(
            symbol,
            accumulated,
            rating,
            best_samples,
            triggered,
            "scorer evaluation"
        );

        if !triggered {
            return None;
        }
        Some(Decision {
            symbol: symbol.to_string(),
            datetime: timestamp,
            direction,
            rating,
            confidence: 1.0
                + self.config.confidence_factor
                    * (accumulated - self.config.probability_threshold),
            sequences,
        })
    }

    /// `decay * smoothed + (1 - decay) * raw`, with the smoothed term
    /// Laplace-adjusted so thin contexts score below well-covered ones of
    /// equal raw probability.
    fn blended_score(&self, p: &Prediction) -> f64 {
        let smoothed =
            (p.probability * p.samples as f64 + 1.0) / (p.samples as f64 + p.options as f64);
        self.config.decay_factor * smoothed + (1.0 - self.config.decay_factor) * p.probability
    }
}
