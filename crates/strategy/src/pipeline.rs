// Per-pair wiring of the engine stages

use serde::{Deserialize, Serialize};
use tracing::debug;

use riptide_core::error::Result;
use riptide_core::types::{Decision, Side, TradeEvent};
use riptide_engine::{
    Bucket, HistoryWindow, MultiSlotWindow, SequenceCounter, Symbolizer, TimeBucket,
};

use crate::audit::AuditRecord;
use crate::scorer::{ScorerConfig, ScorerKind, StrategyScorer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub interval_secs: i64,
    pub history_depth: usize,
    pub context_lengths: Vec<usize>,
    pub symbol_step_pct: f64,
    pub symbol_clamp: i64,
}

/// One traded pair's full signal path. Single-writer: exactly one dispatch
/// loop mutates an instance; run pairs in parallel by fanning out instances,
/// never by sharing one.
///
/// Every call is synchronous, bounded-time, in-memory work, safe on the hot
/// per-event path. Buckets, decisions and audit records are handed out by
/// value.
#[derive(Debug)]
pub struct PairPipeline {
    pair: String,
    symbolizer: Symbolizer,
    counter: SequenceCounter,
    history: HistoryWindow,
    /// Bid-side (slot 0) vs. ask-side (slot 1) notional flow.
    flow: MultiSlotWindow,
    last_flow: Option<Bucket>,
    scorer: StrategyScorer,
}

impl PairPipeline {
    pub fn new(
        pair: &str,
        config: &PipelineConfig,
        kind: ScorerKind,
        scorer_config: ScorerConfig,
    ) -> Result<Self> {
        Ok(Self {
            pair: pair.to_string(),
            symbolizer: Symbolizer::new(config.symbol_step_pct, config.symbol_clamp)?,
            counter: SequenceCounter::new(&config.context_lengths)?,
            history: HistoryWindow::new(config.interval_secs, config.history_depth)?,
            flow: MultiSlotWindow::new(2)?,
            last_flow: None,
            scorer: StrategyScorer::new(kind, scorer_config),
        })
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    /// Feed one trade through the numeric and symbolic branches; returns a
    /// decision when the scorer fires.
    pub fn on_trade(&mut self, event: &TradeEvent) -> Option<Decision> {
        self.history
            .push(event.datetime, &[event.price, event.volume]);

        let slot = match event.side {
            Side::Buy => 0,
            Side::Sell => 1,
        };
        if let Some(bucket) = self.flow.push(slot, &[event.price * event.volume]) {
            self.last_flow = Some(bucket);
        }

        let symbol = self.symbolizer.update(event.price)?;
        let predictions = self.counter.add(&symbol);
        debug!(
            pair = %self.pair,
            symbol = %symbol,
            predictions = predictions.len(),
            "trade discretized"
        );
        self.scorer.evaluate(&self.pair, event.datetime, &predictions)
    }

    /// Trend query over the retained time-buckets, oldest to newest.
    pub fn trend<U, F>(&self, f: F) -> Vec<U>
    where
        F: Fn(&TimeBucket) -> U,
    {
        self.history.get(f)
    }

    /// Most recent completed bid/ask flow cycle, if any.
    pub fn flow(&self) -> Option<&Bucket> {
        self.last_flow.as_ref()
    }

    pub fn audit(&self) -> &[AuditRecord] {
        self.scorer.audit().records()
    }

    pub fn drain_audit(&mut self) -> Vec<AuditRecord> {
        self.scorer.audit_mut().drain()
    }

    /// Distinct contexts the counter has accumulated (grows without bound
    /// with the symbol vocabulary).
    pub fn context_count(&self) -> usize {
        self.counter.context_count()
    }
}
