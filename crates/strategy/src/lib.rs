pub mod audit;
pub mod pipeline;
pub mod scorer;

pub use audit::{AuditLog, AuditRecord};
pub use pipeline::{PairPipeline, PipelineConfig};
pub use scorer::{ScorerConfig, ScorerKind, StrategyScorer};
