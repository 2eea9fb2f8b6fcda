use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub pairs: Vec<String>,
    pub engine: EngineConfig,
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Time-bucket interval in seconds.
    pub interval_secs: i64,
    /// Closed buckets retained for trend queries.
    pub history_depth: usize,
    /// Context lengths for the sequence counter.
    pub context_lengths: Vec<usize>,
    /// Percent move per discretization step.
    pub symbol_step_pct: f64,
    /// Symbols clamp to [-clamp, clamp].
    pub symbol_clamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// "momentum" or "reversal".
    pub kind: String,
    pub min_sample_size: u64,
    pub probability_threshold: f64,
    pub decay_factor: f64,
    pub rating_threshold: f64,
    pub confidence_factor: f64,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_default() -> Result<Self, ConfigError> {
        Self::from_file("config/default.toml")
    }

    /// Fail fast on configuration errors instead of letting them surface in
    /// steady-state operation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pairs.is_empty() {
            return Err(ConfigError::InvalidValue("pairs must not be empty".into()));
        }
        if self.engine.interval_secs < 1 {
            return Err(ConfigError::InvalidValue(
                "engine.interval_secs must be at least 1".into(),
            ));
        }
        if self.engine.history_depth == 0 {
            return Err(ConfigError::InvalidValue(
                "engine.history_depth must be at least 1".into(),
            ));
        }
        if self.engine.context_lengths.is_empty()
            || self.engine.context_lengths.contains(&0)
        {
            return Err(ConfigError::InvalidValue(
                "engine.context_lengths must be non-empty positive lengths".into(),
            ));
        }
        if self.engine.symbol_step_pct <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "engine.symbol_step_pct must be positive".into(),
            ));
        }
        if self.engine.symbol_clamp < 1 {
            return Err(ConfigError::InvalidValue(
                "engine.symbol_clamp must be at least 1".into(),
            ));
        }
        if !matches!(self.strategy.kind.as_str(), "momentum" | "reversal") {
            return Err(ConfigError::InvalidValue(format!(
                "unknown strategy kind: {}",
                self.strategy.kind
            )));
        }
        if !(0.0..=1.0).contains(&self.strategy.decay_factor) {
            return Err(ConfigError::InvalidValue(
                "strategy.decay_factor must be in [0, 1]".into(),
            ));
        }
        if self.strategy.probability_threshold <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "strategy.probability_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
