use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiptideError {
    #[error("Engine error: {0}")]
    EngineError(String),
    #[error("Strategy error: {0}")]
    StrategyError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, RiptideError>;
