pub mod error;
pub mod types;

pub use error::{Result, RiptideError};
pub use types::{Decision, Direction, Prediction, Side, TradeEvent};
