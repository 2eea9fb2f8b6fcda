// Price-move discretization into the prediction alphabet

use riptide_core::error::{Result, RiptideError};

/// Maps consecutive prices to signed-integer symbols: the percentage move
/// versus the previous price, divided by `step_pct`, rounded, and clamped to
/// `[-clamp, clamp]`. The resulting strings ("-2", "0", "3", ...) are the
/// alphabet fed to `SequenceCounter` and parsed back by the scorer.
#[derive(Debug)]
pub struct Symbolizer {
    step_pct: f64,
    clamp: i64,
    prev: Option<f64>,
}

impl Symbolizer {
    pub fn new(step_pct: f64, clamp: i64) -> Result<Self> {
        if step_pct <= 0.0 {
            return Err(RiptideError::EngineError(
                "symbol step must be positive".to_string(),
            ));
        }
        if clamp < 1 {
            return Err(RiptideError::EngineError(
                "symbol clamp must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            step_pct,
            clamp,
            prev: None,
        })
    }

    /// Returns the symbol for the move from the previous price, or `None`
    /// for the very first price (warm-up).
    pub fn update(&mut self, price: f64) -> Option<String> {
        let prev = self.prev.replace(price)?;
        if prev == 0.0 {
            return None;
        }
        let pct = (price - prev) / prev * 100.0;
        let steps = (pct / self.step_pct).round() as i64;
        Some(steps.clamp(-self.clamp, self.clamp).to_string())
    }
}
