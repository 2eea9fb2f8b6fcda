use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Aggressor side of a trade, as reported by the exchange feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl Side {
    /// Parse a feed-style side token ("buy"/"b"/"sell"/"s", any case).
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "buy" | "b" => Some(Side::Buy),
            "sell" | "s" => Some(Side::Sell),
            _ => None,
        }
    }
}

/// Direction of a trade decision. `Flat` means no signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    Flat,
}

impl Direction {
    /// Direction from the sign of a rating.
    pub fn from_rating(rating: f64) -> Self {
        if rating > 0.0 {
            Direction::Buy
        } else if rating < 0.0 {
            Direction::Sell
        } else {
            Direction::Flat
        }
    }

    pub fn invert(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
            Direction::Flat => Direction::Flat,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
            Direction::Flat => write!(f, "flat"),
        }
    }
}

/// One trade from the exchange feed, already ordered by time for a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub symbol: String,
    pub datetime: NaiveDateTime,
    pub price: f64,
    pub volume: f64,
    pub side: Side,
}

/// Most likely next symbol for one trailing context, with its supporting
/// sample statistics. Recomputed from the frequency table on every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub context_length: usize,
    pub symbol: String,
    pub probability: f64,
    /// Distinct next-symbols ever observed after this context.
    pub options: usize,
    /// Total observations recorded for this context.
    pub samples: u64,
}

/// Output of one scorer evaluation that crossed both thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub symbol: String,
    pub datetime: NaiveDateTime,
    pub direction: Direction,
    /// Signed, recency-weighted magnitude of the predicted move.
    pub rating: f64,
    /// `1 + confidence_factor * (accumulated - probability_threshold)`.
    pub confidence: f64,
    /// Context keys that contributed probability mass.
    pub sequences: Vec<String>,
}

impl Decision {
    pub fn is_buy(&self) -> bool {
        self.direction == Direction::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.direction == Direction::Sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("buy"), Some(Side::Buy));
        assert_eq!(Side::parse("S"), Some(Side::Sell));
        assert_eq!(Side::parse("hold"), None);
    }

    #[test]
    fn test_direction_from_rating() {
        assert_eq!(Direction::from_rating(0.7), Direction::Buy);
        assert_eq!(Direction::from_rating(-0.1), Direction::Sell);
        assert_eq!(Direction::from_rating(0.0), Direction::Flat);
        assert_eq!(Direction::from_rating(0.7).invert(), Direction::Sell);
    }
}
