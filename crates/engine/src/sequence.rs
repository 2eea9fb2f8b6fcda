// N-gram sequence counting and next-symbol prediction

use std::collections::HashMap;

use riptide_core::error::{Result, RiptideError};
use riptide_core::types::Prediction;

const CONTEXT_SEPARATOR: &str = ":";

/// Counts next-symbol frequencies behind trailing contexts of several
/// configured lengths, and predicts the most likely continuation of the
/// context formed by each incoming symbol.
///
/// For a context length L, the observation recorded on each add pairs the L
/// buffered symbols *excluding the most recent one* with the incoming symbol;
/// the first L + 1 adds are warm-up and record nothing. The prediction
/// returned on the same add is for the newest L symbols *including* the
/// incoming one. Contexts without observations are omitted from the result.
///
/// The context table only grows; with an unbounded symbol vocabulary its
/// memory is unbounded too. Own one instance per traded pair and drop it with
/// the pair.
#[derive(Debug)]
pub struct SequenceCounter {
    lengths: Vec<usize>,
    max_len: usize,
    /// Trailing symbols, oldest first, at most `max_len + 1` entries.
    buffer: Vec<String>,
    /// context key -> next symbol -> occurrences
    table: HashMap<String, HashMap<String, u64>>,
}

impl SequenceCounter {
    pub fn new(context_lengths: &[usize]) -> Result<Self> {
        let mut lengths: Vec<usize> = context_lengths.to_vec();
        lengths.sort_unstable();
        lengths.dedup();
        if lengths.is_empty() {
            return Err(RiptideError::EngineError(
                "at least one context length is required".to_string(),
            ));
        }
        if lengths[0] == 0 {
            return Err(RiptideError::EngineError(
                "context lengths must be at least 1".to_string(),
            ));
        }
        let max_len = *lengths.last().unwrap_or(&1);
        Ok(Self {
            lengths,
            max_len,
            buffer: Vec::with_capacity(max_len + 2),
            table: HashMap::new(),
        })
    }

    /// Record `symbol` as the continuation of every warmed-up context, then
    /// predict the continuation of each context the buffer forms once
    /// `symbol` is appended. Keys are joined context strings.
    pub fn add(&mut self, symbol: &str) -> HashMap<String, Prediction> {
        let n = self.buffer.len();

        // 1. Observe: trailing context of length L, one step back.
        for &len in &self.lengths {
            if n >= len + 1 {
                let key = join(&self.buffer[n - len - 1..n - 1]);
                *self
                    .table
                    .entry(key)
                    .or_default()
                    .entry(symbol.to_string())
                    .or_insert(0) += 1;
            }
        }

        // 2. Predict for the context shifted forward by this symbol.
        let mut predictions = HashMap::new();
        for &len in &self.lengths {
            if n + 1 < len {
                continue;
            }
            let mut parts: Vec<&str> =
                self.buffer[n + 1 - len..n].iter().map(String::as_str).collect();
            parts.push(symbol);
            let key = parts.join(CONTEXT_SEPARATOR);
            if let Some(prediction) = self.predict(len, &key) {
                predictions.insert(key, prediction);
            }
        }

        // 3. Append, keeping one slot of slack past the longest context.
        self.buffer.push(symbol.to_string());
        if self.buffer.len() > self.max_len + 1 {
            self.buffer.remove(0);
        }

        predictions
    }

    fn predict(&self, context_length: usize, key: &str) -> Option<Prediction> {
        let nexts = self.table.get(key)?;
        let samples: u64 = nexts.values().sum();
        // highest count wins; ties break toward the smaller symbol so the
        // result is independent of hash order
        let (best_symbol, best_count) = nexts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))?;
        Some(Prediction {
            context_length,
            symbol: best_symbol.clone(),
            probability: *best_count as f64 / samples as f64,
            options: nexts.len(),
            samples,
        })
    }

    /// Number of distinct contexts observed so far (monotone; see the
    /// scaling note on the type).
    pub fn context_count(&self) -> usize {
        self.table.len()
    }

    pub fn max_context_length(&self) -> usize {
        self.max_len
    }
}

fn join(symbols: &[String]) -> String {
    symbols.join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `symbols`, merging each add's prediction map the way the
    /// dispatch loop does: later predictions for a context replace earlier
    /// ones.
    fn feed(counter: &mut SequenceCounter, symbols: &[String]) -> HashMap<String, Prediction> {
        let mut accumulated = HashMap::new();
        for s in symbols {
            accumulated.extend(counter.add(s));
        }
        accumulated
    }

    #[test]
    fn test_empty_configuration_rejected() {
        assert!(SequenceCounter::new(&[]).is_err());
        assert!(SequenceCounter::new(&[0]).is_err());
    }

    #[test]
    fn test_duplicate_lengths_ignored() {
        let counter = SequenceCounter::new(&[2, 1, 2, 1]).unwrap();
        assert_eq!(counter.max_context_length(), 2);
    }

    #[test]
    fn test_warmup_records_no_observations() {
        let mut counter = SequenceCounter::new(&[3]).unwrap();
        for s in ["1", "2", "1", "2"] {
            counter.add(s);
        }
        // first max_len + 1 adds are all warm-up
        assert_eq!(counter.context_count(), 0);
        counter.add("1");
        assert_eq!(counter.context_count(), 1);
    }

    #[test]
    fn test_constant_symbol_length_one() {
        let mut counter = SequenceCounter::new(&[1]).unwrap();
        let symbols = vec!["1".to_string(); 100];
        let predictions = feed(&mut counter, &symbols);
        let p = &predictions["1"];
        assert_eq!(p.symbol, "1");
        assert_eq!(p.probability, 1.0);
        assert_eq!(p.options, 1);
        assert_eq!(p.samples, 98);
    }

    #[test]
    fn test_constant_symbol_length_two() {
        let mut counter = SequenceCounter::new(&[2]).unwrap();
        let symbols = vec!["1".to_string(); 100];
        let predictions = feed(&mut counter, &symbols);
        let p = &predictions["1:1"];
        assert_eq!(p.probability, 1.0);
        assert_eq!(p.options, 1);
        assert_eq!(p.samples, 97);
    }

    #[test]
    fn test_alternating_symbols_length_two() {
        let mut counter = SequenceCounter::new(&[2]).unwrap();
        let symbols: Vec<String> = (0..100)
            .map(|i| if i % 2 == 0 { "1" } else { "2" }.to_string())
            .collect();
        let predictions = feed(&mut counter, &symbols);
        assert_eq!(predictions.len(), 2);
        let up = &predictions["1:2"];
        assert_eq!(up.samples, 49);
        assert_eq!(up.probability, 1.0);
        assert_eq!(up.options, 1);
        let down = &predictions["2:1"];
        assert_eq!(down.samples, 48);
        assert_eq!(down.probability, 1.0);
        assert_eq!(down.options, 1);
    }

    #[test]
    fn test_multi_branch_contexts_length_three() {
        let mut counter = SequenceCounter::new(&[3]).unwrap();
        let symbols: Vec<String> = (0..100)
            .map(|i| if i % 2 == 0 || i % 3 == 0 { "1" } else { "2" }.to_string())
            .collect();
        let predictions = feed(&mut counter, &symbols);
        assert_eq!(predictions.len(), 5);
        assert_eq!(predictions["1:2:1"].samples, 32);
        assert_eq!(predictions["1:1:1"].samples, 15);
        assert_eq!(predictions["1:1:2"].samples, 15);
        assert_eq!(predictions["2:1:1"].samples, 16);
        assert_eq!(predictions["2:1:2"].samples, 15);
    }

    #[test]
    fn test_multiple_lengths_predict_independently() {
        let mut counter = SequenceCounter::new(&[1, 2]).unwrap();
        let symbols: Vec<String> = (0..40)
            .map(|i| if i % 2 == 0 { "1" } else { "-1" }.to_string())
            .collect();
        let predictions = feed(&mut counter, &symbols);
        // one-symbol contexts and two-symbol contexts coexist under
        // distinct keys
        assert!(predictions.contains_key("1"));
        assert!(predictions.contains_key("-1"));
        assert!(predictions.contains_key("1:-1"));
        assert!(predictions.contains_key("-1:1"));
        assert_eq!(predictions["1:-1"].context_length, 2);
        assert_eq!(predictions["-1"].context_length, 1);
        // the alternation is fully deterministic at both lengths
        for p in predictions.values() {
            assert_eq!(p.probability, 1.0);
        }
    }

    #[test]
    fn test_mixed_continuations_split_probability() {
        let mut counter = SequenceCounter::new(&[1]).unwrap();
        // after context "a": continuations b, b, c
        for s in ["a", "x", "b", "a", "x", "b", "a", "x", "c"] {
            counter.add(s);
        }
        // query by re-entering the context
        let predictions = counter.add("a");
        // the observation context behind each recorded pair sits one step
        // back, so "a" was followed (at distance two) by b, b, c
        let p = &predictions["a"];
        assert_eq!(p.options, 2);
        assert_eq!(p.samples, 3);
        assert_eq!(p.symbol, "b");
        assert!((p.probability - 2.0 / 3.0).abs() < 1e-10);
    }
}
