// Fixed-capacity circular history buffer

use riptide_core::error::{Result, RiptideError};

/// Circular buffer over a flat arena: backing vec + head index.
///
/// Pushing beyond capacity silently overwrites the oldest entry. The lifetime
/// push counter keeps growing regardless of eviction, so callers can tell how
/// much of the stream has flowed through a window of bounded depth.
#[derive(Debug, Clone)]
pub struct RingStore<T> {
    buf: Vec<T>,
    head: usize,
    capacity: usize,
    total: u64,
}

impl<T> RingStore<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RiptideError::EngineError(
                "ring capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            buf: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            total: 0,
        })
    }

    pub fn push(&mut self, value: T) {
        if self.buf.len() < self.capacity {
            self.buf.push(value);
        } else {
            self.buf[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
        self.total += 1;
    }

    /// Cumulative number of pushes ever made, not bounded by capacity.
    pub fn size(&self) -> u64 {
        self.total
    }

    /// Number of currently retained elements, always <= capacity.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed element.
    pub fn back(&self) -> Option<&T> {
        if self.buf.is_empty() {
            None
        } else {
            let idx = (self.head + self.buf.len() - 1) % self.capacity;
            Some(&self.buf[idx])
        }
    }

    /// Apply `f` to each retained element, oldest to newest.
    pub fn snapshot<U, F>(&self, f: F) -> Vec<U>
    where
        F: Fn(&T) -> U,
    {
        let mut out = Vec::with_capacity(self.buf.len());
        for i in 0..self.buf.len() {
            out.push(f(&self.buf[(self.head + i) % self.capacity]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(RingStore::<i32>::new(0).is_err());
    }

    #[test]
    fn test_push_below_capacity() {
        let mut ring = RingStore::new(5).unwrap();
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.size(), 2);
        assert_eq!(ring.snapshot(|v| *v), vec![1, 2]);
    }

    #[test]
    fn test_eviction_order() {
        let mut ring = RingStore::new(3).unwrap();
        for i in 0..5 {
            ring.push(i);
        }
        // 0 and 1 evicted, retention order preserved
        assert_eq!(ring.snapshot(|v| *v), vec![2, 3, 4]);
        assert_eq!(ring.back(), Some(&4));
    }

    #[test]
    fn test_lifetime_count_survives_eviction() {
        // capacity 10, 102 pushes: size keeps counting, retention is capped
        let mut ring = RingStore::new(10).unwrap();
        for i in 0..102 {
            ring.push(i);
            assert!(ring.len() <= 10);
        }
        assert_eq!(ring.size(), 102);
        assert_eq!(ring.len(), 10);
        assert_eq!(
            ring.snapshot(|v| *v),
            (92..102).collect::<Vec<_>>()
        );
    }
}
