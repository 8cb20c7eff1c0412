use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Content hash over lengths and bit patterns, so NaN payloads hash consistently.
pub fn fingerprint(series: &[&[f64]]) -> u64 {
    let mut hasher = DefaultHasher::new();
    series.len().hash(&mut hasher);
    for values in series {
        values.len().hash(&mut hasher);
        for v in values.iter() {
            v.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub fingerprint: u64,
    pub budget: usize,
}

/// Bounded map from (content, budget) to a shared result, kept by callers that recompute
/// on every state change.
#[derive(Debug)]
pub struct DecimationCache<V> {
    entries: HashMap<CacheKey, Arc<V>>,
    capacity: usize,
}

impl<V> DecimationCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get_or_insert_with(&mut self, key: CacheKey, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(hit) = self.entries.get(&key) {
            debug!("decimation cache hit for budget {}", key.budget);
            return Arc::clone(hit);
        }
        if self.entries.len() >= self.capacity {
            // whole-map eviction
            self.entries.clear();
        }
        let value = Arc::new(compute());
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for DecimationCache<V> {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_tracks_content() {
        let a = [1.0, f64::NAN, 3.0];
        let b = [1.0, f64::NAN, 3.0];
        let c = [1.0, 2.0, 3.0];
        assert_eq!(fingerprint(&[&a]), fingerprint(&[&b]));
        assert_ne!(fingerprint(&[&a]), fingerprint(&[&c]));
        assert_ne!(fingerprint(&[&a, &[]]), fingerprint(&[&[], &a]));
    }

    #[test]
    fn computes_once_per_key() {
        let mut cache = DecimationCache::new(4);
        let key = CacheKey {
            fingerprint: 42,
            budget: 500,
        };
        let mut calls = 0;
        let first = cache.get_or_insert_with(key, || {
            calls += 1;
            vec![1, 2, 3]
        });
        let second = cache.get_or_insert_with(key, || {
            calls += 1;
            vec![9]
        });
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
        let other = cache.get_or_insert_with(CacheKey { budget: 10, ..key }, || vec![7]);
        assert_eq!(*other, vec![7]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_when_full() {
        let mut cache = DecimationCache::new(2);
        for budget in 0..3 {
            cache.get_or_insert_with(CacheKey { fingerprint: 1, budget }, || budget);
        }
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }
}
