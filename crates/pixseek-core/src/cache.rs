//! Query fingerprinting and the LRU result cache

use crate::types::SearchResponse;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Deterministic digest identifying one search request.
///
/// Derived from the query vector's bytes plus the target space name plus `k`,
/// so the same raw vector searched against two spaces (or with two different
/// `k`) never collides on a cache key. Exact-match only: two vectors that
/// differ in the last bit fingerprint differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    /// Compute the fingerprint for a search request
    pub fn compute(query: &[f32], space: &str, k: usize) -> Self {
        let mut hasher = blake3::Hasher::new();
        for value in query {
            hasher.update(&value.to_le_bytes());
        }
        hasher.update(space.as_bytes());
        hasher.update(&(k as u64).to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }
}

/// Fixed-capacity, recency-ordered cache of search responses.
///
/// `get` and `put` both mark the entry most-recently-used; inserting past
/// capacity evicts the least-recently-used entry. Mutation is guarded by one
/// lock per cache, so the engine can serve concurrent readers through
/// `&self`. Capacity 0 disables caching.
pub struct ResultCache {
    inner: Option<Mutex<LruCache<QueryFingerprint, SearchResponse>>>,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|c| Mutex::new(LruCache::new(c))),
        }
    }

    /// Look up a cached response, promoting it to most-recently-used
    pub fn get(&self, fingerprint: &QueryFingerprint) -> Option<SearchResponse> {
        self.inner.as_ref()?.lock().get(fingerprint).cloned()
    }

    /// Insert or overwrite a response, evicting the LRU entry past capacity
    pub fn put(&self, fingerprint: QueryFingerprint, response: SearchResponse) {
        if let Some(inner) = &self.inner {
            inner.lock().put(fingerprint, response);
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.lock().len())
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(space: &str) -> SearchResponse {
        SearchResponse::empty(space)
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = QueryFingerprint::compute(&[0.1, 0.2, 0.3], "color", 5);
        let b = QueryFingerprint::compute(&[0.1, 0.2, 0.3], "color", 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_sensitive_to_vector_space_and_k() {
        let base = QueryFingerprint::compute(&[0.1, 0.2], "color", 5);
        assert_ne!(base, QueryFingerprint::compute(&[0.1, 0.25], "color", 5));
        assert_ne!(base, QueryFingerprint::compute(&[0.1, 0.2], "fusion", 5));
        assert_ne!(base, QueryFingerprint::compute(&[0.1, 0.2], "color", 6));
    }

    #[test]
    fn test_eviction_order() {
        let cache = ResultCache::new(2);
        let f1 = QueryFingerprint::compute(&[1.0], "color", 1);
        let f2 = QueryFingerprint::compute(&[2.0], "color", 1);
        let f3 = QueryFingerprint::compute(&[3.0], "color", 1);

        cache.put(f1, response("one"));
        cache.put(f2, response("two"));
        cache.put(f3, response("three"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&f1).is_none());
        assert!(cache.get(&f2).is_some());
        assert!(cache.get(&f3).is_some());
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let cache = ResultCache::new(2);
        let f1 = QueryFingerprint::compute(&[1.0], "color", 1);
        let f2 = QueryFingerprint::compute(&[2.0], "color", 1);
        let f3 = QueryFingerprint::compute(&[3.0], "color", 1);

        cache.put(f1, response("one"));
        cache.put(f2, response("two"));
        // Touch f1 so f2 becomes least-recently-used
        assert!(cache.get(&f1).is_some());
        cache.put(f3, response("three"));

        assert!(cache.get(&f1).is_some());
        assert!(cache.get(&f2).is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = ResultCache::new(2);
        let f1 = QueryFingerprint::compute(&[1.0], "color", 1);
        cache.put(f1, response("one"));
        cache.put(f1, response("replaced"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&f1).unwrap().space, "replaced");
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = ResultCache::new(0);
        let f1 = QueryFingerprint::compute(&[1.0], "color", 1);
        cache.put(f1, response("one"));
        assert!(cache.is_empty());
        assert!(cache.get(&f1).is_none());
    }
}
