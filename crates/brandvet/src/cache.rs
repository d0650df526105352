//! LRU cache for deterministic tier lookups.
//!
//! The knowledge-graph and embedding tiers answer the same label the same
//! way for days at a time; caching their successful results avoids
//! re-querying external services for every response in an import batch.
//! Only `Succeeded` results are cached - a timeout or API failure must be
//! retried on the next request, not replayed.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use brandvet_common::{TierKind, TierResult};
use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Shared evidence cache, keyed by tier and normalized inputs.
pub struct EvidenceCache {
    entries: Mutex<LruCache<String, TierResult>>,
}

impl EvidenceCache {
    /// Create a cache, or `None` when the configured capacity disables it.
    pub fn with_capacity(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Cache key for a tier's lookup inputs.
    pub fn key(kind: TierKind, parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_str().as_bytes());
        for part in parts {
            hasher.update([0u8]);
            hasher.update(part.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<TierResult> {
        let mut entries = self.entries.lock().expect("evidence cache lock poisoned");
        let hit = entries.get(key).cloned();
        if hit.is_some() {
            debug!("Evidence cache hit for key {}", &key[..12]);
        }
        hit
    }

    /// Store a result. Non-success results are ignored.
    pub fn put(&self, key: String, result: &TierResult) {
        if !result.is_succeeded() {
            return;
        }
        let mut entries = self.entries.lock().expect("evidence cache lock poisoned");
        entries.put(key, result.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("evidence cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
