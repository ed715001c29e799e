//! Time-bounded reuse of serialized single-resource reads.
//!
//! Writes never invalidate entries. A cached read can therefore lag a write
//! for at most one TTL; that staleness window is accepted.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::body::Bytes;
use contacts_types::ContactId;
use tokio::time::Instant;
use tracing::debug;

use crate::negotiation::{Operation, Representation};

/// Identity of a cached representation.
///
/// The media type is part of the key so that JSON, XML and vendor renderings
/// of the same contact never overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: Operation,
    pub resource_id: ContactId,
    pub representation: Representation,
    pub media_type: &'static str,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    expires_at: Instant,
    body: Bytes,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Concurrent TTL cache of serialized responses.
///
/// Concurrent misses for one key may both compute and both store; the later
/// store wins. Entries are immutable once written, so this only costs the
/// duplicated work.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    time_to_live: Duration,
}

impl ResponseCache {
    /// Create a cache whose entries live for `time_to_live` unless stored with an explicit TTL.
    pub fn new(time_to_live: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            time_to_live,
        }
    }

    pub fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    /// Return the stored body if it has not expired. Expired entries are dropped on the way out.
    pub fn get(&self, key: &CacheKey) -> Option<Bytes> {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_fresh(now) => return Some(entry.body.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|entry| !entry.is_fresh(now)) {
            entries.remove(key);
            debug!(operation = key.operation.name(), resource_id = key.resource_id, "evicted expired cache entry");
        }
        None
    }

    /// Store a body with the default TTL.
    pub fn put(&self, key: CacheKey, body: Bytes) {
        self.put_with_ttl(key, body, self.time_to_live);
    }

    /// Store a body that expires after `time_to_live`, replacing any previous entry.
    pub fn put_with_ttl(&self, key: CacheKey, body: Bytes, time_to_live: Duration) {
        let entry = CacheEntry {
            expires_at: Instant::now() + time_to_live,
            body,
        };
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key, entry);
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
