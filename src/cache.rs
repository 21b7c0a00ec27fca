//! # Tide Data Freshness Cache
//!
//! Keeps the most recent view model per location in memory so repeated
//! requests inside the freshness window do not hit NOAA again.
//!
//! ## Caching Strategy
//!
//! - **Key**: the requested location string (the view model echoes it)
//! - **TTL**: 30 minutes by default. NOAA publishes new prediction runs far
//!   less often than that
//! - **Failures**: never cached; the next request retries upstream
//! - **Bound**: at most `max_entries` locations; inserting into a full cache
//!   first drops stale entries, then the oldest one
//!
//! The caller passes the current `Instant` so expiry can be tested without
//! sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::TideData;

/// Default time-to-live in seconds (30 minutes)
pub const DEFAULT_TTL_SECS: u64 = 1800;

#[derive(Debug)]
struct CachedEntry {
    fetched_at: Instant,
    data: TideData,
}

/// In-memory per-location cache of built view models.
#[derive(Debug)]
pub struct TideCache {
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl TideCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        TideCache {
            ttl,
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached view model for `location` if it is still fresh at
    /// `now`.
    pub async fn get(&self, location: &str, now: Instant) -> Option<TideData> {
        let entries = self.entries.read().await;
        let entry = entries.get(location)?;
        if now.saturating_duration_since(entry.fetched_at) > self.ttl {
            return None;
        }
        Some(entry.data.clone())
    }

    /// Store a freshly fetched view model for `location`.
    pub async fn insert(&self, location: String, data: TideData, now: Instant) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&location) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, entry| now.saturating_duration_since(entry.fetched_at) <= ttl);

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.fetched_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    debug!(location = %key, "evicting oldest cached forecast");
                    entries.remove(&key);
                }
            }
        }

        entries.insert(
            location,
            CachedEntry {
                fetched_at: now,
                data,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for TideCache {
    fn default() -> Self {
        TideCache::new(Duration::from_secs(DEFAULT_TTL_SECS), 256)
    }
}
