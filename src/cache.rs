// In-process TTL cache for finished plan responses.
//
// Entries are only invalidated lazily, on the lookup that finds them
// expired; there is no background sweep, so stale entries can linger until
// touched again. Bounded only by process lifetime.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::models::{PlanRequest, PlanResponse};

struct CacheEntry {
    expires: Instant,
    payload: PlanResponse,
}

/// Short-lived memoization of the full request -> response mapping. Owned by
/// the orchestrator rather than living in a process-wide global, so tests
/// can construct isolated instances.
pub struct ResponseCache {
    ttl: Duration,
    store: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: DashMap::new(),
        }
    }

    /// Deterministic key over the full request plus the active feature-flag
    /// set, so a flag flip never serves a stale cross-configuration hit.
    pub fn key(request: &PlanRequest, enabled_providers: &[&str]) -> String {
        let key = serde_json::json!({
            "request": request,
            "enabled": enabled_providers,
        });
        key.to_string()
    }

    pub fn get(&self, key: &str) -> Option<PlanResponse> {
        let expired = match self.store.get(key) {
            Some(entry) if entry.expires > Instant::now() => {
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.store.remove(key);
        }
        None
    }

    pub fn put(&self, key: String, payload: PlanResponse) {
        self.store.insert(
            key,
            CacheEntry {
                expires: Instant::now() + self.ttl,
                payload,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Center, Timeframe};

    fn request(location: &str) -> PlanRequest {
        PlanRequest {
            date: "2025-10-25".to_string(),
            budget: "50".to_string(),
            interests: "jazz".to_string(),
            location: location.to_string(),
            timeframe: Timeframe::Day,
            use_open_now: false,
            range_start: None,
            range_end: None,
        }
    }

    fn response() -> PlanResponse {
        PlanResponse {
            date: "2025-10-25".to_string(),
            budget: "50".to_string(),
            interests: "jazz".to_string(),
            location: "Boston".to_string(),
            center: Center {
                lat: 42.3601,
                lon: -71.0589,
            },
            items: vec![],
        }
    }

    #[tokio::test]
    async fn hit_within_ttl_returns_stored_payload() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        let key = ResponseCache::key(&request("Boston"), &["poi-search"]);
        cache.put(key.clone(), response());

        let hit = cache.get(&key).expect("expected a cache hit");
        assert_eq!(hit.location, "Boston");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_lazily_evicted() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        let key = ResponseCache::key(&request("Boston"), &[]);
        cache.put(key.clone(), response());
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(11)).await;

        // Entry still lingers in storage until the next lookup touches it.
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn flag_set_participates_in_the_key() {
        let req = request("Boston");
        let with_alt = ResponseCache::key(&req, &["poi-search", "event-service-b"]);
        let without_alt = ResponseCache::key(&req, &["poi-search"]);
        assert_ne!(with_alt, without_alt);

        // Identical request + identical flag set is deterministic.
        assert_eq!(
            ResponseCache::key(&req, &["poi-search"]),
            ResponseCache::key(&request("Boston"), &["poi-search"])
        );
    }

    #[tokio::test]
    async fn different_requests_do_not_collide() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        let boston = ResponseCache::key(&request("Boston"), &[]);
        let austin = ResponseCache::key(&request("Austin"), &[]);
        cache.put(boston.clone(), response());

        assert!(cache.get(&boston).is_some());
        assert!(cache.get(&austin).is_none());
    }
}
