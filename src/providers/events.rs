// Primary ticketed-events adapter with a short micro-cache and a bounded
// backoff sequence for upstream rate limiting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{json_f64, SearchProvider, SearchQuery};
use crate::error::ProviderError;
use crate::http::HttpFetch;
use crate::models::{PlanItem, Source};

const DEFAULT_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2/events.json";
const RADIUS_MILES: &str = "25";
const PAGE_SIZE: &str = "30";
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1_200;
const BACKOFF_MULTIPLIER: f64 = 1.5;
const JITTER_FACTOR: f64 = 0.1;
const MICRO_CACHE_TTL: Duration = Duration::from_secs(30);

/// Micro-cache identity: coordinates rounded to 5 decimal places plus the
/// window bounds and keyword. Absorbs duplicate near-simultaneous calls
/// (double submits, dev-server hot reloads).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MicroKey {
    lat_e5: i64,
    lon_e5: i64,
    start: String,
    end: String,
    keyword: String,
}

pub struct EventsProvider {
    client: Arc<dyn HttpFetch>,
    api_key: String,
    base_url: String,
    micro_cache: DashMap<MicroKey, (Instant, Vec<PlanItem>)>,
}

impl EventsProvider {
    pub fn new(client: Arc<dyn HttpFetch>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            micro_cache: DashMap::new(),
        }
    }

    /// Backoff for attempt n: 1.2s, then x1.5 per retry, with a little
    /// jitter to keep retries from bunching up.
    fn backoff(attempt: u32) -> Duration {
        let base = INITIAL_BACKOFF_MS as f64 * BACKOFF_MULTIPLIER.powi(attempt as i32);
        let jitter = rand::random::<f64>() * JITTER_FACTOR * base;
        Duration::from_millis((base + jitter) as u64)
    }

    /// Pull coordinates and descriptive fields out of the deeply nested
    /// venue structure, trying fallback fields before giving up on a record.
    fn translate(event: &serde_json::Value) -> Option<PlanItem> {
        let venue = &event["_embedded"]["venues"][0];
        let location = &venue["location"];

        let lat = json_f64(&location["latitude"]).or_else(|| json_f64(&venue["latitude"]))?;
        let lon = json_f64(&location["longitude"]).or_else(|| json_f64(&venue["longitude"]))?;

        let venue_name = venue["name"].as_str().map(str::to_string);
        let city = venue["city"]["name"].as_str();
        let state = venue["state"]["stateCode"]
            .as_str()
            .or_else(|| venue["state"]["name"].as_str());
        let line1 = venue["address"]["line1"].as_str();
        let address_parts: Vec<&str> = [line1, city, state].into_iter().flatten().collect();
        let address = if address_parts.is_empty() {
            None
        } else {
            Some(address_parts.join(", "))
        };

        let when_iso = event["dates"]["start"]["dateTime"]
            .as_str()
            .or_else(|| event["dates"]["start"]["localDate"].as_str())
            .map(str::to_string);

        Some(PlanItem {
            title: event["name"].as_str().unwrap_or("Event").to_string(),
            lat,
            lon,
            url: event["url"].as_str().map(str::to_string),
            source: Source::EventServiceA,
            venue: venue_name,
            address,
            when_iso,
        })
    }
}

#[async_trait]
impl SearchProvider for EventsProvider {
    fn name(&self) -> &'static str {
        "event-service-a"
    }

    fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlanItem>, ProviderError> {
        if !self.enabled() {
            return Ok(vec![]);
        }

        let keyword = super::first_interest(&query.interests).unwrap_or("");
        let start = query.window.start_iso();
        let end = query.window.end_iso();

        let cache_key = MicroKey {
            lat_e5: (query.center.lat * 1e5).round() as i64,
            lon_e5: (query.center.lon * 1e5).round() as i64,
            start: start.clone(),
            end: end.clone(),
            keyword: keyword.to_string(),
        };
        if let Some(entry) = self.micro_cache.get(&cache_key) {
            let (stored_at, items) = entry.value();
            if stored_at.elapsed() < MICRO_CACHE_TTL {
                return Ok(items.clone());
            }
        }

        let mut params = vec![
            ("apikey", self.api_key.clone()),
            (
                "latlong",
                format!("{},{}", query.center.lat, query.center.lon),
            ),
            ("radius", RADIUS_MILES.to_string()),
            ("unit", "miles".to_string()),
            ("startDateTime", start),
            ("endDateTime", end),
            ("sort", "date,asc".to_string()),
            ("size", PAGE_SIZE.to_string()),
        ];
        if !keyword.is_empty() {
            params.push(("keyword", keyword.to_string()));
        }

        for attempt in 0..MAX_ATTEMPTS {
            let response = self.client.get(&self.base_url, &params, &[]).await?;

            if response.status == 429 {
                // Upstream spike arrest: wait and retry within the one
                // bounded backoff sequence we allow.
                if attempt + 1 < MAX_ATTEMPTS {
                    let delay = Self::backoff(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            if !response.is_success() {
                debug!(
                    status = response.status,
                    "events search returned non-success, giving up"
                );
                return Ok(vec![]);
            }

            let events = response
                .json()
                .and_then(|body| body["_embedded"]["events"].as_array().cloned())
                .unwrap_or_default();
            let items: Vec<PlanItem> = events.iter().filter_map(Self::translate).collect();

            self.micro_cache
                .insert(cache_key, (Instant::now(), items.clone()));
            return Ok(items);
        }

        Ok(vec![])
    }
}
