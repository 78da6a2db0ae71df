// Fan-out orchestrator: cache lookup, geocode, window derivation, concurrent
// provider fan-out under isolation, merge/dedupe/rank, cache store.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::PlanError;
use crate::http::HttpFetch;
use crate::isolation::guard;
use crate::models::{PlanRequest, PlanResponse};
use crate::pipeline::{dedupe, rank, DEFAULT_LIMIT};
use crate::providers::{
    AltEventsProvider, EventsProvider, Geocoder, NominatimGeocoder, PoiSearchProvider,
    SearchProvider, SearchQuery,
};
use crate::window::build_window;

/// Owns the provider set, the geocoder, and the response cache; one instance
/// serves the whole process.
pub struct Planner {
    geocoder: Arc<dyn Geocoder>,
    providers: Vec<Arc<dyn SearchProvider>>,
    cache: ResponseCache,
    geocode_timeout: Duration,
    provider_timeout: Duration,
    limit: usize,
}

impl Planner {
    /// Wire up the production adapters from configuration, sharing one HTTP
    /// client across all of them.
    pub fn new(config: &Config, client: Arc<dyn HttpFetch>) -> Self {
        let geocoder = Arc::new(NominatimGeocoder::new(
            client.clone(),
            config.geocoder_base_url.clone(),
        ));
        let providers: Vec<Arc<dyn SearchProvider>> = vec![
            Arc::new(PoiSearchProvider::new(
                client.clone(),
                config.poi_api_key.clone(),
                config.poi_base_url.clone(),
            )),
            Arc::new(EventsProvider::new(
                client.clone(),
                config.events_api_key.clone(),
                config.events_base_url.clone(),
            )),
            Arc::new(AltEventsProvider::new(
                client,
                config.alt_events_token.clone(),
                config.alt_events_enabled,
                config.alt_events_base_url.clone(),
            )),
        ];
        Self::with_parts(
            geocoder,
            providers,
            ResponseCache::new(config.cache_ttl),
            config.geocode_timeout,
            config.provider_timeout,
        )
    }

    /// Assembly seam for tests and alternative wiring.
    pub fn with_parts(
        geocoder: Arc<dyn Geocoder>,
        providers: Vec<Arc<dyn SearchProvider>>,
        cache: ResponseCache,
        geocode_timeout: Duration,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            providers,
            cache,
            geocode_timeout,
            provider_timeout,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn plan(&self, request: PlanRequest) -> Result<PlanResponse, PlanError> {
        let enabled: Vec<&Arc<dyn SearchProvider>> =
            self.providers.iter().filter(|p| p.enabled()).collect();
        let enabled_names: Vec<&str> = enabled.iter().map(|p| p.name()).collect();

        let cache_key = ResponseCache::key(&request, &enabled_names);
        if let Some(hit) = self.cache.get(&cache_key) {
            info!(location = %request.location, "serving plan from cache");
            return Ok(hit);
        }

        // A misconfigured deployment is not a partial-failure case; bail
        // before touching the network at all.
        if enabled.is_empty() {
            return Err(PlanError::Unconfigured);
        }

        let (geocoded, geocode_error) = guard(
            "geocoder",
            self.geocode_timeout,
            self.geocoder.geocode(&request.location),
        )
        .await;
        let center = match geocoded {
            Some(Some(center)) => center,
            Some(None) => {
                info!(location = %request.location, "no geocode results");
                return Err(PlanError::InvalidRequest(format!(
                    "no geocode results for location: {}",
                    request.location
                )));
            }
            // Timeout or transport failure; guard already logged the detail.
            None => {
                return Err(PlanError::InvalidRequest(format!(
                    "could not geocode location: {}",
                    geocode_error.unwrap_or_else(|| "geocoder unavailable".to_string())
                )));
            }
        };

        let window = build_window(
            &request.date,
            request.timeframe,
            request.range_start.as_deref(),
            request.range_end.as_deref(),
        )?;

        let query = SearchQuery {
            center,
            window,
            interests: request.interests.clone(),
            budget: request.budget.clone(),
            open_now: request.use_open_now,
        };

        // Fan out: every enabled provider runs concurrently, each bounded by
        // its own deadline, each completing independently of the others.
        let calls = enabled
            .iter()
            .map(|provider| guard(provider.name(), self.provider_timeout, provider.search(&query)));
        let outcomes = join_all(calls).await;

        let mut merged = Vec::new();
        let mut errors = Vec::new();
        for (provider, (items, message)) in enabled.iter().zip(outcomes) {
            match items {
                Some(items) => {
                    info!(provider = provider.name(), count = items.len(), "provider returned");
                    merged.extend(items);
                }
                None => errors.push(message.unwrap_or_else(|| {
                    format!("{} returned no outcome", provider.name())
                })),
            }
        }

        if merged.is_empty() {
            // Failed outcomes are deliberately not cached: the next identical
            // request gets a fresh attempt at the providers.
            let first = errors
                .into_iter()
                .next()
                .unwrap_or_else(|| "no provider returned any results".to_string());
            return Err(PlanError::AllProvidersFailed(first));
        }
        if !errors.is_empty() {
            warn!(
                degraded = errors.len(),
                first_error = %errors[0],
                "some providers failed; serving partial results"
            );
        }

        let items = rank(dedupe(merged), self.limit);
        let response = PlanResponse {
            date: request.date,
            budget: request.budget,
            interests: request.interests,
            location: request.location,
            center,
            items,
        };
        self.cache.put(cache_key, response.clone());
        Ok(response)
    }
}
