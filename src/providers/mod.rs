//! Provider adapters: translation layers between external "things to do"
//! APIs and the normalized item model.
//!
//! Adapters never fail for ordinary no-results or upstream non-success
//! responses; those become an empty list. Only transport faults propagate,
//! to be caught by the orchestrator's isolation wrapper.

mod events;
mod events_alt;
mod geocode;
mod poi;

pub use events::EventsProvider;
pub use events_alt::AltEventsProvider;
pub use geocode::NominatimGeocoder;
pub use poi::PoiSearchProvider;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{Center, PlanItem};
use crate::window::TimeWindow;

/// Everything an adapter needs for one search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub center: Center,
    pub window: TimeWindow,
    pub interests: String,
    pub budget: String,
    pub open_now: bool,
}

/// One external data source of candidate items. The orchestrator selects the
/// enabled implementations into its fan-out set at request time.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable tag used in logs, cache keys, and error messages.
    fn name(&self) -> &'static str;

    /// Whether credentials and feature flags allow this provider to run.
    fn enabled(&self) -> bool;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlanItem>, ProviderError>;
}

/// Resolves free-text locations to coordinates. `Ok(None)` is the normal
/// not-found outcome; only transport faults are errors.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<Option<Center>, ProviderError>;
}

/// First comma-separated interest token, trimmed. Empty input yields `None`.
pub(crate) fn first_interest(interests: &str) -> Option<&str> {
    interests
        .split(',')
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Pull a float out of a JSON field that upstreams ship either as a number
/// or as a quoted string. Non-finite values are rejected so a malformed
/// record can never become an item.
pub(crate) fn json_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))?;
    parsed.is_finite().then_some(parsed)
}
