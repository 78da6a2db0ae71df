// Nominatim-style geocoder adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{json_f64, Geocoder};
use crate::error::ProviderError;
use crate::http::HttpFetch;
use crate::models::Center;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Free-text location -> coordinates via a Nominatim-compatible endpoint.
/// Single call, no retry, no internal timeout; the orchestrator wraps it in
/// the isolation guard.
pub struct NominatimGeocoder {
    client: Arc<dyn HttpFetch>,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: Arc<dyn HttpFetch>, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, location: &str) -> Result<Option<Center>, ProviderError> {
        let query = [
            ("format", "jsonv2".to_string()),
            ("q", location.to_string()),
            ("limit", "1".to_string()),
        ];
        let headers = [
            ("Accept", "application/json".to_string()),
            ("Accept-Language", "en".to_string()),
        ];

        let response = self.client.get(&self.base_url, &query, &headers).await?;
        if !response.is_success() {
            debug!(status = response.status, "geocoder returned non-success");
            return Ok(None);
        }

        // Malformed payloads are a normal not-found outcome here, never an
        // error: the lat/lon fields arrive as quoted strings.
        let hit = match response.json() {
            Some(serde_json::Value::Array(results)) => results.into_iter().next(),
            _ => None,
        };
        let Some(hit) = hit else {
            return Ok(None);
        };

        match (json_f64(&hit["lat"]), json_f64(&hit["lon"])) {
            (Some(lat), Some(lon)) => Ok(Some(Center { lat, lon })),
            _ => Ok(None),
        }
    }
}
