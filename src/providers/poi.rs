// Points-of-interest search adapter (Yelp-compatible wire) with a
// strict/relaxed open-now fallback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{json_f64, SearchProvider, SearchQuery};
use crate::error::ProviderError;
use crate::http::HttpFetch;
use crate::models::{PlanItem, Source};

const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3/businesses/search";
const STRICT_RADIUS_M: u32 = 8_000;
const RELAXED_RADIUS_M: u32 = 12_000;
const PAGE_LIMIT: u32 = 12;
const FULL_PRICE_RANGE: &str = "1,2,3,4";

/// Map a budget figure to the upstream's coarse price tiers. Unparsable
/// budgets search the broad middle of the range.
fn price_band(budget: &str) -> &'static str {
    match budget.trim().parse::<i64>() {
        Ok(b) if b < 25 => "1",
        Ok(b) if b < 60 => "1,2",
        Ok(b) if b < 120 => "2,3",
        Ok(_) => "3,4",
        Err(_) => "1,2,3",
    }
}

pub struct PoiSearchProvider {
    client: Arc<dyn HttpFetch>,
    api_key: String,
    base_url: String,
}

impl PoiSearchProvider {
    pub fn new(client: Arc<dyn HttpFetch>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Search term: leading interest token, with the historical fallbacks
    /// for blank input.
    fn term(interests: &str) -> &str {
        let base = if interests.trim().is_empty() {
            "things to do"
        } else {
            interests
        };
        match super::first_interest(base) {
            Some(t) => t,
            None => "fun",
        }
    }

    async fn run_pass(
        &self,
        query: &[(&str, String)],
    ) -> Result<Vec<PlanItem>, ProviderError> {
        let headers = [
            ("Authorization", format!("Bearer {}", self.api_key)),
            ("Accept", "application/json".to_string()),
        ];
        let response = self.client.get(&self.base_url, query, &headers).await?;
        if !response.is_success() {
            debug!(status = response.status, "poi search returned non-success");
            return Ok(vec![]);
        }
        let Some(body) = response.json() else {
            return Ok(vec![]);
        };

        let businesses = body["businesses"].as_array().cloned().unwrap_or_default();
        let mut out = Vec::new();
        for biz in businesses {
            // Records without usable coordinates are discarded, not emitted
            // as partial items.
            let (Some(lat), Some(lon)) = (
                json_f64(&biz["coordinates"]["latitude"]),
                json_f64(&biz["coordinates"]["longitude"]),
            ) else {
                continue;
            };

            let address = biz["location"]["display_address"]
                .as_array()
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .filter(|a| !a.is_empty());

            out.push(PlanItem {
                title: biz["name"].as_str().unwrap_or("Place").to_string(),
                lat,
                lon,
                url: biz["url"].as_str().map(str::to_string),
                source: Source::PoiSearch,
                venue: None,
                address,
                when_iso: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SearchProvider for PoiSearchProvider {
    fn name(&self) -> &'static str {
        "poi-search"
    }

    fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlanItem>, ProviderError> {
        if !self.enabled() {
            return Ok(vec![]);
        }

        let term = Self::term(&query.interests);
        let lat = query.center.lat.to_string();
        let lon = query.center.lon.to_string();

        // Pass 1: currently-open venues, tighter radius, banded price.
        if query.open_now {
            let strict = [
                ("latitude", lat.clone()),
                ("longitude", lon.clone()),
                ("term", term.to_string()),
                ("radius", STRICT_RADIUS_M.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("price", price_band(&query.budget).to_string()),
                ("open_now", "true".to_string()),
            ];
            let items = self.run_pass(&strict).await?;
            if !items.is_empty() {
                return Ok(items);
            }
        }

        // Pass 2: wider radius across the full price range.
        let relaxed = [
            ("latitude", lat),
            ("longitude", lon),
            ("term", term.to_string()),
            ("radius", RELAXED_RADIUS_M.to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("price", FULL_PRICE_RANGE.to_string()),
        ];
        self.run_pass(&relaxed).await
    }
}
