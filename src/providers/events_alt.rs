// Secondary events adapter (feature-flagged) with a three-step
// query-relaxation ladder: interest text, then no text, then wider radius.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{json_f64, SearchProvider, SearchQuery};
use crate::error::ProviderError;
use crate::http::HttpFetch;
use crate::models::{PlanItem, Source};

const DEFAULT_BASE_URL: &str = "https://www.eventbriteapi.com/v3/events/search/";
const NEAR_RADIUS: &str = "10km";
const WIDE_RADIUS: &str = "25km";
const MAX_RECORDS: usize = 20;

pub struct AltEventsProvider {
    client: Arc<dyn HttpFetch>,
    token: String,
    feature_enabled: bool,
    base_url: String,
}

impl AltEventsProvider {
    pub fn new(
        client: Arc<dyn HttpFetch>,
        token: String,
        feature_enabled: bool,
        base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            token,
            feature_enabled,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    async fn run_pass(
        &self,
        query: &[(&str, String)],
    ) -> Result<Vec<PlanItem>, ProviderError> {
        let headers = [
            ("Authorization", format!("Bearer {}", self.token)),
            ("Accept", "application/json".to_string()),
        ];
        let response = self.client.get(&self.base_url, query, &headers).await?;
        if !response.is_success() {
            debug!(status = response.status, "alt events returned non-success");
            return Ok(vec![]);
        }
        let Some(body) = response.json() else {
            return Ok(vec![]);
        };

        let events = body["events"].as_array().cloned().unwrap_or_default();
        let mut out = Vec::new();
        // Only the first screenful of upstream records is worth translating.
        for event in events.iter().take(MAX_RECORDS) {
            let venue = &event["venue"];
            let (Some(lat), Some(lon)) = (
                json_f64(&venue["latitude"]),
                json_f64(&venue["longitude"]),
            ) else {
                continue;
            };
            out.push(PlanItem {
                title: event["name"]["text"].as_str().unwrap_or("Event").to_string(),
                lat,
                lon,
                url: event["url"].as_str().map(str::to_string),
                source: Source::EventServiceB,
                venue: venue["name"].as_str().map(str::to_string),
                address: None,
                when_iso: event["start"]["utc"].as_str().map(str::to_string),
            });
        }
        Ok(out)
    }

    fn base_params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        vec![
            ("start_date.range_start", query.window.start_iso()),
            ("start_date.range_end", query.window.end_iso()),
            ("location.latitude", query.center.lat.to_string()),
            ("location.longitude", query.center.lon.to_string()),
            ("location.within", NEAR_RADIUS.to_string()),
            ("expand", "venue".to_string()),
            ("virtual_events", "false".to_string()),
            ("include_all_series_instances", "true".to_string()),
            ("sort_by", "date".to_string()),
        ]
    }
}

#[async_trait]
impl SearchProvider for AltEventsProvider {
    fn name(&self) -> &'static str {
        "event-service-b"
    }

    /// Flag off and missing credentials are equivalent: the adapter is
    /// unavailable and makes no network call.
    fn enabled(&self) -> bool {
        self.feature_enabled && !self.token.is_empty()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlanItem>, ProviderError> {
        if !self.enabled() {
            return Ok(vec![]);
        }

        let base = self.base_params(query);

        // Pass 1: constrain by the free-text interest string.
        let mut with_text = base.clone();
        with_text.push(("q", query.interests.clone()));
        let items = self.run_pass(&with_text).await?;
        if !items.is_empty() {
            return Ok(items);
        }

        // Pass 2: drop the text constraint.
        let items = self.run_pass(&base).await?;
        if !items.is_empty() {
            return Ok(items);
        }

        // Pass 3: widen the radius.
        let wide: Vec<(&str, String)> = base
            .into_iter()
            .map(|(k, v)| {
                if k == "location.within" {
                    (k, WIDE_RADIUS.to_string())
                } else {
                    (k, v)
                }
            })
            .collect();
        self.run_pass(&wide).await
    }
}
