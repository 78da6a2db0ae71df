// Shared request/response models and the normalized item every provider
// adapter must produce.

use serde::{Deserialize, Serialize};

/// Which upstream a normalized item came from. Ranking weights key off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    PoiSearch,
    EventServiceA,
    EventServiceB,
    MapSearch,
    Fallback,
}

impl Source {
    /// Base ranking weight: time-bound event sources outrank static place
    /// sources, which outrank the generic fallback tier.
    pub fn weight(self) -> u8 {
        match self {
            Source::EventServiceA | Source::EventServiceB => 4,
            Source::MapSearch => 3,
            Source::PoiSearch => 2,
            Source::Fallback => 1,
        }
    }
}

/// A single recommendation, normalized across providers.
///
/// Invariant: `lat`/`lon` are always present and finite. Adapters discard
/// upstream records that lack usable coordinates instead of emitting a
/// partial item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanItem {
    pub title: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "whenISO", skip_serializing_if = "Option::is_none")]
    pub when_iso: Option<String>,
}

/// Coarse time-window selector chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Weekend,
    Week,
    Custom,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Day
    }
}

/// Incoming plan request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub date: String,
    pub budget: String,
    pub interests: String,
    pub location: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(rename = "useOpenNow", default)]
    pub use_open_now: bool,
    #[serde(rename = "rangeStart", default, skip_serializing_if = "Option::is_none")]
    pub range_start: Option<String>,
    #[serde(rename = "rangeEnd", default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<String>,
}

/// Geocoded center point echoed back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// Finished plan: request echo, center coordinates, ranked items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub date: String,
    pub budget: String,
    pub interests: String,
    pub location: String,
    pub center: Center,
    pub items: Vec<PlanItem>,
}
