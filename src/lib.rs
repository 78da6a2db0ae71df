// Day planner aggregation service: fan-out querying of "things to do"
// providers with timeout isolation, partial-failure tolerance, caching,
// deduplication, and ranking.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod isolation;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod providers;
pub mod window;

// Re-export key types for convenience
pub use cache::ResponseCache;
pub use config::Config;
pub use error::{PlanError, ProviderError, TransportError};
pub use models::{Center, PlanItem, PlanRequest, PlanResponse, Source, Timeframe};
pub use orchestrator::Planner;
pub use providers::{Geocoder, SearchProvider, SearchQuery};
pub use window::{build_window, TimeWindow};
