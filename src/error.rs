// Error taxonomy for the planning pipeline.
//
// Provider-level soft failures (non-success upstream statuses, malformed
// payloads, zero results) never surface here; they are absorbed at the
// adapter boundary. Only the outcomes a client can observe are modeled.

use thiserror::Error;

/// Failures the orchestrator can return to the web layer.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The request itself is unusable: ungeocodable location or an invalid
    /// custom time range. Maps to HTTP 400.
    #[error("{0}")]
    InvalidRequest(String),

    /// No provider has credentials/flags that enable it. Maps to HTTP 500.
    #[error("no search providers configured")]
    Unconfigured,

    /// Every enabled provider came back empty, whether from timeout,
    /// transport failure, or a legitimate lack of results. Carries the first
    /// diagnostic collected during the fan-out. Maps to HTTP 500.
    #[error("all providers failed: {0}")]
    AllProvidersFailed(String),

    /// Unexpected failure in the orchestration layer itself. Full detail is
    /// logged server-side; clients only see a generic message.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Transport-level fault from an upstream call. The only provider failure
/// that propagates past an adapter; everything else becomes an empty result.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Error type shared by the provider and geocoder adapters.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}
