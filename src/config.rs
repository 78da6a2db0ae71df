// Service configuration, read once from the environment at startup.

use std::env;
use std::time::Duration;

const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Everything the service needs from its environment: upstream credentials,
/// the secondary-events feature flag, timeouts, cache TTL, and the web
/// layer's bind/CORS settings. Credentials are opaque strings; an empty
/// string means "this provider is not configured".
#[derive(Debug, Clone)]
pub struct Config {
    pub poi_api_key: String,
    pub events_api_key: String,
    pub alt_events_token: String,
    pub alt_events_enabled: bool,
    pub geocode_timeout: Duration,
    pub provider_timeout: Duration,
    pub cache_ttl: Duration,
    pub cors_origins: Vec<String>,
    pub bind_addr: String,
    /// Base-URL overrides, mainly for deployments that proxy upstreams.
    pub geocoder_base_url: Option<String>,
    pub poi_base_url: Option<String>,
    pub events_base_url: Option<String>,
    pub alt_events_base_url: Option<String>,
}

impl Config {
    /// Build a config from process environment variables. Missing keys fall
    /// back to defaults; malformed numeric values fall back rather than fail
    /// so a typo'd timeout cannot keep the service from booting.
    pub fn from_env() -> Self {
        Self {
            poi_api_key: env_string("POI_API_KEY"),
            events_api_key: env_string("EVENTS_API_KEY"),
            alt_events_token: env_string("ALT_EVENTS_TOKEN"),
            alt_events_enabled: env_flag("ALT_EVENTS_ENABLE"),
            geocode_timeout: Duration::from_secs(env_u64(
                "GEOCODE_TIMEOUT_SECS",
                DEFAULT_GEOCODE_TIMEOUT_SECS,
            )),
            provider_timeout: Duration::from_secs(env_u64(
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )),
            cache_ttl: Duration::from_secs(env_u64("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
            cors_origins: env_list("CORS_ORIGINS", DEFAULT_CORS_ORIGIN),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            geocoder_base_url: env::var("GEOCODER_BASE_URL").ok(),
            poi_base_url: env::var("POI_BASE_URL").ok(),
            events_base_url: env::var("EVENTS_BASE_URL").ok(),
            alt_events_base_url: env::var("ALT_EVENTS_BASE_URL").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poi_api_key: String::new(),
            events_api_key: String::new(),
            alt_events_token: String::new(),
            alt_events_enabled: false,
            geocode_timeout: Duration::from_secs(DEFAULT_GEOCODE_TIMEOUT_SECS),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            geocoder_base_url: None,
            poi_base_url: None,
            events_base_url: None,
            alt_events_base_url: None,
        }
    }
}

fn env_string(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

/// Truthy unless unset or one of "0", "false", "no" (case-insensitive),
/// matching how the secondary-events gate has always been flipped.
fn env_flag(key: &str) -> bool {
    match env::var(key) {
        Ok(v) => !matches!(v.to_lowercase().as_str(), "" | "0" | "false" | "no"),
        Err(_) => false,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
