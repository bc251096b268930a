use std::path::PathBuf;

use crate::geo::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the Nearby Search API, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    pub log_level: String,
    /// JSON file backing the durable key-value store.
    pub storage_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub location_ttl_secs: u64,
    pub geolocation_timeout_ms: u64,
    pub geolocation_max_age_ms: u64,
    pub radius_debounce_ms: u64,
    pub default_radius_km: f64,
    /// Position reported by the host's geolocation source, when it has one.
    pub device_position: Option<Position>,
}
