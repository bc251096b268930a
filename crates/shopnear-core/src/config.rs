use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::error::ConfigError;
use crate::geo::Position;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("SHOPNEAR_ENV", "development"))?;

    let api_url = or_default("SHOPNEAR_API_URL", "http://localhost:5000/api");
    if api_url.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPNEAR_API_URL".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let log_level = or_default("SHOPNEAR_LOG_LEVEL", "info");
    let storage_path = PathBuf::from(or_default(
        "SHOPNEAR_STORAGE_PATH",
        "./.shopnear/storage.json",
    ));
    let request_timeout_secs = parse_num("SHOPNEAR_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHOPNEAR_USER_AGENT", "shopnear/0.1 (nearby-discovery)");
    let location_ttl_secs = parse_num("SHOPNEAR_LOCATION_TTL_SECS", "1800")?;
    let geolocation_timeout_ms = parse_num("SHOPNEAR_GEOLOCATION_TIMEOUT_MS", "15000")?;
    let geolocation_max_age_ms = parse_num("SHOPNEAR_GEOLOCATION_MAX_AGE_MS", "10000")?;
    let radius_debounce_ms = parse_num("SHOPNEAR_RADIUS_DEBOUNCE_MS", "300")?;

    let default_radius_km: f64 = parse_value(
        "SHOPNEAR_DEFAULT_RADIUS_KM",
        &or_default("SHOPNEAR_DEFAULT_RADIUS_KM", "10"),
    )?;
    if !(default_radius_km.is_finite() && default_radius_km > 0.0) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPNEAR_DEFAULT_RADIUS_KM".to_string(),
            reason: "must be a positive number of kilometers".to_string(),
        });
    }

    let device_position = parse_device_position(
        lookup("SHOPNEAR_DEVICE_LATITUDE").ok(),
        lookup("SHOPNEAR_DEVICE_LONGITUDE").ok(),
    )?;

    Ok(AppConfig {
        env,
        api_url,
        log_level,
        storage_path,
        request_timeout_secs,
        user_agent,
        location_ttl_secs,
        geolocation_timeout_ms,
        geolocation_max_age_ms,
        radius_debounce_ms,
        default_radius_km,
        device_position,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPNEAR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Latitude and longitude must be set together.
fn parse_device_position(
    latitude: Option<String>,
    longitude: Option<String>,
) -> Result<Option<Position>, ConfigError> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(
            "SHOPNEAR_DEVICE_LONGITUDE".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar(
            "SHOPNEAR_DEVICE_LATITUDE".to_string(),
        )),
        (Some(lat), Some(lng)) => {
            let latitude: f64 = parse_value("SHOPNEAR_DEVICE_LATITUDE", &lat)?;
            let longitude: f64 = parse_value("SHOPNEAR_DEVICE_LONGITUDE", &lng)?;
            Position::new(latitude, longitude)
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "SHOPNEAR_DEVICE_LATITUDE".to_string(),
                    reason: e.to_string(),
                })
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
