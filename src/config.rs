use std::env;
use thiserror::Error;

use crate::sun::GeoCoordinate;

pub const DEFAULT_BASE_URL: &str = "https://blynk.cloud";
pub const MAX_CONCURRENCY: usize = 10;

// Ho Chi Minh City, matching the fixed UTC+7 clock
pub const DEFAULT_COORDINATE: GeoCoordinate = GeoCoordinate {
    latitude: 10.8231,
    longitude: 106.6297,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

// Read once per container, shared by every invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub base_url: String,
    pub dispatch_concurrency: usize,
    pub default_coordinate: GeoCoordinate,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separate from from_env so tests don't touch the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("BLYNK_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("BLYNK_TOKEN"))?;
        let base_url = lookup("BLYNK_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            token,
            base_url,
            dispatch_concurrency: dispatch_concurrency(lookup("DISPATCH_CONCURRENCY")),
            default_coordinate: GeoCoordinate {
                latitude: parse_or(lookup("DEFAULT_LAT"), DEFAULT_COORDINATE.latitude),
                longitude: parse_or(lookup("DEFAULT_LON"), DEFAULT_COORDINATE.longitude),
            },
        })
    }
}

// Concurrency from env var, clamped to 1-10; unset or garbage means all at once
fn dispatch_concurrency(raw: Option<String>) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok())
        .map(|n| n.clamp(1, MAX_CONCURRENCY))
        .unwrap_or(MAX_CONCURRENCY)
}

fn parse_or(raw: Option<String>, default: f64) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
