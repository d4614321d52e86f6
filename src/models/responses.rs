//! Response DTOs for the record API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::CacheStats;
use crate::guard::RateLimitConfig;
use crate::service::Source;

/// Response body for GET /data/:key
///
/// Serializes as `{"data": {"<key>": "<value>"}, "source": "cache" | "database"}`.
#[derive(Debug, Clone, Serialize)]
pub struct GetRecordResponse {
    pub data: BTreeMap<String, String>,
    pub source: Source,
}

impl GetRecordResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>, source: Source) -> Self {
        Self {
            data: BTreeMap::from([(key.into(), value.into())]),
            source,
        }
    }
}

/// Response body for POST /data and PUT /data/:key
///
/// The record sits next to the message: `{"message": "...", "<key>": "<value>"}`.
/// A record whose key is `message` replaces the message, so the body is
/// always a single JSON object with unique members.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct WriteResponse(Map<String, Value>);

impl WriteResponse {
    pub fn created(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new("Data added successfully", key.into(), value.into())
    }

    pub fn updated(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new("Data updated successfully", key.into(), value.into())
    }

    fn new(message: &str, key: String, value: String) -> Self {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::from(message));
        body.insert(key, Value::from(value));
        Self(body)
    }
}

/// Cache section of the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsBody {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Rate limiter section of the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStatsBody {
    pub tracked_identities: usize,
    pub max_requests: u32,
    pub window_secs: u64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStatsBody,
    pub rate_limiter: RateLimiterStatsBody,
}

impl StatsResponse {
    pub fn new(cache: &CacheStats, limits: RateLimitConfig, tracked_identities: usize) -> Self {
        Self {
            cache: CacheStatsBody {
                hits: cache.hits,
                misses: cache.misses,
                writes: cache.writes,
                total_entries: cache.total_entries,
                hit_rate: cache.hit_rate(),
            },
            rate_limiter: RateLimiterStatsBody {
                tracked_identities,
                max_requests: limits.max_requests,
                window_secs: limits.window.as_secs(),
            },
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
