//! API Handlers
//!
//! HTTP request handlers for each record service endpoint. Guards have
//! already run by the time a protected handler is entered.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::guard::{Authenticator, RateLimitConfig, RateLimiter};
use crate::models::{
    CreateRecordRequest, GetRecordResponse, HealthResponse, StatsResponse, UpdateRecordRequest,
    WriteResponse,
};
use crate::service::RecordService;
use crate::store::{RecordStore, SqliteStore, StoreResult};

/// Application state shared across all handlers and the guard middleware.
///
/// Owns every piece of mutable request-spanning state; nothing is global.
#[derive(Clone)]
pub struct AppState {
    /// Record operations over cache + durable store
    pub records: RecordService,
    /// API key validation
    pub authenticator: Authenticator,
    /// Per-identity request quota
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates a new AppState over the given store.
    pub fn new(store: Arc<dyn RecordStore>, limits: RateLimitConfig) -> Self {
        Self {
            records: RecordService::new(Arc::clone(&store)),
            authenticator: Authenticator::new(store),
            limiter: Arc::new(RateLimiter::new(limits)),
        }
    }

    /// Opens the configured database, seeds API keys and builds the state.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let store = SqliteStore::open(&config.database_path)?;
        store.seed_api_keys(&config.api_keys)?;
        Ok(Self::new(Arc::new(store), config.rate_limit()))
    }
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(inner)| inner)
        .map_err(|rejection| ServiceError::BadRequest(rejection.body_text()))
}

/// Handler for GET /data/:key
pub async fn get_record_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetRecordResponse>> {
    info!("Fetching data for key: {}", key);

    match state.records.get(&key).await {
        Ok(lookup) => Ok(Json(GetRecordResponse::new(key, lookup.value, lookup.source))),
        Err(ServiceError::NotFound(key)) => {
            warn!("Key not found: {}", key);
            Err(ServiceError::NotFound(key))
        }
        Err(err) => Err(err),
    }
}

/// Handler for POST /data
pub async fn create_record_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WriteResponse>)> {
    let (key, value) = json_body(body)?.into_parts()?;
    info!("Adding data for key: {}", key);

    if let Err(err) = state.records.create(&key, &value).await {
        if matches!(err, ServiceError::Conflict(_)) {
            warn!("Attempted to add duplicate key: {}", key);
        }
        return Err(err);
    }

    Ok((StatusCode::CREATED, Json(WriteResponse::created(key, value))))
}

/// Handler for PUT /data/:key
///
/// A missing key is reported as 404 before the body is looked at.
pub async fn update_record_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: std::result::Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> Result<Json<WriteResponse>> {
    info!("Updating data for key: {}", key);

    if !state.records.exists(&key).await? {
        warn!("Key not found for update: {}", key);
        return Err(ServiceError::NotFound(key));
    }

    let value = json_body(body)?.into_value()?;

    if let Err(err) = state.records.update(&key, &value).await {
        if matches!(err, ServiceError::NotFound(_)) {
            warn!("Key not found for update: {}", key);
        }
        return Err(err);
    }

    Ok(Json(WriteResponse::updated(key, value)))
}

/// Handler for GET /data
///
/// Returns every record as one JSON object; missing values appear as `""`.
pub async fn list_records_handler(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>> {
    let records = state.records.list_all().await?;

    Ok(Json(
        records
            .into_iter()
            .map(|record| (record.key, record.value))
            .collect(),
    ))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.records.cache_stats().await;

    Json(StatsResponse::new(
        &cache,
        state.limiter.config(),
        state.limiter.tracked_identities(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
