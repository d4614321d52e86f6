//! API Routes
//!
//! Configures the Axum router and the per-route access policy.

use axum::{
    middleware,
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_record_handler, get_record_handler, health_handler, list_records_handler,
    stats_handler, update_record_handler, AppState,
};
use super::middleware::enforce_guards;

/// Which checks a route runs before its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Rate limit, then API key authentication
    Guarded,
    /// No checks at all
    Open,
}

/// One row of the route policy table.
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
}

/// Access policy per route.
///
/// `GET /data` is deliberately open: listing every record needs neither a key
/// nor quota. Routes missing from this table are treated as guarded.
pub const ROUTE_POLICIES: &[RoutePolicy] = &[
    RoutePolicy {
        method: "GET",
        path: "/data/:key",
        access: Access::Guarded,
    },
    RoutePolicy {
        method: "POST",
        path: "/data",
        access: Access::Guarded,
    },
    RoutePolicy {
        method: "PUT",
        path: "/data/:key",
        access: Access::Guarded,
    },
    RoutePolicy {
        method: "GET",
        path: "/data",
        access: Access::Open,
    },
    RoutePolicy {
        method: "GET",
        path: "/stats",
        access: Access::Guarded,
    },
    RoutePolicy {
        method: "GET",
        path: "/health",
        access: Access::Open,
    },
];

/// Looks up a route's access policy, failing closed.
pub fn access_for(method: &str, path: &str) -> Access {
    ROUTE_POLICIES
        .iter()
        .find(|policy| policy.method == method && policy.path == path)
        .map(|policy| policy.access)
        .unwrap_or(Access::Guarded)
}

fn with_policy(
    state: &AppState,
    method: &str,
    path: &str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    match access_for(method, path) {
        Access::Open => route,
        Access::Guarded => {
            route.route_layer(middleware::from_fn_with_state(state.clone(), enforce_guards))
        }
    }
}

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /data/:key` - Fetch one record (cache, then database)
/// - `POST /data` - Create a record
/// - `PUT /data/:key` - Update an existing record
/// - `GET /data` - List all records
/// - `GET /stats` - Cache and rate limiter statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Guards: per route, see [`ROUTE_POLICIES`]
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let collection = with_policy(&state, "GET", "/data", get(list_records_handler)).merge(
        with_policy(&state, "POST", "/data", post(create_record_handler)),
    );
    let item = with_policy(&state, "GET", "/data/:key", get(get_record_handler)).merge(
        with_policy(&state, "PUT", "/data/:key", put(update_record_handler)),
    );

    Router::new()
        .route("/data", collection)
        .route("/data/:key", item)
        .route(
            "/stats",
            with_policy(&state, "GET", "/stats", get(stats_handler)),
        )
        .route(
            "/health",
            with_policy(&state, "GET", "/health", get(health_handler)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
