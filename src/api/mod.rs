//! API Module
//!
//! HTTP handlers, guard middleware and routing for the record service.
//!
//! # Endpoints
//! - `GET /data/:key` - Fetch one record (guarded)
//! - `POST /data` - Create a record (guarded)
//! - `PUT /data/:key` - Update a record (guarded)
//! - `GET /data` - List all records (open)
//! - `GET /stats` - Cache and rate limiter statistics (guarded)
//! - `GET /health` - Health check endpoint (open)

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::{access_for, create_router, Access, RoutePolicy, ROUTE_POLICIES};
