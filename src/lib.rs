//! Guarded KV - A key-value record service
//!
//! Records live in SQLite behind a read-through cache. Protected routes are
//! rate limited per client and require a known API key.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::ServiceError;
pub use tasks::spawn_prune_task;
