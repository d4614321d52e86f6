//! Request and Response models for the record API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CreateRecordRequest, UpdateRecordRequest, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
pub use responses::{
    CacheStatsBody, GetRecordResponse, HealthResponse, RateLimiterStatsBody, StatsResponse,
    WriteResponse,
};
