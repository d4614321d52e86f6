//! Request Guards
//!
//! The two cross-cutting checks applied to protected routes, in this order:
//! rate limiting, then authentication.

mod authenticator;
mod rate_limiter;

pub use authenticator::{AuthOutcome, Authenticator};
pub use rate_limiter::{
    RateDecision, RateLimitConfig, RateLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS,
};

/// Header carrying the client's API key; also the rate limiter identity.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Identity shared by every request that presents no API key.
pub const ANONYMOUS_IDENTITY: &str = "";
