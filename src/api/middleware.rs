//! Guard middleware for protected routes.
//!
//! Order is fixed: rate limit, then authentication, then the handler. Over-quota
//! and unauthenticated traffic is turned away before any record is touched.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::AppState;
use crate::error::{Result, ServiceError};
use crate::guard::{AuthOutcome, RateDecision, ANONYMOUS_IDENTITY, API_KEY_HEADER};

/// Runs the rate limiter and the authenticator ahead of a protected handler.
///
/// The rate limit identity is the raw `X-API-KEY` value, so unknown keys are
/// limited too. Requests without the header share the anonymous bucket.
pub async fn enforce_guards(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let identity = presented.as_deref().unwrap_or(ANONYMOUS_IDENTITY);

    if let RateDecision::Denied { retry_after } = state.limiter.check(identity) {
        warn!(
            path = %request.uri().path(),
            anonymous = presented.is_none(),
            "Rate limit exceeded"
        );
        return Err(ServiceError::RateLimited {
            retry_after_secs: whole_seconds(retry_after),
        });
    }

    let outcome = state.authenticator.authenticate(presented.as_deref()).await?;
    match outcome {
        AuthOutcome::Authorized => Ok(next.run(request).await),
        AuthOutcome::Unauthorized => {
            warn!(path = %request.uri().path(), "Invalid or missing API Key");
            Err(ServiceError::Unauthorized)
        }
    }
}

// Rounded up so clients never retry inside the window.
fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
