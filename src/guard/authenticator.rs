//! API key authentication against the durable store's key set.

use std::sync::Arc;

use tracing::debug;

use crate::store::{run_blocking, RecordStore, StoreResult};

/// Outcome of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    Unauthorized,
}

/// Validates presented API keys by membership in the seeded key set.
///
/// Holds no per-caller state: no sessions, no expiry.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn RecordStore>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Absent and empty credentials are rejected without touching the store.
    pub async fn authenticate(&self, presented: Option<&str>) -> StoreResult<AuthOutcome> {
        let candidate = match presented {
            Some(key) if !key.is_empty() => key,
            _ => return Ok(AuthOutcome::Unauthorized),
        };

        let owned = candidate.to_string();
        if run_blocking(&self.store, move |store| store.is_valid_api_key(&owned)).await? {
            Ok(AuthOutcome::Authorized)
        } else {
            debug!(
                key_prefix = %candidate.chars().take(4).collect::<String>(),
                "Unknown API key"
            );
            Ok(AuthOutcome::Unauthorized)
        }
    }
}
