//! Request DTOs for the record API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::error::ServiceError;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Request body for POST /data
///
/// Fields are optional at the serde level so that a missing field surfaces
/// as a structured `BadRequest` instead of an extractor rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl CreateRecordRequest {
    /// Validates the body and returns `(key, value)`.
    pub fn into_parts(self) -> Result<(String, String), ServiceError> {
        let key = self
            .key
            .ok_or_else(|| ServiceError::BadRequest("Missing 'key' field".to_string()))?;
        let value = require_value(self.value)?;
        validate_key(&key)?;
        Ok((key, value))
    }
}

/// Request body for PUT /data/:key
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub value: Option<String>,
}

impl UpdateRecordRequest {
    /// Validates the body and returns the new value.
    pub fn into_value(self) -> Result<String, ServiceError> {
        require_value(self.value)
    }
}

fn require_value(value: Option<String>) -> Result<String, ServiceError> {
    let value =
        value.ok_or_else(|| ServiceError::BadRequest("Missing 'value' field".to_string()))?;
    if value.len() > MAX_VALUE_SIZE {
        return Err(ServiceError::BadRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    Ok(value)
}

fn validate_key(key: &str) -> Result<(), ServiceError> {
    if key.is_empty() {
        return Err(ServiceError::BadRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(ServiceError::BadRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
