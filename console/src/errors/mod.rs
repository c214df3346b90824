//! Global application error types and handlers.
//!
//! This module defines custom error types that are used across the entire
//! console application and provides mechanisms for consistent error handling
//! when talking to the game-operations backend.

use thiserror::Error;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Network error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("Unexpected response from backend: {message}")]
    UnexpectedResponse { message: String },

    #[error("Session storage error: {source}")]
    Storage {
        #[from]
        source: anyhow::Error,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Whether the error means the stored credential is no longer usable.
    ///
    /// Callers use this to decide between "show the message and retry" and
    /// "drop the session and send the user back to the login screen".
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::Authentication { .. } | ServiceError::SessionExpired
        )
    }
}

/// Runs `validator` checks on a request payload and folds any failures into a
/// single `ServiceError::Validation` message.
pub fn validate_dto<T: validator::Validate>(dto: &T) -> ServiceResult<()> {
    if let Err(validation_errors) = dto.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        return Err(ServiceError::validation(error_messages.join(", ")));
    }

    Ok(())
}
