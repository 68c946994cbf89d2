//! Chat error taxonomy surfaced to API and realtime callers.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use thiserror::Error;

/// Errors returned by every chat operation.
///
/// A caller who is not a member of a room gets `NotFound`, never a
/// permission error, so room existence does not leak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Internal error: {0}")]
    Infrastructure(String),
}

impl ChatError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ChatError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ChatError::NotFound(what.into())
    }

    /// The uniform answer for rooms the caller cannot see.
    pub fn room_not_found() -> Self {
        ChatError::NotFound("Room not found".to_string())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ChatError::Infrastructure(message.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Validation { .. } => "VALIDATION_FAILED",
            ChatError::NotFound(_) => "NOT_FOUND",
            ChatError::Conflict(_) => "CONFLICT",
            ChatError::Unauthenticated => "UNAUTHENTICATED",
            ChatError::Infrastructure(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to a client. Infrastructure details stay in logs.
    pub fn client_message(&self) -> String {
        match self {
            ChatError::Infrastructure(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for ChatError {
    fn from(err: DomainError) -> Self {
        match err.code {
            code if code.is_not_found() => ChatError::NotFound(err.message),
            ErrorCode::Conflict => ChatError::Conflict(err.message),
            ErrorCode::ValidationFailed => {
                let field = err.details.get("field").cloned().unwrap_or_default();
                ChatError::Validation {
                    field,
                    message: err.message,
                }
            }
            ErrorCode::Unauthorized => ChatError::Unauthenticated,
            _ => ChatError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for ChatError {
    fn from(err: ValidationError) -> Self {
        ChatError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
