//! Domain-specific error types for session management
//!
//! Expired and reused tokens are not represented here: the rotation
//! engine reports them as outcomes, not errors, so the transport layer
//! can give them distinct unauthenticated-class responses. These errors
//! cover session-inventory misuse and internal failures.

use thiserror::Error;

use vl_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// Session-management errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The session does not exist, belongs to another user, or is no
    /// longer active
    #[error("Session not found")]
    NotFound,

    /// The caller tried to delete their own current session; logout
    /// must be used instead
    #[error("Cannot delete the current session")]
    CurrentSession,

    /// Generating or persisting a fresh token value failed
    #[error("Token generation failed")]
    TokenGenerationFailed,
}

impl IntoErrorResponse for SessionError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            SessionError::NotFound => {
                ErrorResponse::new(error_codes::SESSION_NOT_FOUND, self.to_string())
            }
            SessionError::CurrentSession => {
                ErrorResponse::new(error_codes::BAD_REQUEST, self.to_string())
            }
            SessionError::TokenGenerationFailed => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, self.to_string())
            }
        }
    }
}
