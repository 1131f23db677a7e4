//! Common error types used across the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common error type for collaborator implementations
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CommonError {
    #[error("Authorization failed: {message}")]
    Authorization { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CommonError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            CommonError::Authorization { .. } => 403,
            CommonError::InvalidInput { .. } => 400,
            CommonError::NotFound { .. } => 404,
            CommonError::ServiceUnavailable { .. } => 503,
            CommonError::Internal { .. } => 500,
        }
    }
}
