use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Policy-level failures.
///
/// Denied and validation variants display as the bare human-readable reason
/// so UI code can render them directly; they are expected outcomes, not
/// exceptional ones.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("{reason}")]
    PermissionDenied { reason: String },

    #[error("{reason}")]
    Validation { reason: String },

    #[error("{service} request failed: {message}")]
    Dependency {
        service: &'static str,
        message: String,
    },
}

impl PolicyError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn dependency(
        service: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Dependency {
            service,
            message: source.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("JSON processing error")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Internal server error: {context}")]
    Internal { context: String },
}

impl AppError {
    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Policy(PolicyError::PermissionDenied { .. }) => StatusCode::FORBIDDEN,
            AppError::Policy(PolicyError::Validation { .. }) => StatusCode::BAD_REQUEST,
            AppError::Policy(PolicyError::Dependency { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Json { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Policy(PolicyError::PermissionDenied { .. }) => "permission_denied",
            AppError::Policy(PolicyError::Validation { .. }) => "validation_error",
            AppError::Policy(PolicyError::Dependency { .. }) => "dependency_failure",
            AppError::Json { .. } => "json_error",
            AppError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();
        let error_message = self.to_string();

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": error_message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}
