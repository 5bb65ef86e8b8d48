use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether 500 responses may carry the underlying error text.
/// Set once at startup from the configured environment.
static EXPOSE_INTERNAL_DETAILS: OnceCell<bool> = OnceCell::new();

pub fn expose_internal_details(enabled: bool) {
    if EXPOSE_INTERNAL_DETAILS.set(enabled).is_err() {
        tracing::warn!("Error posture already installed, ignoring");
    }
}

fn internal_details_exposed() -> bool {
    EXPOSE_INTERNAL_DETAILS.get().copied().unwrap_or(false)
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Status must be either 'approved' or 'rejected'")]
    InvalidStatus,

    #[error("Admin comment is required")]
    MissingComment,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_)
            | AppError::MissingFields(_)
            | AppError::InvalidStatus
            | AppError::MissingComment => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller. Storage and internal failures are
    /// reduced to a generic text unless running in development.
    fn public_message(&self) -> String {
        let generic = match self {
            AppError::Database(_) => "Database error",
            AppError::Internal(_) => "Internal server error",
            AppError::Json(_) => "JSON error",
            _ => return self.to_string(),
        };

        if internal_details_exposed() {
            self.to_string()
        } else {
            generic.to_string()
        }
    }
}

// Convert AppError to an HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(?self);
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.public_message(),
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

pub type Result<T> = std::result::Result<T, AppError>;
