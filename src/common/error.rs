// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Payload rejected by `validator`
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    // Domain rule broken (negative amount, unknown payment method...)
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // Corrupt numbering state. Never recovered silently.
    #[error("Malformed document number: {0}")]
    Format(String),

    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Every field error is returned so the client can highlight them.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "One or more fields are invalid.",
                "details": details,
            }));
            return (status, body).into_response();
        }

        let message = match &self {
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Conflict(_)
            | AppError::EmailAlreadyExists
            | AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::UserNotFound => self.to_string(),

            e => {
                tracing::error!(error = %e, "Internal server error");
                "An unexpected error occurred.".to_string()
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Turns Postgres constraint violations into domain errors, anything else
/// stays a database error.
pub fn map_constraint_violation(e: sqlx::Error, conflict_message: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            return AppError::Conflict(conflict_message.to_string());
        }
    }
    AppError::DatabaseError(e)
}
