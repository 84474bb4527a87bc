//! Centralized error handling.
//!
//! Every layer raises an [`AppError`] by kind; the single [`IntoResponse`]
//! impl below renders the JSON error envelope returned for all non-2xx
//! responses.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Field name (JSON property path) to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message used for every validation failure.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Authenticated identity is not mapped to a local user: {0}")]
    IdentityUnmapped(String),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("Data integrity violation: {0}")]
    IntegrityViolation(String),

    // Validation
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[source] DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request timed out")]
    Timeout,

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error envelope returned for every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// ISO-8601 instant
    #[schema(example = "2025-08-20T10:15:30.123Z")]
    pub timestamp: String,
    /// HTTP status code
    #[schema(example = 404)]
    pub status: u16,
    /// Reason phrase
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human friendly message
    #[schema(example = "Project not found")]
    pub message: String,
    /// Field level validation errors: field -> messages
    pub field_errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
            field_errors,
        }
    }
}

impl AppError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::IdentityUnmapped(_) | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IntegrityViolation(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the envelope (hides internal details)
    fn envelope(&self) -> ErrorResponse {
        let status = self.status();
        match self {
            AppError::Validation(fields) => {
                ErrorResponse::new(status, VALIDATION_FAILED, Some(fields.clone()))
            }
            AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                ErrorResponse::new(status, msg.clone(), None)
            }
            AppError::IntegrityViolation(detail) => {
                tracing::warn!(detail = %detail, "integrity violation");
                let field_errors = detail.to_lowercase().contains("email").then(|| {
                    FieldErrors::from([("email".to_string(), vec!["email already exists".to_string()])])
                });
                ErrorResponse::new(status, "Data integrity violation", field_errors)
            }
            AppError::IdentityUnmapped(detail) => {
                tracing::debug!(detail = %detail, "identity unmapped");
                ErrorResponse::new(status, AppError::Unauthorized.to_string(), None)
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                ErrorResponse::new(status, "Invalid or expired token", None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ErrorResponse::new(status, "Unexpected error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::new(status, "Unexpected error", None)
            }
            AppError::Unauthorized
            | AppError::Forbidden
            | AppError::MethodNotAllowed
            | AppError::Timeout => {
                ErrorResponse::new(status, self.to_string(), None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Unique and foreign-key violations are surfaced as their own kind.
impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail))
            | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                AppError::IntegrityViolation(detail)
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let key = json_property(field);
            let messages = fields.entry(key).or_default();
            messages.extend(errs.iter().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", json_property(field)))
            }));
        }
        AppError::Validation(fields)
    }
}

/// Rust field names are snake_case; the wire format is camelCase.
fn json_property(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, message: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, message: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(message))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::from([(field.into(), vec![msg.into()])]))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, AppError::IntegrityViolation(_))
    }
}
