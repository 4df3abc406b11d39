//! # Error Handling
//!
//! A single error type shared by the record service and the HTTP layer:
//! - maps each failure class to an HTTP status code
//! - sends sanitized, user-friendly error messages
//! - logs detailed internal errors via `tracing`
//!
//! Database errors are never forwarded to clients verbatim. The original
//! `DbErr` is carried inside [`ServiceError::Database`] for callers that
//! need it, logged server-side, and replaced by a generic message on the
//! wire.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

/// Failure classes of a record service.
///
/// `Configuration` is fatal and surfaces when a service is constructed,
/// never per-request. `NotFound` and `Validation` are normal request
/// outcomes. Everything the database reports (other than a missing
/// record or a unique-constraint violation) lands in `Database`,
/// unmodified and unretried.
#[derive(Debug)]
pub enum ServiceError {
    /// The record type's key metadata is unusable (no primary-key
    /// column, or a composite key). 500.
    Configuration {
        message: String,
    },

    /// The target of a fetch or update matched zero records. 404.
    NotFound {
        resource: String,
        id: Option<String>,
    },

    /// Malformed request input: unknown filter field, unknown relation
    /// name, a `null` for a required field, unparseable query
    /// parameters. 422.
    Validation {
        message: String,
    },

    /// Unique-constraint violation reported by the engine. 409.
    Conflict {
        message: String,
    },

    /// Any other persistence-engine failure. 500; details logged, not
    /// exposed.
    Database {
        message: String,
        internal: DbErr,
    },
}

impl ServiceError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Configuration { .. } | Self::Database { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} with ID '{id}' not found")
                } else {
                    format!("{resource} not found")
                }
            }
            Self::Validation { message } | Self::Conflict { message } => message.clone(),
            // Configuration details name internal types; keep them off the wire.
            Self::Configuration { .. } => "Service misconfigured".to_string(),
            Self::Database { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Configuration { message } => {
                tracing::error!(details = %message, "Record service misconfigured");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "Request failed"
                );
            }
        }
    }
}

/// Error body sent to clients (sanitized).
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ServiceError {}

/// Conversion rules:
/// - `DbErr::RecordNotFound` → 404
/// - unique-constraint violations → 409
/// - everything else → 500, original error preserved internally
impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Record");
            return Self::NotFound {
                resource: resource.to_string(),
                id: None,
            };
        }
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::Conflict {
                message: format!("Duplicate record: {detail}"),
            };
        }
        Self::database(err)
    }
}
