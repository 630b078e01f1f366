use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use std::fmt;

use crate::criteria::CriteriaError;
use crate::query::PageableError;

/// SQLSTATE for a foreign-key violation in PostgreSQL.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// A rejected request tied to an entity, e.g. creating with an id.
    BadRequestAlert {
        message: String,
        entity_name: &'static str,
        error_key: &'static str,
    },
    NotFound(String),
    Conflict(String),
    DatabaseError(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_key: Option<&'a str>,
}

impl AppError {
    pub fn bad_request_alert(message: impl Into<String>, entity_name: &'static str, error_key: &'static str) -> Self {
        AppError::BadRequestAlert {
            message: message.into(),
            entity_name,
            error_key,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::BadRequestAlert { message, .. } => write!(f, "Bad Request: {}", message),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::BadRequestAlert { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::BadRequestAlert {
                message,
                entity_name,
                error_key,
            } => ErrorResponse {
                error: message,
                entity_name: Some(*entity_name),
                error_key: Some(*error_key),
            },
            AppError::DatabaseError(msg) => {
                error!("{}", self);
                ErrorResponse {
                    error: msg,
                    entity_name: None,
                    error_key: None,
                }
            }
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => ErrorResponse {
                error: msg,
                entity_name: None,
                error_key: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return AppError::BadRequest(format!("Referenced entity does not exist: {}", db_err.message()));
            }
        }
        AppError::DatabaseError(err.to_string())
    }
}

impl From<CriteriaError> for AppError {
    fn from(err: CriteriaError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<PageableError> for AppError {
    fn from(err: PageableError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
