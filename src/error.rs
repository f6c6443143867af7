use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::views;

/// Everything a handler can fail with, mapped onto an HTTP status.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("couldn't get db connection from pool: {0}")]
    Pool(#[from] PoolError),

    #[error("error blocking thread: {0}")]
    Blocking(#[from] BlockingError),

    #[error("missing form field {field}")]
    MissingField { field: &'static str },

    #[error("malformed value for {field}: {value:?} ({reason})")]
    MalformedField {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(DatabaseError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Database(DatabaseError::MissingReference { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Database(DatabaseError::StillReferenced { .. }) => StatusCode::CONFLICT,
            AppError::MissingField { .. } => StatusCode::BAD_REQUEST,
            // Unparseable form values are not validated up front; they abort
            // the request like any other unexpected failure.
            AppError::MalformedField { .. }
            | AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "The server encountered an internal error.".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(views::error_page(status, &message))
    }
}
