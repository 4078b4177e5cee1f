use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors: anything that stops the dataset from being built
// ---------------------------------------------------------------------------

/// Typed failures raised by the loader.  They travel inside `anyhow::Error`
/// with added context, so callers that care can `downcast_ref` them.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: '{value}' is not a month (expected YYYY-MM)")]
    InvalidMonth { row: usize, value: String },

    #[error("row {row}: column '{column}' value '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Query errors: malformed request parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("invalid value '{value}' for parameter '{param}'")]
    InvalidValue { param: &'static str, value: String },

    #[error("invalid month '{value}' for parameter '{param}' (expected YYYY-MM)")]
    InvalidMonth { param: &'static str, value: String },

    #[error("n must be between 1 and {max}, got {got}")]
    LimitOutOfRange { got: usize, max: usize },

    #[error("date range is inverted: {from} is after {to}")]
    InvertedRange { from: String, to: String },
}

impl ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
