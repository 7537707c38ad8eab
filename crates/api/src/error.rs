//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{Committed, CompanyError};
use serde_json::{Value, json};

const INTERNAL_MESSAGE: &str = "the server encountered a problem and could not process your request";
const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be read.
    BadRequest(String),
    /// Error from the company service.
    Company(CompanyError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Company(err) => company_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn company_error_to_response(err: CompanyError) -> (StatusCode, Value) {
    let status = status_for(&err);
    let body = match err {
        CompanyError::NotFound(_) => json!({ "error": NOT_FOUND_MESSAGE }),
        CompanyError::Internal(msg) => {
            tracing::error!(error = %msg, "internal server error");
            json!({ "error": INTERNAL_MESSAGE })
        }
        CompanyError::NotificationFailed {
            ref committed,
            ref source,
            ..
        } => {
            let mut body = json!({
                "error": format!("change was stored but could not be announced: {source}"),
                "stored": true,
                "notified": false,
            });
            match committed {
                Committed::Company(company) => body["company"] = json!(company),
                Committed::Deleted(id) => body["id"] = json!(id),
            }
            body
        }
        other => json!({ "error": other.to_string() }),
    };
    (status, body)
}

/// HTTP status for each service error.
pub fn status_for(err: &CompanyError) -> StatusCode {
    match err {
        CompanyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        CompanyError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        CompanyError::NotFound(_) => StatusCode::NOT_FOUND,
        CompanyError::ConstraintViolation(_) => StatusCode::CONFLICT,
        CompanyError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CompanyError::NotificationFailed { .. } => StatusCode::BAD_GATEWAY,
        CompanyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CompanyError> for ApiError {
    fn from(err: CompanyError) -> Self {
        ApiError::Company(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
