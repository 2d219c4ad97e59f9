pub mod generate;
pub mod vendors;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::generator::GenerateError;

/// Error response - {"error": "message"} JSON body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

/// Map the pipeline taxonomy onto HTTP statuses: input problems are 400,
/// credential problems 401, throttling 429, upstream inference failures 502,
/// template and I/O failures 500.
impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        let status = match &err {
            GenerateError::UnknownVendor(_) | GenerateError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            GenerateError::Credential(_) => StatusCode::UNAUTHORIZED,
            GenerateError::Throttled(_) => StatusCode::TOO_MANY_REQUESTS,
            GenerateError::Inference(_) => StatusCode::BAD_GATEWAY,
            GenerateError::Render(_) | GenerateError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Healthcheck endpoint — returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "confsmith",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
