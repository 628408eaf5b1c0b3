//! Centralized error handling with proper HTTP status codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_network::NetworkError;
use ledger_orchestrator::QueryError;
use serde_json::json;

/// API Result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types with appropriate HTTP status codes
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Upstream rejected request: {0}")]
    BadGateway(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type as string
    pub fn error_type(&self) -> &str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::BadGateway(_) => "bad_gateway",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidHash(msg) => ApiError::BadRequest(format!("invalid block hash: {}", msg)),
            QueryError::Identity(e) => ApiError::Unauthorized(e.to_string()),
            QueryError::ChannelNotFound(_) => ApiError::InternalError(err.to_string()),
            QueryError::NoPeers(_) => ApiError::ServiceUnavailable(err.to_string()),
            QueryError::Rejected { .. } => ApiError::BadGateway(err.to_string()),
            QueryError::Network(e) => e.into(),
        }
    }
}

impl From<NetworkError> for ApiError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::RequestRejected { status: 404, .. } => ApiError::NotFound(err.to_string()),
            NetworkError::RequestRejected { .. } | NetworkError::MalformedResponse { .. } => {
                ApiError::BadGateway(err.to_string())
            }
            NetworkError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            NetworkError::ChannelNotFound(_) | NetworkError::Client(_) => ApiError::InternalError(err.to_string()),
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. } => {
                ApiError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

// Convert anyhow errors to API errors
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
