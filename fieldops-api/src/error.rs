/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`; the error converts into an
/// HTTP response with the right status code and a JSON body of the shape
/// `{"message": "..."}`. No variant ever leaks internal identifiers,
/// stack traces, or storage-engine error text to the caller. Internal
/// detail goes to the log; the client gets a generic message.
///
/// # Example
///
/// ```ignore
/// async fn handler() -> ApiResult<Json<Task>> {
///     let task = Task::find_owned(&pool, id, user_id)
///         .await?
///         .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
///     Ok(Json(task))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fieldops_shared::auth::token::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Fixed body for permission denials.
pub const FORBIDDEN_MESSAGE: &str = "Forbidden: Not allowed to perform this action";

/// Fixed body for requests with absent required fields.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing body properties";

/// Fixed body for unexpected failures in task flows.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): state conflicts and generic auth-flow failures
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403): always the fixed denial message
    Forbidden,

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422): required fields absent
    MissingFields,

    /// Unprocessable entity (422): a present field failed validation
    Validation(String),

    /// Internal server error (500): detail is logged, never returned
    Internal(String),
}

/// Error response format: every error body carries exactly one field.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::MissingFields => write!(f, "Missing required fields"),
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::MissingFields => (
                StatusCode::UNPROCESSABLE_ENTITY,
                MISSING_FIELDS_MESSAGE.to_string(),
            ),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => {
                // log the detail, return the generic body
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Storage errors in task flows surface as generic 500s.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("database error: {}", err))
    }
}

/// Token errors keep their fixed caller-safe messages: signing failures
/// are 400 (the auth flows' convention), verification failures are 401.
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Sign => ApiError::BadRequest(err.to_string()),
            TokenError::Invalid => ApiError::Unauthorized(err.to_string()),
        }
    }
}
