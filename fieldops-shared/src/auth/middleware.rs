/// Bearer-token access gate
///
/// Every protected route runs through this gate before its handler. The
/// gate reads the `Authorization` header, verifies the bearer token, and
/// produces an explicit [`AuthContext`] (identity plus the role's
/// permission string parsed once into a typed set) which the router layer
/// inserts as a request extension for downstream handlers.
///
/// The gate does not decide *which* permission an operation needs; that
/// check happens per-operation against the attached permission set.
///
/// # Responses
///
/// - Missing or non-`Bearer` header → 401 with a fixed message
/// - Token verification failure → 401 with the opaque `Invalid token`
///   message, regardless of the underlying cause

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use super::permissions::{Permission, PermissionSet};
use super::token::TokenIssuer;

/// Authenticated request context produced by the access gate.
///
/// Handlers receive this via Axum's `Extension` extractor instead of
/// re-reading headers or re-splitting permission strings.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: Uuid,

    /// Display name from the token claims
    pub name: String,

    /// Email from the token claims
    pub email: String,

    /// Role name from the token claims
    pub role: String,

    /// The caller's permission set, parsed and validated once
    pub permissions: PermissionSet,
}

impl AuthContext {
    /// Checks whether the caller holds the given permission.
    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.allows(permission)
    }
}

/// Error type for the access gate. Both variants render as 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Authorization header absent or not a bearer token
    #[error("Authorization header is required and must be in the format 'Bearer <token>'")]
    MissingBearer,

    /// Token failed verification (opaque)
    #[error("Invalid token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the bearer token from the `Authorization` header, if present
/// and well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Runs the access gate against a request's headers.
///
/// # Errors
///
/// - [`AuthError::MissingBearer`] when no bearer token is present
/// - [`AuthError::InvalidToken`] when verification fails or the token's
///   permission string falls outside the closed vocabulary
pub fn authenticate(issuer: &TokenIssuer, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingBearer)?;

    let claims = issuer.verify(token).map_err(|_| AuthError::InvalidToken)?;

    // A signed token with a permission string outside the vocabulary can
    // only come from a signer we do not trust with one
    let permissions = PermissionSet::parse(&claims.role.permissions)
        .map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthContext {
        user_id: claims.sub,
        name: claims.name,
        email: claims.email,
        role: claims.role.name,
        permissions,
    })
}
