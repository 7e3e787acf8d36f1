/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - create an account and receive a token
/// - `POST /auth/login` - exchange credentials for a token
///
/// Both respond with the outward-facing user record plus a `token` field.
/// The internal `role_id` foreign key and the credential record never
/// appear in a response.
///
/// Unexpected failures in these flows surface as a generic 400, not the
/// 500 the task flows use; callers cannot tell a storage failure from a
/// rejected request here, and that asymmetry is deliberate.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use fieldops_shared::auth::hasher::random_salt;
use fieldops_shared::models::{
    role::Role,
    user::{CreateUser, User, UserProfile},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request. All four fields are required; presence is checked
/// before format so an empty body reads as one 422, not four.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Password (any non-empty string; hashed, never stored)
    pub password: Option<String>,

    /// Display name
    pub username: Option<String>,

    /// Name of an existing role (e.g. "Technician")
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,

    /// Password
    pub password: Option<String>,
}

/// Response for both auth endpoints: the user profile with the token
/// flattened alongside it.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Outward-facing user record
    #[serde(flatten)]
    pub user: UserProfile,

    /// Signed identity token
    pub token: String,
}

/// Auth flows report internal failures as a generic 400.
fn storage_failure(err: sqlx::Error) -> ApiError {
    tracing::error!(error = %err, "auth flow storage failure");
    ApiError::BadRequest("Bad request".to_string())
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "a@x.com",
///   "password": "pw1",
///   "username": "A",
///   "role": "Technician"
/// }
/// ```
///
/// # Errors
///
/// - `422`: a required field is absent, or the email is malformed
/// - `400 User already exists`: duplicate email
/// - `400 Error creating jwt`: signing failed after the user persisted;
///   the account exists and the caller recovers via login
/// - `400`: any other failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password), Some(username), Some(role_name)) = (
        req.email.clone(),
        req.password.clone(),
        req.username.clone(),
        req.role.clone(),
    ) else {
        return Err(ApiError::MissingFields);
    };

    req.validate()
        .map_err(|_| ApiError::Validation("Invalid email format".to_string()))?;

    // Check-then-create: racy without a transaction, backstopped by the
    // unique index on users.email
    if User::find_by_email(&state.db, &email)
        .await
        .map_err(storage_failure)?
        .is_some()
    {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let Some(role) = Role::find_by_name(&state.db, &role_name)
        .await
        .map_err(storage_failure)?
    else {
        tracing::warn!(role = %role_name, "registration referenced an unknown role");
        return Err(ApiError::BadRequest("Bad request".to_string()));
    };

    let salt = random_salt();
    let password_digest = state.hasher.digest(&salt, &password);

    let user = User::create_with_credential(
        &state.db,
        CreateUser {
            name: username,
            email,
            role_id: role.id,
            password_digest,
            salt,
        },
    )
    .await
    .map_err(storage_failure)?;

    tracing::info!(user_id = %user.id, role = %role.name, "user registered");

    let profile = user.profile(role.summary());

    // The user row is already persisted; if signing fails here the caller
    // recovers by logging in, not by registering again
    let token = state.tokens.sign(&profile)?;

    Ok(Json(AuthResponse {
        user: profile,
        token,
    }))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "a@x.com",
///   "password": "pw1"
/// }
/// ```
///
/// # Errors
///
/// - `400`: a field is missing, the user is unknown, or anything else
///   went wrong, indistinguishable by design
/// - `401`: the password digest does not match
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::BadRequest("Bad request".to_string()));
    };

    let Some(record) = User::find_by_email_with_auth(&state.db, &email)
        .await
        .map_err(storage_failure)?
    else {
        return Err(ApiError::BadRequest("Bad request".to_string()));
    };

    let expected = state.hasher.digest(&record.salt, &password);
    if expected != record.password_digest {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    }

    let profile = record.user.profile(record.role.summary());
    let token = state.tokens.sign(&profile)?;

    Ok(Json(AuthResponse {
        user: profile,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_shared::models::role::RoleSummary;
    use uuid::Uuid;

    #[test]
    fn test_register_request_accepts_partial_bodies() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();

        assert_eq!(req.email.as_deref(), Some("a@x.com"));
        assert!(req.password.is_none());
        assert!(req.username.is_none());
        assert!(req.role.is_none());
    }

    #[test]
    fn test_register_request_validates_email_format() {
        let good: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw1","username":"A","role":"Technician"}"#)
                .unwrap();
        assert!(good.validate().is_ok());

        let bad: RegisterRequest =
            serde_json::from_str(r#"{"email":"not-an-email","password":"pw1","username":"A","role":"Technician"}"#)
                .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_register_request_skips_validation_when_email_absent() {
        // presence is a separate 422; absent email is not a format error
        let req: RegisterRequest = serde_json::from_str(r#"{"password":"pw1"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_auth_response_flattens_profile_and_strips_role_id() {
        let response = AuthResponse {
            user: UserProfile {
                id: Uuid::new_v4(),
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                role: RoleSummary {
                    name: "Technician".to_string(),
                    permissions: "create_task;read_my_tasks".to_string(),
                },
            },
            token: "signed.token.value".to_string(),
        };

        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["token"], "signed.token.value");
        assert_eq!(value["role"]["name"], "Technician");
        assert!(value.get("role_id").is_none());
        assert!(value.get("user").is_none());
    }
}
