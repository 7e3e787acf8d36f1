/// User model and database operations
///
/// A user owns exactly one auth credential record (same lifecycle, created
/// together in one transaction) and references one shared role. The
/// credential is only ever loaded for digest comparison during login and
/// never appears in an outbound response; the outward-facing view of a
/// user is [`UserProfile`], which also strips the internal `role_id`
/// foreign key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     role_id UUID NOT NULL REFERENCES roles(id)
/// );
///
/// CREATE TABLE auth_credentials (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     password VARCHAR(64) NOT NULL,
///     salt TEXT NOT NULL
/// );
/// ```
///
/// The unique index on `users.email` is the storage-level backstop for the
/// (non-transactional) duplicate-email check performed at registration.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::role::{Role, RoleSummary};

/// User model representing an account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Role reference (internal, stripped from outward responses)
    pub role_id: Uuid,
}

/// Input for creating a user together with its credential record.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role reference
    pub role_id: Uuid,

    /// Keyed salted digest of the password (never the plaintext)
    pub password_digest: String,

    /// Per-user salt, base64-encoded
    pub salt: String,
}

/// A user loaded together with its credential record and role, used only
/// by the login flow for digest comparison.
#[derive(Debug, Clone)]
pub struct UserWithAuth {
    /// The account
    pub user: User,

    /// Stored per-user salt
    pub salt: String,

    /// Stored password digest
    pub password_digest: String,

    /// The referenced role
    pub role: Role,
}

/// The outward-facing view of a user: account fields plus the role
/// summary. No credential fields, no `role_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user id
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role name and permission string
    pub role: RoleSummary,
}

/// Flat row shape for the user/credential/role join.
#[derive(sqlx::FromRow)]
struct UserAuthRow {
    id: Uuid,
    name: String,
    email: String,
    role_id: Uuid,
    salt: String,
    password: String,
    role_name: String,
    role_permissions: String,
}

impl User {
    /// Creates a user and its auth credential in one transaction.
    ///
    /// The credential record shares the user's lifecycle and is never
    /// created or updated through any other path.
    ///
    /// # Errors
    ///
    /// Returns an error if the email collides with the unique index or if
    /// either insert fails; nothing is persisted in that case.
    pub async fn create_with_credential(
        pool: &PgPool,
        data: CreateUser,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, role_id
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.role_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO auth_credentials (user_id, password, salt)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(data.password_digest)
        .bind(data.salt)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Finds a user by email address.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role_id
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email including its credential record and role.
    ///
    /// This is the login lookup; the credential fields it returns must
    /// never leave the authentication flow.
    pub async fn find_by_email_with_auth(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserWithAuth>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r#"
            SELECT u.id, u.name, u.email, u.role_id,
                   a.salt, a.password,
                   r.name AS role_name, r.permissions AS role_permissions
            FROM users u
            JOIN auth_credentials a ON a.user_id = u.id
            JOIN roles r ON r.id = u.role_id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|row| UserWithAuth {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                role_id: row.role_id,
            },
            salt: row.salt,
            password_digest: row.password,
            role: Role {
                id: row.role_id,
                name: row.role_name,
                permissions: row.role_permissions,
            },
        }))
    }

    /// Builds the outward-facing profile for this user.
    pub fn profile(&self, role: RoleSummary) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        let user = User {
            id: Uuid::new_v4(),
            name: "technician".to_string(),
            email: "technician@mail.com".to_string(),
            role_id: Uuid::new_v4(),
        };
        user.profile(RoleSummary {
            name: "Technician".to_string(),
            permissions: "create_task;read_my_tasks".to_string(),
        })
    }

    #[test]
    fn test_profile_strips_role_id() {
        let value = serde_json::to_value(profile()).unwrap();

        assert!(value.get("role_id").is_none());
        assert_eq!(value["role"]["name"], "Technician");
    }

    #[test]
    fn test_profile_carries_no_credential_fields() {
        let value = serde_json::to_value(profile()).unwrap();

        assert!(value.get("password").is_none());
        assert!(value.get("salt").is_none());
        assert!(value.get("auth").is_none());
    }

    #[test]
    fn test_profile_keeps_identity_fields() {
        let value = serde_json::to_value(profile()).unwrap();

        assert_eq!(value["name"], "technician");
        assert_eq!(value["email"], "technician@mail.com");
        assert!(value.get("id").is_some());
    }
}
