/// Role model and database operations
///
/// A role is a named bundle of permission tokens. Many users reference one
/// role; roles are shared, not owned. Permissions are stored as a single
/// `;`-delimited string and parsed into a typed set at the boundary where
/// the role leaves storage.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL UNIQUE,
///     permissions TEXT NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::permissions::{PermissionSet, UnknownPermission};

/// Role model representing a named permission bundle.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    /// Unique role id
    pub id: Uuid,

    /// Unique role name (e.g. "Technician", "Manager")
    pub name: String,

    /// `;`-delimited permission tokens from the closed vocabulary
    pub permissions: String,
}

/// The outward-facing view of a role, embedded in user profiles and
/// token claims. Carries no storage id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    /// Role name
    pub name: String,

    /// `;`-delimited permission tokens
    pub permissions: String,
}

impl Role {
    /// Creates a role.
    pub async fn create(pool: &PgPool, name: &str, permissions: &str) -> Result<Self, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, permissions)
            VALUES ($1, $2)
            RETURNING id, name, permissions
            "#,
        )
        .bind(name)
        .bind(permissions)
        .fetch_one(pool)
        .await?;

        Ok(role)
    }

    /// Finds a role by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, permissions
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Parses the stored permission string into a typed set.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPermission`] if the stored string contains a token
    /// outside the closed vocabulary.
    pub fn permission_set(&self) -> Result<PermissionSet, UnknownPermission> {
        PermissionSet::parse(&self.permissions)
    }

    /// The outward-facing view of this role.
    pub fn summary(&self) -> RoleSummary {
        RoleSummary {
            name: self.name.clone(),
            permissions: self.permissions.clone(),
        }
    }
}
