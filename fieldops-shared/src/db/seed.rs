/// Default roles and accounts
///
/// Seeds the two built-in roles and their demo accounts so a fresh
/// deployment is usable immediately. Seeding is an idempotent upsert:
/// existing rows are left untouched, so restarting the API never resets
/// passwords or permissions.
///
/// | Account               | Password  | Role       |
/// |-----------------------|-----------|------------|
/// | technician@mail.com   | `tech123` | Technician |
/// | manager@mail.com      | `mana123` | Manager    |

use sqlx::PgPool;
use tracing::info;

use crate::auth::hasher::{random_salt, CredentialHasher};
use crate::models::role::Role;
use crate::models::user::{CreateUser, User};

/// A role created on first start.
pub struct DefaultRole {
    /// Role name
    pub name: &'static str,

    /// `;`-delimited permission tokens
    pub permissions: &'static str,
}

/// The built-in role catalog.
pub const DEFAULT_ROLES: [DefaultRole; 2] = [
    DefaultRole {
        name: "Technician",
        permissions: "create_task;read_task;read_my_tasks;update_task",
    },
    DefaultRole {
        name: "Manager",
        permissions: "read_all_tasks;delete_task",
    },
];

struct DefaultUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: &'static str,
}

const DEFAULT_USERS: [DefaultUser; 2] = [
    DefaultUser {
        name: "technician",
        email: "technician@mail.com",
        password: "tech123",
        role: "Technician",
    },
    DefaultUser {
        name: "manager",
        email: "manager@mail.com",
        password: "mana123",
        role: "Manager",
    },
];

/// Upserts the default roles and accounts.
///
/// # Errors
///
/// Returns an error if any lookup or insert fails.
pub async fn seed_defaults(pool: &PgPool, hasher: &CredentialHasher) -> Result<(), sqlx::Error> {
    for role in &DEFAULT_ROLES {
        if Role::find_by_name(pool, role.name).await?.is_none() {
            Role::create(pool, role.name, role.permissions).await?;
            info!(role = role.name, "seeded role");
        }
    }

    for account in &DEFAULT_USERS {
        if User::find_by_email(pool, account.email).await?.is_some() {
            continue;
        }

        let role = Role::find_by_name(pool, account.role)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let salt = random_salt();
        let password_digest = hasher.digest(&salt, account.password);

        User::create_with_credential(
            pool,
            CreateUser {
                name: account.name.to_string(),
                email: account.email.to_string(),
                role_id: role.id,
                password_digest,
                salt,
            },
        )
        .await?;

        info!(email = account.email, role = account.role, "seeded account");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{Permission, PermissionSet};

    #[test]
    fn test_default_role_permissions_are_in_vocabulary() {
        for role in &DEFAULT_ROLES {
            assert!(
                PermissionSet::parse(role.permissions).is_ok(),
                "role {} carries an unknown permission",
                role.name
            );
        }
    }

    #[test]
    fn test_technician_cannot_delete_or_read_all() {
        let set = PermissionSet::parse(DEFAULT_ROLES[0].permissions).unwrap();

        assert!(set.allows(Permission::CreateTask));
        assert!(set.allows(Permission::UpdateTask));
        assert!(!set.allows(Permission::DeleteTask));
        assert!(!set.allows(Permission::ReadAllTasks));
    }

    #[test]
    fn test_manager_cannot_touch_own_task_flows() {
        let set = PermissionSet::parse(DEFAULT_ROLES[1].permissions).unwrap();

        assert!(set.allows(Permission::DeleteTask));
        assert!(set.allows(Permission::ReadAllTasks));
        assert!(!set.allows(Permission::CreateTask));
        assert!(!set.allows(Permission::ReadMyTasks));
    }

    #[test]
    fn test_every_default_user_references_a_default_role() {
        for account in &DEFAULT_USERS {
            assert!(DEFAULT_ROLES.iter().any(|role| role.name == account.role));
        }
    }
}
