/// Authentication and authorization utilities
///
/// This module provides the security primitives for FieldOps:
///
/// # Modules
///
/// - [`hasher`]: salted keyed-hash credential storage and verification
/// - [`token`]: signed, expiring identity tokens (HS256)
/// - [`permissions`]: the closed permission vocabulary and typed permission sets
/// - [`middleware`]: the bearer-token access gate run before protected routes
///
/// # Example
///
/// ```no_run
/// use fieldops_shared::auth::hasher::{random_salt, CredentialHasher};
/// use fieldops_shared::auth::permissions::{Permission, PermissionSet};
///
/// let hasher = CredentialHasher::new("process-wide-secret");
/// let salt = random_salt();
/// let digest = hasher.digest(&salt, "user-password");
/// assert_eq!(digest, hasher.digest(&salt, "user-password"));
///
/// let set = PermissionSet::parse("create_task;read_my_tasks").unwrap();
/// assert!(set.allows(Permission::CreateTask));
/// ```

pub mod hasher;
pub mod middleware;
pub mod permissions;
pub mod token;
