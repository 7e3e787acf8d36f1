/// Permission vocabulary and typed permission sets
///
/// Roles store their grants as a single `;`-delimited string (e.g.
/// `"create_task;read_my_tasks"`). That encoding crosses the storage and
/// token boundaries, but it is parsed exactly once, at the access gate,
/// into a [`PermissionSet`] validated against the closed vocabulary below.
/// Downstream code only ever sees the typed set and never re-splits
/// strings.
///
/// # Vocabulary
///
/// | Token            | Grants                                  |
/// |------------------|-----------------------------------------|
/// | `create_task`    | create a task owned by the caller       |
/// | `read_task`      | read a single task                      |
/// | `read_my_tasks`  | list the caller's own tasks             |
/// | `update_task`    | mark one of the caller's tasks performed|
/// | `delete_task`    | delete any task by id                   |
/// | `read_all_tasks` | list every task with owner details      |
///
/// # Example
///
/// ```
/// use fieldops_shared::auth::permissions::{Permission, PermissionSet};
///
/// let set = PermissionSet::parse("create_task;read_my_tasks").unwrap();
/// assert!(set.allows(Permission::CreateTask));
/// assert!(!set.allows(Permission::DeleteTask));
/// ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Delimiter used in stored permission strings.
pub const PERMISSION_DELIMITER: char = ';';

/// A single permission token from the closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create a task owned by the caller
    CreateTask,

    /// Read a single task
    ReadTask,

    /// List the caller's own tasks
    ReadMyTasks,

    /// Mark one of the caller's tasks performed
    UpdateTask,

    /// Delete any task by id
    DeleteTask,

    /// List every task regardless of owner
    ReadAllTasks,
}

impl Permission {
    /// Every permission in the vocabulary.
    pub const ALL: [Permission; 6] = [
        Permission::CreateTask,
        Permission::ReadTask,
        Permission::ReadMyTasks,
        Permission::UpdateTask,
        Permission::DeleteTask,
        Permission::ReadAllTasks,
    ];

    /// The wire/storage spelling of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateTask => "create_task",
            Permission::ReadTask => "read_task",
            Permission::ReadMyTasks => "read_my_tasks",
            Permission::UpdateTask => "update_task",
            Permission::DeleteTask => "delete_task",
            Permission::ReadAllTasks => "read_all_tasks",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a permission string contains a token outside the
/// closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission token: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// An unordered set of permissions held by a caller.
///
/// Membership is an exact match on one permission token; there is no
/// hierarchy or implication between permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    inner: HashSet<Permission>,
}

impl PermissionSet {
    /// Parses a `;`-delimited permission string into a typed set.
    ///
    /// Empty segments are ignored, so trailing delimiters are harmless.
    /// Any token outside the closed vocabulary is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPermission`] for the first unrecognized token.
    pub fn parse(raw: &str) -> Result<Self, UnknownPermission> {
        raw.split(PERMISSION_DELIMITER)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Permission::from_str)
            .collect()
    }

    /// Checks whether the set grants the given permission.
    pub fn allows(&self, permission: Permission) -> bool {
        self.inner.contains(&permission)
    }

    /// Number of distinct permissions in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when the set grants nothing.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_spelling_roundtrip() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let err = "drop_table".parse::<Permission>().unwrap_err();
        assert_eq!(err, UnknownPermission("drop_table".to_string()));
    }

    #[test]
    fn test_parse_delimited_string() {
        let set = PermissionSet::parse("create_task;read_task;read_my_tasks;update_task").unwrap();

        assert_eq!(set.len(), 4);
        assert!(set.allows(Permission::CreateTask));
        assert!(set.allows(Permission::ReadTask));
        assert!(set.allows(Permission::ReadMyTasks));
        assert!(set.allows(Permission::UpdateTask));
        assert!(!set.allows(Permission::DeleteTask));
        assert!(!set.allows(Permission::ReadAllTasks));
    }

    #[test]
    fn test_parse_ignores_empty_segments() {
        let set = PermissionSet::parse("read_all_tasks;;delete_task;").unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.allows(Permission::ReadAllTasks));
        assert!(set.allows(Permission::DeleteTask));
    }

    #[test]
    fn test_parse_empty_string_is_empty_set() {
        let set = PermissionSet::parse("").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        let err = PermissionSet::parse("create_task;launch_rockets").unwrap_err();
        assert_eq!(err, UnknownPermission("launch_rockets".to_string()));
    }

    #[test]
    fn test_membership_is_exact_match() {
        // "read_task" must not imply "read_my_tasks" or vice versa
        let set = PermissionSet::parse("read_task").unwrap();

        assert!(set.allows(Permission::ReadTask));
        assert!(!set.allows(Permission::ReadMyTasks));
        assert!(!set.allows(Permission::ReadAllTasks));
    }
}
