/// Task model and database operations
///
/// Tasks are owned by the user who created them. The lifecycle is
/// deliberately small: a task is created unperformed, transitions at most
/// once to performed (`date_performed` set), and can be deleted at any
/// point. There is no un-performing.
///
/// The performed transition is guarded by a conditional UPDATE
/// (`WHERE date_performed IS NULL`), so even when two callers race past
/// the handler's read-then-write check, only one of them wins the
/// transition.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     summary TEXT NOT NULL,
///     date_performed TIMESTAMPTZ,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task model.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task id
    pub id: Uuid,

    /// Short task name
    pub name: String,

    /// Free-form description of the work
    pub summary: String,

    /// When the task was performed; None until the single transition
    pub date_performed: Option<DateTime<Utc>>,

    /// Owner (the creating user)
    pub user_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task name
    pub name: String,

    /// Task summary
    pub summary: String,

    /// Owner
    pub user_id: Uuid,
}

/// Owner details embedded in the all-tasks listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOwner {
    /// Owner's user id
    pub id: Uuid,

    /// Owner's display name
    pub name: String,

    /// Owner's email
    pub email: String,
}

/// A task joined with its owner, returned by the all-tasks listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWithOwner {
    /// Unique task id
    pub id: Uuid,

    /// Short task name
    pub name: String,

    /// Free-form description of the work
    pub summary: String,

    /// When the task was performed, if it has been
    pub date_performed: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Embedded owner details
    pub owner: TaskOwner,
}

/// Flat row shape for the task/owner join.
#[derive(sqlx::FromRow)]
struct TaskOwnerRow {
    id: Uuid,
    name: String,
    summary: String,
    date_performed: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_name: String,
    owner_email: String,
}

impl Task {
    /// Creates a task owned by the given user.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, summary, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, summary, date_performed, user_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.summary)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id, scoped to its owner.
    ///
    /// Used by the owner-scoped flows (perform); a task belonging to
    /// someone else is indistinguishable from a missing one.
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, summary, date_performed, user_id, created_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the tasks owned by a user, ascending id, paginated.
    pub async fn list_for_owner(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, summary, date_performed, user_id, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists every task regardless of owner, with owner details embedded,
    /// ascending id, paginated.
    pub async fn list_all_with_owner(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskOwnerRow>(
            r#"
            SELECT t.id, t.name, t.summary, t.date_performed, t.created_at,
                   u.id AS owner_id, u.name AS owner_name, u.email AS owner_email
            FROM tasks t
            JOIN users u ON u.id = t.user_id
            ORDER BY t.id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TaskWithOwner {
                id: row.id,
                name: row.name,
                summary: row.summary,
                date_performed: row.date_performed,
                created_at: row.created_at,
                owner: TaskOwner {
                    id: row.owner_id,
                    name: row.owner_name,
                    email: row.owner_email,
                },
            })
            .collect())
    }

    /// Stamps `date_performed` on an unperformed task.
    ///
    /// Returns None when the task does not exist or was already performed;
    /// the `date_performed IS NULL` guard keeps the transition monotonic
    /// under concurrent attempts.
    pub async fn mark_performed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET date_performed = NOW()
            WHERE id = $1 AND date_performed IS NULL
            RETURNING id, name, summary, date_performed, user_id, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task by id, returning its prior representation.
    ///
    /// Lookup is by id only, not scoped to any owner: any caller holding
    /// the delete permission may delete any task.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            RETURNING id, name, summary, date_performed, user_id, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "Replace filter".to_string(),
            summary: "Replace the intake filter in unit 4".to_string(),
            date_performed: None,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unperformed_task_serializes_null_date() {
        let value = serde_json::to_value(fresh_task()).unwrap();

        assert!(value["date_performed"].is_null());
        assert_eq!(value["name"], "Replace filter");
    }

    #[test]
    fn test_performed_task_serializes_timestamp() {
        let task = Task {
            date_performed: Some(Utc::now()),
            ..fresh_task()
        };
        let value = serde_json::to_value(task).unwrap();

        assert!(value["date_performed"].is_string());
    }

    #[test]
    fn test_all_tasks_listing_embeds_owner() {
        let entry = TaskWithOwner {
            id: Uuid::new_v4(),
            name: "Inspect pump".to_string(),
            summary: "Quarterly inspection".to_string(),
            date_performed: None,
            created_at: Utc::now(),
            owner: TaskOwner {
                id: Uuid::new_v4(),
                name: "technician".to_string(),
                email: "technician@mail.com".to_string(),
            },
        };
        let value = serde_json::to_value(entry).unwrap();

        assert_eq!(value["owner"]["name"], "technician");
        assert_eq!(value["owner"]["email"], "technician@mail.com");
    }
}
