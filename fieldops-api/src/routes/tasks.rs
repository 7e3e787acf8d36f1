/// Task lifecycle endpoints
///
/// Every handler runs behind the access gate and checks exactly one
/// permission before touching storage. A caller without the permission
/// gets the fixed 403 body and storage is never queried.
///
/// # Endpoints
///
/// - `POST /tasks` (`create_task`) - create a task owned by the caller
/// - `GET /tasks` (`read_my_tasks`) - page through the caller's tasks
/// - `GET /tasks/all` (`read_all_tasks`) - page through everyone's tasks
/// - `PATCH /tasks/:task_id` (`update_task`) - mark a task performed
/// - `DELETE /tasks/:task_id` (`delete_task`) - delete any task by id
///
/// Marking a task performed publishes a best-effort notification onto the
/// queue; delivery failure is logged and the HTTP response is unaffected.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use fieldops_shared::auth::middleware::AuthContext;
use fieldops_shared::auth::permissions::Permission;
use fieldops_shared::models::task::{CreateTask, Task, TaskWithOwner};
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Pagination query parameters, `?page=2&limit=25`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,

    /// Page size (default 10)
    pub limit: Option<i64>,
}

impl PageQuery {
    fn page(&self) -> i64 {
        self.page.filter(|page| *page > 0).unwrap_or(DEFAULT_PAGE)
    }

    fn limit(&self) -> i64 {
        self.limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIMIT)
    }

    fn skip(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task name
    pub name: Option<String>,

    /// Task summary
    pub summary: Option<String>,
}

/// Evaluates one required permission against the caller's set; a denial
/// becomes the fixed 403 response.
fn ensure_permission(auth: &AuthContext, permission: Permission) -> Result<(), ApiError> {
    if auth.allows(permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Renders the queue notification for a performed task.
fn performed_message(performer: &str, task: &str, at: DateTime<Utc>) -> String {
    format!(
        "Task '{}' was performed by {} at {}",
        task,
        performer,
        at.to_rfc3339()
    )
}

/// Create a task owned by the caller. Requires `create_task`.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    ensure_permission(&auth, Permission::CreateTask)?;

    let (Some(name), Some(summary)) = (req.name, req.summary) else {
        return Err(ApiError::MissingFields);
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            name,
            summary,
            user_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "task created");

    Ok(Json(task))
}

/// List the caller's tasks, ascending id, paginated. Requires
/// `read_my_tasks`.
///
/// Also serves `GET /tasks/:task_id`, which routes to this handler; the
/// path id is not used.
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<PageQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    ensure_permission(&auth, Permission::ReadMyTasks)?;

    let tasks = Task::list_for_owner(
        &state.db,
        auth.user_id,
        pagination.limit(),
        pagination.skip(),
    )
    .await?;

    Ok(Json(tasks))
}

/// List every task with owner details embedded. Requires
/// `read_all_tasks`.
pub async fn list_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<PageQuery>,
) -> ApiResult<Json<Vec<TaskWithOwner>>> {
    ensure_permission(&auth, Permission::ReadAllTasks)?;

    let tasks =
        Task::list_all_with_owner(&state.db, pagination.limit(), pagination.skip()).await?;

    Ok(Json(tasks))
}

/// Mark one of the caller's tasks performed. Requires `update_task`.
///
/// The transition is monotonic: a second attempt is rejected with 400
/// rather than silently overwriting the timestamp.
pub async fn perform(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    ensure_permission(&auth, Permission::UpdateTask)?;

    let Some(task) = Task::find_owned(&state.db, task_id, auth.user_id).await? else {
        return Err(ApiError::NotFound("Task not found".to_string()));
    };

    if task.date_performed.is_some() {
        return Err(ApiError::BadRequest("Task already performed".to_string()));
    }

    // the conditional UPDATE loses to a concurrent perform of the same task
    let Some(task) = Task::mark_performed(&state.db, task.id).await? else {
        return Err(ApiError::BadRequest("Task already performed".to_string()));
    };

    notify_performed(&state, &auth, &task).await;

    Ok(Json(task))
}

/// Delete any task by id. Requires `delete_task`.
///
/// Deliberately not owner-scoped: the delete permission is global.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    ensure_permission(&auth, Permission::DeleteTask)?;

    let Some(task) = Task::delete(&state.db, task_id).await? else {
        return Err(ApiError::NotFound("Task not found".to_string()));
    };

    tracing::info!(task_id = %task.id, deleted_by = %auth.user_id, "task deleted");

    Ok(Json(task))
}

/// Publishes the performed notification, best-effort. Failures are logged
/// and deliberately discarded so they can never fail the HTTP response.
async fn notify_performed(state: &AppState, auth: &AuthContext, task: &Task) {
    let performed_at = task.date_performed.unwrap_or_else(Utc::now);
    let message = performed_message(&auth.name, &task.name, performed_at);

    match &state.notifier {
        Some(queue) => {
            if let Err(err) = queue.send(&message).await {
                tracing::warn!(
                    error = %err,
                    task_id = %task.id,
                    "task notification was not delivered"
                );
            }
        }
        None => {
            tracing::warn!(
                task_id = %task.id,
                "queue connection unavailable, task notification dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_shared::auth::permissions::PermissionSet;

    fn caller(permissions: &str) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            name: "technician".to_string(),
            email: "technician@mail.com".to_string(),
            role: "Technician".to_string(),
            permissions: PermissionSet::parse(permissions).unwrap(),
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let query = PageQuery::default();

        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.skip(), 0);
    }

    #[test]
    fn test_pagination_skip() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(25),
        };

        assert_eq!(query.skip(), 50);
        assert_eq!(query.limit(), 25);
    }

    #[test]
    fn test_pagination_rejects_nonpositive_values() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(-5),
        };

        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.skip(), 0);
    }

    #[test]
    fn test_ensure_permission_allows_member() {
        let auth = caller("create_task;read_my_tasks");
        assert!(ensure_permission(&auth, Permission::CreateTask).is_ok());
    }

    #[test]
    fn test_ensure_permission_denies_non_member() {
        let auth = caller("read_my_tasks");
        let err = ensure_permission(&auth, Permission::DeleteTask).unwrap_err();

        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_performed_message_names_performer_and_task() {
        let at = Utc::now();
        let message = performed_message("technician", "Replace filter", at);

        assert!(message.contains("technician"));
        assert!(message.contains("Replace filter"));
        assert!(message.contains(&at.to_rfc3339()));
    }
}
