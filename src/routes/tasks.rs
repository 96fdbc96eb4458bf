use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{CreateTaskRequest, ListTasksQuery, Task, TaskFilter, TaskStats, UpdateTaskRequest},
    store::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Loads a task and enforces ownership in one step.
///
/// A task owned by a different user is reported exactly like a missing one,
/// so task ids cannot be probed for existence across accounts.
async fn owned_task(store: &dyn TaskStore, id: Uuid, owner_id: Uuid) -> Result<Task, AppError> {
    match store.find_by_id(id).await? {
        Some(task) if task.owner_id == owner_id => Ok(task),
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

fn reject_past_due_date(due_date: NaiveDate) -> Result<(), AppError> {
    if due_date < Utc::now().date_naive() {
        return Err(AppError::ValidationError(
            "Due date cannot be in the past".into(),
        ));
    }
    Ok(())
}

/// Retrieves the authenticated user's tasks, in creation order.
///
/// ## Query Parameters:
/// - `filter` (optional): `all`, `today` (due today), `week` (due within the
///   next 7 days, inclusive of today), or a priority level (`low`/`medium`/
///   `high`, case-insensitive). Unrecognized values behave as `all`.
///
/// The response also carries summary statistics derived from the returned
/// list: total count, completed count, and counts per priority level.
///
/// ## Responses:
/// - `200 OK`: `{"success": true, "tasks": [...], "stats": {...}}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_tasks(
    tasks: web::Data<dyn TaskStore>,
    query: web::Query<ListTasksQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let filter = query
        .filter
        .as_deref()
        .map(TaskFilter::parse)
        .unwrap_or(TaskFilter::All);
    let today = Utc::now().date_naive();

    let mut listed = tasks.find_by_owner(user.0.id).await?;
    listed.retain(|task| filter.matches(task, today));

    let stats = TaskStats::from_tasks(&listed);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tasks": listed,
        "stats": stats
    })))
}

/// Creates a new task owned by the authenticated user.
///
/// Requires a non-empty title and a due date that is not in the past. The
/// server assigns the id, timestamps, and an initial revision of 0; the
/// completion flag defaults to "No".
///
/// ## Responses:
/// - `201 Created`: `{"success": true, "task": {...}}`.
/// - `400 Bad Request`: Missing/invalid fields or a past due date.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[post("")]
pub async fn create_task(
    tasks: web::Data<dyn TaskStore>,
    task_data: web::Json<CreateTaskRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;
    reject_past_due_date(task_data.due_date)?;

    let task = tasks
        .insert(Task::new(task_data.into_inner(), user.0.id))
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "task": task
    })))
}

/// Retrieves a single task by id. The caller must own it; anything else is a 404.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = owned_task(tasks.get_ref(), task_id.into_inner(), user.0.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "task": task
    })))
}

/// Updates a task the caller owns.
///
/// Partial update semantics: only the supplied fields change, and the owner is
/// never reassignable. A supplied due date must not be in the past. When the
/// payload carries a `revision`, the update only applies if it matches the
/// stored revision (compare-and-swap); a stale value is rejected with 409.
///
/// ## Responses:
/// - `200 OK`: Returns the updated task, with its revision bumped.
/// - `400 Bad Request`: Invalid fields or a past due date.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: Missing or not owned by the caller.
/// - `409 Conflict`: Stale revision.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<UpdateTaskRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_data = task_data.into_inner();
    if let Some(due_date) = task_data.due_date {
        reject_past_due_date(due_date)?;
    }

    let mut task = owned_task(tasks.get_ref(), task_id.into_inner(), user.0.id).await?;

    if let Some(expected) = task_data.revision {
        if expected != task.revision {
            return Err(AppError::Conflict(
                "Task was modified by another request".into(),
            ));
        }
    }

    task.apply(task_data);
    let task = tasks.update(task).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "task": task
    })))
}

/// Deletes a task the caller owns. A second delete of the same id is a 404.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = owned_task(tasks.get_ref(), task_id.into_inner(), user.0.id).await?;

    if !tasks.delete(task.id).await? {
        // Lost a race with a concurrent delete of the same task.
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted"
    })))
}
