use crate::error::ServiceError;
use crate::task::{
    Attachment, Comment, DependentDeletion, NewAttachment, NewComment, NewTask, Task,
    TaskDeletion, TaskPriority, TaskService, TaskStatus,
};
use crate::web::AppState;
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    id: i32,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    /// Comma-separated tags
    tags: Option<String>,
    start_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    points: Option<i32>,
    project_id: i32,
    author_user_id: i32,
    assigned_user_id: Option<i32>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            tags: task.tags,
            start_date: task.start_date,
            due_date: task.due_date,
            points: task.points,
            project_id: task.project_id,
            author_user_id: task.author_user_id,
            assigned_user_id: task.assigned_user_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentJson {
    id: i32,
    text: String,
    task_id: i32,
    user_id: i32,
}

impl From<Comment> for CommentJson {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            task_id: comment.task_id,
            user_id: comment.user_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentJson {
    id: i32,
    file_url: String,
    file_name: Option<String>,
    task_id: i32,
    uploaded_by_id: i32,
}

impl From<Attachment> for AttachmentJson {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: attachment.id,
            file_url: attachment.file_url,
            file_name: attachment.file_name,
            task_id: attachment.task_id,
            uploaded_by_id: attachment.uploaded_by_id,
        }
    }
}

/// Query parameters for listing the tasks of a project.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TasksQuery {
    /// Project whose tasks are listed (required)
    project_id: Option<i32>,
    /// Only list tasks with this priority
    priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    status: TaskStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssigneeRequest {
    /// New assignee; `null` clears the assignment
    assigned_user_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DependentCounts {
    comments: u64,
    attachments: u64,
    assignments: u64,
}

impl From<DependentDeletion> for DependentCounts {
    fn from(dependents: DependentDeletion) -> Self {
        Self {
            comments: dependents.comments,
            attachments: dependents.attachments,
            assignments: dependents.assignments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDeletionResponse {
    message: String,
    task_id: i32,
    deleted: DependentCounts,
}

impl From<TaskDeletion> for TaskDeletionResponse {
    fn from(deletion: TaskDeletion) -> Self {
        Self {
            message: "Task and all related data deleted successfully".to_string(),
            task_id: deletion.task_id,
            deleted: DependentCounts::from(deletion.dependents),
        }
    }
}

fn task_list(tasks: Vec<Task>) -> Json<Vec<TaskJson>> {
    Json(tasks.into_iter().map(TaskJson::from).collect())
}

/// Handler for GET /tasks?projectId=
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    params(TasksQuery),
    responses(
        (status = 200, description = "Tasks of the project; empty when it has none", body = Vec<TaskJson>),
        (status = 400, description = "Missing projectId or unknown priority", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TasksQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let Query(query) = query?;
    let Some(project_id) = query.project_id else {
        return Err(ServiceError::missing_fields([("projectId", true)]).into());
    };
    let tasks = TaskService::new(&state.db)
        .get_tasks_by_project(project_id, query.priority)
        .await?;
    Ok(task_list(tasks))
}

/// Handler for POST /tasks
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Missing title, authorUserId or projectId", body = ErrorResponse),
        (status = 404, description = "Project, author or assignee does not exist", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), ApiError> {
    let Json(new_task) = payload?;
    let task = TaskService::new(&state.db).create_task(new_task).await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for GET /tasks/user/{user_id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/user/{user_id}",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Tasks authored by or assigned to the user", body = Vec<TaskJson>)
    ),
    tag = "Tasks"
)]
pub async fn get_user_tasks_handler(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let Path(user_id) = user_id?;
    let tasks = TaskService::new(&state.db)
        .get_tasks_by_user(user_id)
        .await?;
    Ok(task_list(tasks))
}

/// Handler for GET /tasks/{task_id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{task_id}",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The task", body = TaskJson),
        (status = 404, description = "No such task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let Path(task_id) = task_id?;
    let task = TaskService::new(&state.db).get_task_by_id(task_id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{task_id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task and its dependents deleted", body = TaskDeletionResponse),
        (status = 404, description = "No such task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TaskDeletionResponse>, ApiError> {
    let Path(task_id) = task_id?;
    let deletion = TaskService::new(&state.db).delete_task(task_id).await?;
    Ok(Json(TaskDeletionResponse::from(deletion)))
}

/// Handler for PATCH /tasks/{task_id}/status
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{task_id}/status",
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Task with its new status", body = TaskJson),
        (status = 400, description = "Status outside the workflow", body = ErrorResponse),
        (status = 404, description = "No such task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_status_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let Path(task_id) = task_id?;
    let Json(request) = payload?;
    let task = TaskService::new(&state.db)
        .update_task_status(task_id, request.status)
        .await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PATCH /tasks/{task_id}/assignee
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{task_id}/assignee",
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = UpdateAssigneeRequest,
    responses(
        (status = 200, description = "Task with its new assignee", body = TaskJson),
        (status = 404, description = "No such task or user", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_assignee_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateAssigneeRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let Path(task_id) = task_id?;
    let Json(request) = payload?;
    let task = TaskService::new(&state.db)
        .assign_task(task_id, request.assigned_user_id)
        .await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for GET /tasks/{task_id}/comments
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{task_id}/comments",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentJson>),
        (status = 404, description = "No such task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_comments_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<CommentJson>>, ApiError> {
    let Path(task_id) = task_id?;
    let comments = TaskService::new(&state.db).get_comments(task_id).await?;
    Ok(Json(comments.into_iter().map(CommentJson::from).collect()))
}

/// Handler for POST /tasks/{task_id}/comments
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks/{task_id}/comments",
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment added", body = CommentJson),
        (status = 400, description = "Missing text or userId", body = ErrorResponse),
        (status = 404, description = "No such task or user", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_comment_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentJson>), ApiError> {
    let Path(task_id) = task_id?;
    let Json(new_comment) = payload?;
    let comment = TaskService::new(&state.db)
        .add_comment(task_id, new_comment)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentJson::from(comment))))
}

/// Handler for GET /tasks/{task_id}/attachments
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{task_id}/attachments",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Attachment metadata", body = Vec<AttachmentJson>),
        (status = 404, description = "No such task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_attachments_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<AttachmentJson>>, ApiError> {
    let Path(task_id) = task_id?;
    let attachments = TaskService::new(&state.db)
        .get_attachments(task_id)
        .await?;
    Ok(Json(
        attachments.into_iter().map(AttachmentJson::from).collect(),
    ))
}

/// Handler for POST /tasks/{task_id}/attachments
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks/{task_id}/attachments",
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = NewAttachment,
    responses(
        (status = 201, description = "Attachment recorded", body = AttachmentJson),
        (status = 400, description = "Missing fileUrl or uploadedById", body = ErrorResponse),
        (status = 404, description = "No such task or user", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_attachment_handler(
    State(state): State<Arc<AppState>>,
    task_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<NewAttachment>, JsonRejection>,
) -> Result<(StatusCode, Json<AttachmentJson>), ApiError> {
    let Path(task_id) = task_id?;
    let Json(new_attachment) = payload?;
    let attachment = TaskService::new(&state.db)
        .add_attachment(task_id, new_attachment)
        .await?;
    Ok((StatusCode::CREATED, Json(AttachmentJson::from(attachment))))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(create_task_handler))
        .route("/tasks/user/{user_id}", get(get_user_tasks_handler))
        .route(
            "/tasks/{task_id}",
            get(get_task_handler).delete(delete_task_handler),
        )
        .route("/tasks/{task_id}/status", patch(update_task_status_handler))
        .route(
            "/tasks/{task_id}/assignee",
            patch(update_task_assignee_handler),
        )
        .route(
            "/tasks/{task_id}/comments",
            get(get_comments_handler).post(create_comment_handler),
        )
        .route(
            "/tasks/{task_id}/attachments",
            get(get_attachments_handler).post(create_attachment_handler),
        )
        .with_state(state)
}
