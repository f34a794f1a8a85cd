use crate::project::{NewProject, Project, ProjectDeletion, ProjectService};
use crate::web::AppState;
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Project for API responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectJson {
    id: i32,
    name: String,
    description: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

impl From<Project> for ProjectJson {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
        }
    }
}

/// Rows removed by a project delete, per table.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeletionCounts {
    tasks: u64,
    comments: u64,
    attachments: u64,
    assignments: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeletionResponse {
    message: String,
    project_id: i32,
    deleted: ProjectDeletionCounts,
}

impl From<ProjectDeletion> for ProjectDeletionResponse {
    fn from(deletion: ProjectDeletion) -> Self {
        Self {
            message: "Project and all related data deleted successfully".to_string(),
            project_id: deletion.project_id,
            deleted: ProjectDeletionCounts {
                tasks: deletion.tasks,
                comments: deletion.dependents.comments,
                attachments: deletion.dependents.attachments,
                assignments: deletion.dependents.assignments,
            },
        }
    }
}

/// Handler for GET /projects
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/projects",
    responses(
        (status = 200, description = "All projects, in no particular order", body = Vec<ProjectJson>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn get_projects_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectJson>>, ApiError> {
    let projects = ProjectService::new(&state.db).get_all_projects().await?;
    Ok(Json(projects.into_iter().map(ProjectJson::from).collect()))
}

/// Handler for POST /projects
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Project created", body = ProjectJson),
        (status = 400, description = "Missing name, startDate or endDate", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> Result<(StatusCode, Json<ProjectJson>), ApiError> {
    let Json(new_project) = payload?;
    let project = ProjectService::new(&state.db)
        .create_project(new_project)
        .await?;
    Ok((StatusCode::CREATED, Json(ProjectJson::from(project))))
}

/// Handler for GET /projects/{project_id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/projects/{project_id}",
    params(("project_id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "The project", body = ProjectJson),
        (status = 404, description = "No such project", body = ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn get_project_handler(
    State(state): State<Arc<AppState>>,
    project_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ProjectJson>, ApiError> {
    let Path(project_id) = project_id?;
    let project = ProjectService::new(&state.db)
        .get_project_by_id(project_id)
        .await?;
    Ok(Json(ProjectJson::from(project)))
}

/// Handler for DELETE /projects/{project_id}
///
/// Removes the project together with its tasks and their comments,
/// attachments and assignments, all or nothing.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/projects/{project_id}",
    params(("project_id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project and all related data deleted", body = ProjectDeletionResponse),
        (status = 404, description = "No such project; nothing was deleted", body = ErrorResponse),
        (status = 500, description = "Store failure; nothing was deleted", body = ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn delete_project_handler(
    State(state): State<Arc<AppState>>,
    project_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ProjectDeletionResponse>, ApiError> {
    let Path(project_id) = project_id?;
    let deletion = ProjectService::new(&state.db)
        .delete_project(project_id)
        .await?;
    Ok(Json(ProjectDeletionResponse::from(deletion)))
}

/// Creates and returns the projects API router.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/projects",
            get(get_projects_handler).post(create_project_handler),
        )
        .route(
            "/projects/{project_id}",
            get(get_project_handler).delete(delete_project_handler),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::DependentDeletion;

    #[test]
    fn can_report_every_deleted_table() {
        let response = ProjectDeletionResponse::from(ProjectDeletion {
            project_id: 3,
            tasks: 2,
            dependents: DependentDeletion {
                comments: 4,
                attachments: 1,
                assignments: 2,
            },
        });

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Project and all related data deleted successfully",
                "projectId": 3,
                "deleted": {
                    "tasks": 2,
                    "comments": 4,
                    "attachments": 1,
                    "assignments": 2
                }
            })
        );
    }
}
