use std::sync::Arc;

use axum::{Router, response::Json, routing::get};
use utoipa::OpenApi;

use crate::web::AppState;
use crate::{dashboard, directory, preferences, project, search, task};

pub mod v1;

#[derive(OpenApi)]
#[openapi(
    info(title = "Taskboard API"),
    paths(
        project::api::v1::get_projects_handler,
        project::api::v1::create_project_handler,
        project::api::v1::get_project_handler,
        project::api::v1::delete_project_handler,
        task::api::v1::get_tasks_handler,
        task::api::v1::create_task_handler,
        task::api::v1::get_user_tasks_handler,
        task::api::v1::get_task_handler,
        task::api::v1::delete_task_handler,
        task::api::v1::update_task_status_handler,
        task::api::v1::update_task_assignee_handler,
        task::api::v1::get_comments_handler,
        task::api::v1::create_comment_handler,
        task::api::v1::get_attachments_handler,
        task::api::v1::create_attachment_handler,
        directory::api::v1::get_users_handler,
        directory::api::v1::create_user_handler,
        directory::api::v1::get_teams_handler,
        directory::api::v1::create_team_handler,
        search::api::v1::search_handler,
        dashboard::api::v1::dashboard_handler,
        preferences::api::v1::get_preferences_handler,
        preferences::api::v1::update_preferences_handler,
    ),
    components(schemas(v1::ErrorResponse)),
    tags(
        (name = "Projects", description = "Projects and the cascade delete"),
        (name = "Tasks", description = "Tasks, workflow status, comments and attachments"),
        (name = "Directory", description = "Users and teams"),
        (name = "Search", description = "Substring search"),
        (name = "Dashboard", description = "Aggregate counts"),
        (name = "Preferences", description = "Process-local UI flags")
    )
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(project::api::v1::create_api_router(state.clone()))
        .merge(task::api::v1::create_api_router(state.clone()))
        .merge(directory::api::v1::create_api_router(state.clone()))
        .merge(search::api::v1::create_api_router(state.clone()))
        .merge(dashboard::api::v1::create_api_router(state.clone()))
        .merge(preferences::api::v1::create_api_router(state))
        .route("/api-docs/openapi.json", get(openapi_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_document_every_route() {
        let openapi = ApiDoc::openapi();
        let paths: Vec<&str> = openapi.paths.paths.keys().map(String::as_str).collect();

        assert_eq!(
            paths,
            vec![
                "/dashboard",
                "/preferences",
                "/projects",
                "/projects/{project_id}",
                "/search",
                "/tasks",
                "/tasks/user/{user_id}",
                "/tasks/{task_id}",
                "/tasks/{task_id}/assignee",
                "/tasks/{task_id}/attachments",
                "/tasks/{task_id}/comments",
                "/tasks/{task_id}/status",
                "/teams",
                "/users",
            ]
        );
    }

    #[test]
    fn can_document_status_wire_values() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let status_values = &json["components"]["schemas"]["TaskStatus"]["enum"];

        assert_eq!(
            status_values,
            &serde_json::json!(["To Do", "Work In Progress", "Under Review", "Completed"])
        );
    }
}
