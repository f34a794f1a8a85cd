use crate::dashboard::{DashboardService, DashboardSummary};
use crate::project::ProjectStatus;
use crate::task::TaskPriority;
use crate::web::AppState;
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Restrict task counts to one project
    project_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectStatusCount {
    status: ProjectStatus,
    count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskPriorityCount {
    priority: TaskPriority,
    count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    project_status: Vec<ProjectStatusCount>,
    task_priority: Vec<TaskPriorityCount>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            project_status: summary
                .project_status
                .into_iter()
                .map(|(status, count)| ProjectStatusCount { status, count })
                .collect(),
            task_priority: summary
                .task_priority
                .into_iter()
                .map(|(priority, count)| TaskPriorityCount { priority, count })
                .collect(),
        }
    }
}

/// Handler for GET /dashboard
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Project status and task priority counts", body = DashboardResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let Query(query) = query?;
    let summary = DashboardService::new(&state.db)
        .summary(query.project_id)
        .await?;
    Ok(Json(DashboardResponse::from(summary)))
}

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .with_state(state)
}
