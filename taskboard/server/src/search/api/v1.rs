use crate::directory::api::v1::UserJson;
use crate::project::api::v1::ProjectJson;
use crate::search::{SearchResults, SearchService};
use crate::task::api::v1::TaskJson;
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
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text matched case-insensitively as a substring
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    projects: Vec<ProjectJson>,
    tasks: Vec<TaskJson>,
    users: Vec<UserJson>,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            projects: results.projects.into_iter().map(ProjectJson::from).collect(),
            tasks: results.tasks.into_iter().map(TaskJson::from).collect(),
            users: results.users.into_iter().map(UserJson::from).collect(),
        }
    }
}

/// Handler for GET /search?query=
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching projects, tasks and users", body = SearchResponse),
        (status = 400, description = "Query too short", body = ErrorResponse)
    ),
    tag = "Search"
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(query) = query?;
    let results = SearchService::new(&state.db, state.config.search_min_query_length)
        .search(&query.query)
        .await?;
    Ok(Json(SearchResponse::from(results)))
}

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .with_state(state)
}
