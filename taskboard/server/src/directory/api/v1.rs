use crate::directory::{DirectoryService, NewTeam, NewUser, Team, User};
use crate::web::AppState;
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJson {
    user_id: i32,
    username: String,
    profile_picture_url: Option<String>,
}

impl From<User> for UserJson {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            profile_picture_url: user.profile_picture_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamJson {
    id: i32,
    team_name: String,
    product_owner_username: Option<String>,
    project_manager_username: Option<String>,
}

impl From<Team> for TeamJson {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            team_name: team.team_name,
            product_owner_username: team.product_owner_username,
            project_manager_username: team.project_manager_username,
        }
    }
}

/// Handler for GET /users
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = Vec<UserJson>)),
    tag = "Directory"
)]
pub async fn get_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserJson>>, ApiError> {
    let users = DirectoryService::new(&state.db).get_all_users().await?;
    Ok(Json(users.into_iter().map(UserJson::from).collect()))
}

/// Handler for POST /users
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = UserJson),
        (status = 400, description = "Missing or duplicate username", body = ErrorResponse)
    ),
    tag = "Directory"
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserJson>), ApiError> {
    let Json(new_user) = payload?;
    let user = DirectoryService::new(&state.db).create_user(new_user).await?;
    Ok((StatusCode::CREATED, Json(UserJson::from(user))))
}

/// Handler for GET /teams
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/teams",
    responses((status = 200, description = "All teams with role holders resolved", body = Vec<TeamJson>)),
    tag = "Directory"
)]
pub async fn get_teams_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TeamJson>>, ApiError> {
    let teams = DirectoryService::new(&state.db).get_all_teams().await?;
    Ok(Json(teams.into_iter().map(TeamJson::from).collect()))
}

/// Handler for POST /teams
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/teams",
    request_body = NewTeam,
    responses(
        (status = 201, description = "Team created", body = TeamJson),
        (status = 400, description = "Missing teamName", body = ErrorResponse),
        (status = 404, description = "Role holder does not exist", body = ErrorResponse)
    ),
    tag = "Directory"
)]
pub async fn create_team_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTeam>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamJson>), ApiError> {
    let Json(new_team) = payload?;
    let team = DirectoryService::new(&state.db).create_team(new_team).await?;
    Ok((StatusCode::CREATED, Json(TeamJson::from(team))))
}

/// Creates and returns the users and teams API router.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", get(get_users_handler).post(create_user_handler))
        .route("/teams", get(get_teams_handler).post(create_team_handler))
        .with_state(state)
}
