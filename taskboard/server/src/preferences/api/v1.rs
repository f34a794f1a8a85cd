use crate::preferences::{PreferencesUpdate, UiPreferences};
use crate::web::AppState;
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::get,
};
use std::sync::Arc;

/// Handler for GET /preferences
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/preferences",
    responses((status = 200, description = "Current UI preferences", body = UiPreferences)),
    tag = "Preferences"
)]
pub async fn get_preferences_handler(State(state): State<Arc<AppState>>) -> Json<UiPreferences> {
    Json(state.preferences.get())
}

/// Handler for PATCH /preferences
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/preferences",
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Preferences after the update", body = UiPreferences),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    ),
    tag = "Preferences"
)]
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PreferencesUpdate>, JsonRejection>,
) -> Result<Json<UiPreferences>, ApiError> {
    let Json(update) = payload?;
    Ok(Json(state.preferences.update(update)))
}

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/preferences",
            get(get_preferences_handler).patch(update_preferences_handler),
        )
        .with_state(state)
}
