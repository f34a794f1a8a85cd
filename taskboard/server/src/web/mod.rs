use axum::Router;
use axum::routing::get;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::preferences::PreferenceStore;

pub mod api;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<DatabaseConnection>,
    pub preferences: PreferenceStore,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            preferences: PreferenceStore::default(),
        }
    }
}

/// Builds the complete application router: health check, JSON API and
/// OpenAPI document, wrapped in request tracing and CORS.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .merge(api::create_api_router(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let state = Arc::new(AppState::new(config, db));
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
