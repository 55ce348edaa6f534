use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::FrontendConfig;

use super::handlers::{
    dashboard_view, execute_query, export_weekly_patterns, get_insights, get_operator,
    get_preferences, health_check, put_preferences, weekly_view, AppState,
};

pub fn create_api_router(state: Arc<AppState>, frontend: &FrontendConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api/insights", get(get_insights))
        .route("/api/query", post(execute_query))
        .route("/api/operators/{id}", get(get_operator))
        .route("/api/view/dashboard", get(dashboard_view))
        .route("/api/view/weekly", get(weekly_view))
        .route("/api/export/weekly-patterns.csv", get(export_weekly_patterns))
        .route("/api/preferences", get(get_preferences).put(put_preferences))
        .with_state(state)
        .layer(cors);

    if let Some(ref static_dir) = frontend.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
}
