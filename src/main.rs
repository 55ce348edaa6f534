use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use operlens::api::{create_api_router, AppState};
use operlens::config::Config;
use operlens::dashboard::{DashboardService, WeeklyPatternsService};
use operlens::prefs::FilePreferenceStore;
use operlens::proxy::{InsightsApi, InsightsClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");
    info!(
        "Analytics backend: {}{}",
        config.backend.base_url, config.backend.path_prefix
    );

    // Wire up the backend client and dataset services
    let client: Arc<dyn InsightsApi> = Arc::new(InsightsClient::new(config.backend.clone())?);
    let dashboard = Arc::new(DashboardService::new(Arc::clone(&client)));
    let weekly = Arc::new(WeeklyPatternsService::new(Arc::clone(&client)));
    let prefs = Arc::new(FilePreferenceStore::new(&config.preferences_path));

    let state = Arc::new(AppState {
        client,
        dashboard,
        weekly,
        prefs,
    });

    // Create the router
    let router = create_api_router(state, &config.frontend);

    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("Serving dashboard frontend from directory: {}", static_dir);
    }

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Dashboard server listening on http://{}", addr);
    info!("   - API endpoints available at http://{}/api/...", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
