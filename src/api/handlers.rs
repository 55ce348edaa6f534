use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::dashboard::{
    kpis, DashboardQuery, DashboardService, FormattedWeeklyPattern, Kpis, WeeklyPatternsService,
    WEEKLY_EXPORT_HEADERS,
};
use crate::export::csv_attachment;
use crate::models::TopOperator;
use crate::prefs::{PreferenceStore, Preferences};
use crate::proxy::{Endpoint, FetchParams, InsightsApi, ProxyError};
use crate::reshape::{
    anomaly_groups, geo_totals, monthly_activity, weekly_connection_totals, weekly_day_breakdown,
    AnomalyGroup, CountryTotal, MonthlyActivity, WeeklyDayBreakdown, WeeklyDayTotal,
};
use crate::tracker::{pause_segments, PauseSegment};

pub struct AppState {
    pub client: Arc<dyn InsightsApi>,
    pub dashboard: Arc<DashboardService>,
    pub weekly: Arc<WeeklyPatternsService>,
    pub prefs: Arc<dyn PreferenceStore>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map proxy failures onto the fixed response statuses: unknown logical
/// endpoints are the caller's fault, everything else is a generic bad
/// gateway with details kept in the logs.
fn proxy_error(e: ProxyError) -> ApiError {
    match e {
        ProxyError::InvalidEndpoint(name) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown endpoint '{name}'"),
            }),
        ),
        ProxyError::RemoteCall { .. } | ProxyError::Network(_) | ProxyError::Payload(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Analytics backend unavailable".to_string(),
            }),
        ),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

#[derive(Deserialize)]
pub struct InsightsQuery {
    pub endpoint: String,
    pub limit: Option<u32>,
    pub in_app_only: Option<bool>,
}

/// Forward one logical dataset request to the analytics backend
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<Value>, ApiError> {
    let endpoint = query.endpoint.parse::<Endpoint>().map_err(proxy_error)?;
    let params = FetchParams::new(query.limit, query.in_app_only);
    let payload = state
        .client
        .fetch(endpoint, params)
        .await
        .map_err(proxy_error)?;
    Ok(Json(payload))
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Relay a raw SQL query to the backend's execution endpoint. The query
/// text is forwarded verbatim; validation belongs to the backend.
pub async fn execute_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .client
        .execute_query(&request.query)
        .await
        .map_err(proxy_error)?;
    Ok(Json(payload))
}

/// Detail view for a single operator
pub async fn get_operator(
    State(state): State<Arc<AppState>>,
    Path(operator_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .client
        .fetch_operator(&operator_id)
        .await
        .map_err(proxy_error)?;
    Ok(Json(payload))
}

#[derive(Deserialize)]
pub struct DashboardViewQuery {
    pub top_limit: Option<u32>,
    pub in_app_only: Option<bool>,
}

/// One operator's pause analysis with parsed tracker segments
#[derive(Serialize)]
pub struct GapTrackerRow {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "nb_pauses_detectees")]
    pub pause_count: i64,
    #[serde(rename = "duree_moyenne_pause")]
    pub mean_pause_days: f64,
    #[serde(rename = "plus_longue_pause")]
    pub longest_pause_days: i64,
    pub segments: Vec<PauseSegment>,
}

#[derive(Serialize)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub monthly_activity: Vec<MonthlyActivity>,
    pub weekly_activity: Vec<WeeklyDayTotal>,
    pub geo_distribution: Vec<CountryTotal>,
    pub gap_trackers: Vec<GapTrackerRow>,
    pub anomalies: Vec<AnomalyGroup>,
    pub top_operators: Vec<TopOperator>,
    pub loading: bool,
}

/// Refresh the dashboard datasets and return the reshaped view model.
/// When the refresh fails the last good snapshot is served instead.
pub async fn dashboard_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardViewQuery>,
) -> Json<DashboardView> {
    let in_app_only = query
        .in_app_only
        .unwrap_or_else(|| state.prefs.load().in_app_only);
    let dashboard_query = DashboardQuery {
        top_limit: query.top_limit.unwrap_or(10),
        in_app_only,
    };

    tokio::join!(
        state.dashboard.refresh(dashboard_query),
        state.weekly.refresh(),
    );

    let data = state.dashboard.snapshot().await;
    let weekly = state.weekly.patterns(in_app_only).await;

    let gap_trackers = data
        .activity_gaps
        .iter()
        .map(|gap| GapTrackerRow {
            operator_id: gap.operator_id.clone(),
            pause_count: gap.pause_count,
            mean_pause_days: gap.mean_pause_days,
            longest_pause_days: gap.longest_pause_days,
            segments: pause_segments(&gap.pause_detail),
        })
        .collect();

    Json(DashboardView {
        kpis: kpis(&data.operator_dashboard),
        monthly_activity: monthly_activity(&data.monthly_stats),
        weekly_activity: weekly_connection_totals(&weekly),
        geo_distribution: geo_totals(&data.geo_distributions),
        gap_trackers,
        anomalies: anomaly_groups(&data.anomalies),
        top_operators: data.top_operators,
        loading: state.dashboard.loading().await,
    })
}

#[derive(Deserialize)]
pub struct WeeklyViewQuery {
    pub in_app_only: Option<bool>,
}

#[derive(Serialize)]
pub struct WeeklyView {
    pub patterns: Vec<FormattedWeeklyPattern>,
    pub day_totals: Vec<WeeklyDayBreakdown>,
    pub loading: bool,
}

pub async fn weekly_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeeklyViewQuery>,
) -> Json<WeeklyView> {
    let in_app_only = query
        .in_app_only
        .unwrap_or_else(|| state.prefs.load().in_app_only);

    state.weekly.refresh().await;
    let patterns = state.weekly.patterns(in_app_only).await;

    Json(WeeklyView {
        day_totals: weekly_day_breakdown(&patterns),
        patterns: state.weekly.formatted(in_app_only).await,
        loading: state.weekly.loading().await,
    })
}

/// Download the weekly pattern rows as a CSV attachment
pub async fn export_weekly_patterns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeeklyViewQuery>,
) -> Result<Response, ApiError> {
    let in_app_only = query
        .in_app_only
        .unwrap_or_else(|| state.prefs.load().in_app_only);

    state.weekly.refresh().await;
    let rows = state.weekly.export_rows(in_app_only).await;

    csv_attachment("weekly-patterns", &WEEKLY_EXPORT_HEADERS, &rows).map_err(|e| {
        tracing::error!("Failed to serialize weekly patterns CSV: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to export CSV".to_string(),
            }),
        )
    })
}

pub async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<Preferences> {
    Json(state.prefs.load())
}

pub async fn put_preferences(
    State(state): State<Arc<AppState>>,
    Json(prefs): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    state.prefs.save(&prefs).map_err(|e| {
        tracing::error!("Failed to persist preferences: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to save preferences".to_string(),
            }),
        )
    })?;
    Ok(Json(prefs))
}
