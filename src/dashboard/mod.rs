//! Dataset orchestration for the dashboard views.
//!
//! Each service owns one result snapshot and a declared dependency set.
//! A refresh issues all sibling fetches concurrently and replaces the
//! snapshot atomically only when every fetch succeeds; any failure keeps
//! the previous snapshot in place. A generation token guards against a
//! superseded refresh applying its results after a newer one settled.
//! There is no retry: a failed cycle is terminal until the dependencies
//! change or a caller refreshes again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{
    ActivityGap, ActivityGapsEnvelope, AnomaliesEnvelope, Anomaly, GeoDistribution, MonthlyStat,
    MonthlyStatsEnvelope, OperatorDashboardEnvelope, OperatorSummary, TopOperator,
    WeeklyPattern, WeeklyPatternsEnvelope,
};
use crate::proxy::{Endpoint, FetchParams, InsightsApi, ProxyResult};
use crate::reshape::{parse_backend_date, short_date_label};

/// Dependency set of the main dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub top_limit: u32,
    pub in_app_only: bool,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            top_limit: 10,
            in_app_only: false,
        }
    }
}

/// One full dashboard snapshot, replaced wholesale per refresh cycle
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub operator_dashboard: Vec<OperatorSummary>,
    pub monthly_stats: Vec<MonthlyStat>,
    pub activity_gaps: Vec<ActivityGap>,
    pub top_operators: Vec<TopOperator>,
    pub geo_distributions: Vec<GeoDistribution>,
    pub anomalies: Vec<Anomaly>,
}

/// Headline metrics over the operator summary rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_operators: usize,
    pub total_clients: i64,
    pub total_connections: i64,
    pub total_countries: i64,
}

pub fn kpis(summaries: &[OperatorSummary]) -> Kpis {
    Kpis {
        total_operators: summaries.len(),
        total_clients: summaries.iter().map(|s| s.total_clients).sum(),
        total_connections: summaries.iter().map(|s| s.total_connections).sum(),
        total_countries: summaries.iter().map(|s| s.total_countries).sum(),
    }
}

#[derive(Default)]
struct DashboardState {
    data: DashboardData,
    loading: bool,
}

pub struct DashboardService {
    api: Arc<dyn InsightsApi>,
    state: RwLock<DashboardState>,
    generation: AtomicU64,
}

impl DashboardService {
    pub fn new(api: Arc<dyn InsightsApi>) -> Self {
        Self {
            api,
            state: RwLock::new(DashboardState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch every dashboard dataset concurrently and swap in the result.
    /// On failure the previous snapshot stays visible and the error is
    /// only logged; callers keep serving the last good data.
    pub async fn refresh(&self, query: DashboardQuery) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let result = self.fetch_all(query).await;

        let mut state = self.state.write().await;
        // Only the newest in-flight refresh may touch the snapshot
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        match result {
            Ok(data) => state.data = data,
            Err(e) => warn!("Dashboard refresh failed, keeping previous snapshot: {e}"),
        }
        state.loading = false;
    }

    async fn fetch_all(&self, query: DashboardQuery) -> ProxyResult<DashboardData> {
        let limited = FetchParams::new(Some(query.top_limit), Some(query.in_app_only));
        let filtered = FetchParams::new(None, Some(query.in_app_only));
        let bare = FetchParams::default();

        let (dashboard, monthly, gaps, top, geo, anomalies) = tokio::try_join!(
            self.api.fetch(Endpoint::OperatorDashboard, filtered),
            self.api.fetch(Endpoint::MonthlyStats, limited),
            self.api.fetch(Endpoint::ActivityGaps, bare),
            self.api.fetch(Endpoint::TopOperators, limited),
            self.api.fetch(Endpoint::GeographicAnalysis, filtered),
            self.api.fetch(Endpoint::Anomalies, bare),
        )?;

        Ok(DashboardData {
            operator_dashboard: decode::<OperatorDashboardEnvelope>(dashboard)?
                .operator_dashboard,
            monthly_stats: decode::<MonthlyStatsEnvelope>(monthly)?.monthly_stats,
            activity_gaps: decode::<ActivityGapsEnvelope>(gaps)?.activity_gaps,
            top_operators: decode(top)?,
            geo_distributions: decode(geo)?,
            anomalies: decode::<AnomaliesEnvelope>(anomalies)?.anomalies,
        })
    }

    pub async fn snapshot(&self) -> DashboardData {
        self.state.read().await.data.clone()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> ProxyResult<T> {
    Ok(serde_json::from_value(value)?)
}

/// Weekly pattern row with its display date label attached
#[derive(Debug, Clone, Serialize)]
pub struct FormattedWeeklyPattern {
    #[serde(flatten)]
    pub pattern: WeeklyPattern,
    #[serde(rename = "jour_formate")]
    pub day_label: String,
}

pub const WEEKLY_EXPORT_HEADERS: [&str; 6] = [
    "Date",
    "Jour",
    "ID Opérateur",
    "Nombre de connexions",
    "Clients uniques",
    "IPs uniques",
];

#[derive(Default)]
struct WeeklyState {
    all_patterns: Vec<WeeklyPattern>,
    in_app_patterns: Vec<WeeklyPattern>,
    loading: bool,
}

/// Holds both the unrestricted and the in-app-only weekly pattern sets so
/// toggling the filter never waits on the network.
pub struct WeeklyPatternsService {
    api: Arc<dyn InsightsApi>,
    state: RwLock<WeeklyState>,
    generation: AtomicU64,
}

impl WeeklyPatternsService {
    pub fn new(api: Arc<dyn InsightsApi>) -> Self {
        Self {
            api,
            state: RwLock::new(WeeklyState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn refresh(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let result = self.fetch_both().await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        match result {
            Ok((all_patterns, in_app_patterns)) => {
                state.all_patterns = all_patterns;
                state.in_app_patterns = in_app_patterns;
            }
            Err(e) => warn!("Weekly patterns refresh failed, keeping previous snapshot: {e}"),
        }
        state.loading = false;
    }

    async fn fetch_both(&self) -> ProxyResult<(Vec<WeeklyPattern>, Vec<WeeklyPattern>)> {
        let (all, in_app) = tokio::try_join!(
            self.api.fetch(
                Endpoint::WeeklyPatterns,
                FetchParams::new(None, Some(false))
            ),
            self.api
                .fetch(Endpoint::WeeklyPatterns, FetchParams::new(None, Some(true))),
        )?;
        Ok((
            decode::<WeeklyPatternsEnvelope>(all)?.weekly_patterns,
            decode::<WeeklyPatternsEnvelope>(in_app)?.weekly_patterns,
        ))
    }

    pub async fn patterns(&self, in_app_only: bool) -> Vec<WeeklyPattern> {
        let state = self.state.read().await;
        if in_app_only {
            state.in_app_patterns.clone()
        } else {
            state.all_patterns.clone()
        }
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Rows with a `dd/mm/yyyy` display label; unparseable dates keep an
    /// empty label, matching the chart's blank tick.
    pub async fn formatted(&self, in_app_only: bool) -> Vec<FormattedWeeklyPattern> {
        self.patterns(in_app_only)
            .await
            .into_iter()
            .map(|pattern| {
                let day_label = parse_backend_date(&pattern.day)
                    .map(short_date_label)
                    .unwrap_or_default();
                FormattedWeeklyPattern { pattern, day_label }
            })
            .collect()
    }

    /// Flat rows for CSV export, one per pattern record, columns matching
    /// [`WEEKLY_EXPORT_HEADERS`].
    pub async fn export_rows(&self, in_app_only: bool) -> Vec<Vec<String>> {
        self.patterns(in_app_only)
            .await
            .into_iter()
            .map(|pattern| {
                let date = parse_backend_date(&pattern.day)
                    .map(short_date_label)
                    .unwrap_or_else(|| pattern.day.clone());
                vec![
                    date,
                    pattern.day_name,
                    pattern.operator_id,
                    pattern.connections.to_string(),
                    pattern.unique_clients.to_string(),
                    pattern.unique_ips.to_string(),
                ]
            })
            .collect()
    }
}
