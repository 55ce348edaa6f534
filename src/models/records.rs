//! Wire-format records received from the external analytics backend.
//!
//! Field names on the wire are the backend's French column names; every
//! record is read-only and replaced wholesale on each fetch cycle.

use serde::{Deserialize, Serialize};

/// One row of the operator dashboard summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorSummary {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "nb_clients_total")]
    pub total_clients: i64,
    #[serde(rename = "nb_connexions_total")]
    pub total_connections: i64,
    #[serde(rename = "nb_pays_total")]
    pub total_countries: i64,
    #[serde(rename = "statut_activite")]
    pub activity_status: String,
    #[serde(rename = "anciennete", default)]
    pub account_age: Option<String>,
}

/// Per-operator, per-month connection volume with rank within the month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStat {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "mois")]
    pub month: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
    #[serde(rename = "rank_mois", default)]
    pub rank_in_month: Option<i64>,
}

/// Daily record of weekly activity; `day_of_week` and `day_name` always
/// describe the same weekday for well-formed data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPattern {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "jour_semaine")]
    pub day_of_week: u8,
    #[serde(rename = "nom_jour")]
    pub day_name: String,
    #[serde(rename = "jour")]
    pub day: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
    #[serde(rename = "nb_clients_uniques")]
    pub unique_clients: i64,
    #[serde(rename = "nb_ips_uniques")]
    pub unique_ips: i64,
}

/// Inactivity summary for one operator. `pause_detail` encodes each pause
/// as `"<date-range> (<N> jours)"`, pauses joined by `"; "`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityGap {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "nb_pauses_detectees")]
    pub pause_count: i64,
    #[serde(rename = "duree_moyenne_pause")]
    pub mean_pause_days: f64,
    #[serde(rename = "plus_longue_pause")]
    pub longest_pause_days: i64,
    #[serde(rename = "detail_pauses")]
    pub pause_detail: String,
}

/// A day where an operator deviated beyond the backend's statistical
/// threshold. `category` is one of the two fixed labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    pub date: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
    #[serde(rename = "moyenne_connexions")]
    pub mean_connections: f64,
    #[serde(rename = "variation_pourcentage")]
    pub variation_pct: f64,
    #[serde(rename = "type_anomalie")]
    pub category: String,
}

/// Fixed anomaly category labels used on the wire
pub const ANOMALY_SPIKE: &str = "Pic d'activité";
pub const ANOMALY_DROP: &str = "Chute d'activité";

/// Volume ranking entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopOperator {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "count")]
    pub connections: i64,
    pub unique_ips: i64,
    pub unique_clients: i64,
}

/// Per-country connection volume for one operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoDistribution {
    #[serde(rename = "lp_csid", default)]
    pub operator_id: Option<String>,
    #[serde(rename = "pays")]
    pub country: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyConnections {
    pub date: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
}

/// Detail view for a single operator (summary, pause analysis, daily and
/// per-country series)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorDetails {
    #[serde(rename = "lp_csid")]
    pub operator_id: String,
    #[serde(rename = "nb_clients_total")]
    pub total_clients: i64,
    #[serde(rename = "nb_connexions_total")]
    pub total_connections: i64,
    #[serde(rename = "nb_pays_total")]
    pub total_countries: i64,
    #[serde(rename = "statut_activite")]
    pub activity_status: String,
    #[serde(rename = "detail_pauses")]
    pub pause_detail: String,
    #[serde(rename = "duree_moyenne_pause")]
    pub mean_pause_days: f64,
    #[serde(rename = "plus_longue_pause")]
    pub longest_pause_days: i64,
    #[serde(rename = "nb_pauses_detectees")]
    pub pause_count: i64,
    #[serde(rename = "connexions_par_jour")]
    pub connections_by_day: Vec<DailyConnections>,
    #[serde(rename = "connexions_par_pays")]
    pub connections_by_country: Vec<GeoDistribution>,
}

// Response envelopes. The backend wraps most datasets in a single-key
// object; top-operators and geo-distributions arrive as bare arrays.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorDashboardEnvelope {
    #[serde(default)]
    pub operator_dashboard: Vec<OperatorSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlyStatsEnvelope {
    #[serde(default)]
    pub monthly_stats: Vec<MonthlyStat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeeklyPatternsEnvelope {
    #[serde(default)]
    pub weekly_patterns: Vec<WeeklyPattern>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityGapsEnvelope {
    #[serde(default)]
    pub activity_gaps: Vec<ActivityGap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomaliesEnvelope {
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}
