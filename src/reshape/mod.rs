//! Pure reshaping of flat backend records into chart-ready series.
//!
//! Every fold groups by exact key equality, emits one output record per
//! distinct key in order of first occurrence, and never mutates its input.
//! Empty input always yields empty output.

mod dates;

pub use dates::{long_date_label, month_label, parse_backend_date, short_date_label};

use serde::Serialize;

use crate::models::{Anomaly, GeoDistribution, MonthlyStat, WeeklyPattern};

/// One point of the monthly activity series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyActivity {
    #[serde(rename = "mois")]
    pub month: String,
    #[serde(rename = "connexions")]
    pub connections: i64,
}

/// Fold per-operator monthly stats into one point per month label,
/// summing connection counts. Months keep first-occurrence order.
pub fn monthly_activity(stats: &[MonthlyStat]) -> Vec<MonthlyActivity> {
    let mut series: Vec<MonthlyActivity> = Vec::new();
    for stat in stats {
        let label = match parse_backend_date(&stat.month) {
            Some(date) => month_label(date),
            None => stat.month.clone(),
        };
        match series.iter_mut().find(|point| point.month == label) {
            Some(point) => point.connections += stat.connections,
            None => series.push(MonthlyActivity {
                month: label,
                connections: stat.connections,
            }),
        }
    }
    series
}

/// Idempotence helper for re-aggregating an already grouped series
/// (grouping by an already-unique key changes nothing).
pub fn regroup_monthly(series: &[MonthlyActivity]) -> Vec<MonthlyActivity> {
    let mut out: Vec<MonthlyActivity> = Vec::new();
    for point in series {
        match out.iter_mut().find(|p| p.month == point.month) {
            Some(p) => p.connections += point.connections,
            None => out.push(point.clone()),
        }
    }
    out
}

/// Summed connections for one weekday
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyDayTotal {
    #[serde(rename = "jour_semaine")]
    pub day_of_week: u8,
    #[serde(rename = "nom_jour")]
    pub day_name: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
}

/// Detailed weekday rollup, also summing unique client and IP counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyDayBreakdown {
    #[serde(rename = "jour_semaine")]
    pub day_of_week: u8,
    #[serde(rename = "nom_jour")]
    pub day_name: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
    #[serde(rename = "nb_clients_uniques")]
    pub unique_clients: i64,
    #[serde(rename = "nb_ips_uniques")]
    pub unique_ips: i64,
}

/// Sum connections per day name, then order by the numeric day index.
/// The index field is authoritative for ordering, not the label.
pub fn weekly_connection_totals(patterns: &[WeeklyPattern]) -> Vec<WeeklyDayTotal> {
    let mut totals: Vec<WeeklyDayTotal> = Vec::new();
    for pattern in patterns {
        match totals.iter_mut().find(|t| t.day_name == pattern.day_name) {
            Some(total) => total.connections += pattern.connections,
            None => totals.push(WeeklyDayTotal {
                day_of_week: pattern.day_of_week,
                day_name: pattern.day_name.clone(),
                connections: pattern.connections,
            }),
        }
    }
    totals.sort_by_key(|t| t.day_of_week);
    totals
}

/// Detailed variant of [`weekly_connection_totals`]
pub fn weekly_day_breakdown(patterns: &[WeeklyPattern]) -> Vec<WeeklyDayBreakdown> {
    let mut totals: Vec<WeeklyDayBreakdown> = Vec::new();
    for pattern in patterns {
        match totals.iter_mut().find(|t| t.day_name == pattern.day_name) {
            Some(total) => {
                total.connections += pattern.connections;
                total.unique_clients += pattern.unique_clients;
                total.unique_ips += pattern.unique_ips;
            }
            None => totals.push(WeeklyDayBreakdown {
                day_of_week: pattern.day_of_week,
                day_name: pattern.day_name.clone(),
                connections: pattern.connections,
                unique_clients: pattern.unique_clients,
                unique_ips: pattern.unique_ips,
            }),
        }
    }
    totals.sort_by_key(|t| t.day_of_week);
    totals
}

/// Summed connections for one country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTotal {
    #[serde(rename = "pays")]
    pub country: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
}

/// Sum connections per country, ordered by total descending
pub fn geo_totals(distributions: &[GeoDistribution]) -> Vec<CountryTotal> {
    let mut totals: Vec<CountryTotal> = Vec::new();
    for dist in distributions {
        match totals.iter_mut().find(|t| t.country == dist.country) {
            Some(total) => total.connections += dist.connections,
            None => totals.push(CountryTotal {
                country: dist.country.clone(),
                connections: dist.connections,
            }),
        }
    }
    totals.sort_by(|a, b| b.connections.cmp(&a.connections));
    totals
}

/// Anomalies merged per (date label, category)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyGroup {
    #[serde(rename = "date")]
    pub date_label: String,
    #[serde(rename = "type_anomalie")]
    pub category: String,
    #[serde(rename = "nb_connexions")]
    pub connections: i64,
    #[serde(rename = "moyenne_connexions")]
    pub mean_connections: f64,
    #[serde(rename = "variation_pourcentage")]
    pub variation_pct: f64,
    #[serde(rename = "operateurs")]
    pub operator_ids: Vec<String>,
}

/// Merge anomalies sharing a date label and category. Connections are
/// summed; the mean-connections and variation fields merge by averaging
/// the accumulated value with each incoming value, so arrival order
/// matters from the third record onwards. That merge rule is part of the
/// established dashboard output and is kept as-is.
pub fn anomaly_groups(anomalies: &[Anomaly]) -> Vec<AnomalyGroup> {
    let mut groups: Vec<AnomalyGroup> = Vec::new();
    for anomaly in anomalies {
        let date_label = match parse_backend_date(&anomaly.date) {
            Some(date) => long_date_label(date),
            None => anomaly.date.clone(),
        };
        match groups
            .iter_mut()
            .find(|g| g.date_label == date_label && g.category == anomaly.category)
        {
            Some(group) => {
                group.connections += anomaly.connections;
                group.mean_connections = (group.mean_connections + anomaly.mean_connections) / 2.0;
                group.variation_pct = (group.variation_pct + anomaly.variation_pct) / 2.0;
                group.operator_ids.push(anomaly.operator_id.clone());
            }
            None => groups.push(AnomalyGroup {
                date_label,
                category: anomaly.category.clone(),
                connections: anomaly.connections,
                mean_connections: anomaly.mean_connections,
                variation_pct: anomaly.variation_pct,
                operator_ids: vec![anomaly.operator_id.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ANOMALY_DROP, ANOMALY_SPIKE};

    fn monthly(operator: &str, month: &str, connections: i64) -> MonthlyStat {
        MonthlyStat {
            operator_id: operator.to_string(),
            month: month.to_string(),
            connections,
            rank_in_month: None,
        }
    }

    fn pattern(day_of_week: u8, day_name: &str, connections: i64) -> WeeklyPattern {
        WeeklyPattern {
            operator_id: "op-1".to_string(),
            day_of_week,
            day_name: day_name.to_string(),
            day: "2024-01-05".to_string(),
            connections,
            unique_clients: 2,
            unique_ips: 3,
        }
    }

    fn anomaly(operator: &str, date: &str, category: &str, mean: f64, variation: f64) -> Anomaly {
        Anomaly {
            operator_id: operator.to_string(),
            date: date.to_string(),
            connections: 100,
            mean_connections: mean,
            variation_pct: variation,
            category: category.to_string(),
        }
    }

    #[test]
    fn monthly_activity_sums_by_label_in_first_occurrence_order() {
        let stats = vec![
            monthly("a", "2024-01", 5),
            monthly("b", "2024-01", 3),
            monthly("a", "2024-02", 1),
        ];
        let series = monthly_activity(&stats);
        assert_eq!(
            series,
            vec![
                MonthlyActivity {
                    month: "janv. 2024".to_string(),
                    connections: 8
                },
                MonthlyActivity {
                    month: "févr. 2024".to_string(),
                    connections: 1
                },
            ]
        );
    }

    #[test]
    fn monthly_activity_is_idempotent_on_its_own_output() {
        let stats = vec![
            monthly("a", "2024-01-01T00:00:00", 5),
            monthly("b", "2024-01-15", 3),
            monthly("a", "2024-02-01", 1),
        ];
        let once = monthly_activity(&stats);
        assert_eq!(regroup_monthly(&once), once);
    }

    #[test]
    fn monthly_activity_keeps_raw_label_for_unparseable_dates() {
        let series = monthly_activity(&[monthly("a", "n/a", 4), monthly("b", "n/a", 2)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].month, "n/a");
        assert_eq!(series[0].connections, 6);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(monthly_activity(&[]).is_empty());
        assert!(weekly_connection_totals(&[]).is_empty());
        assert!(weekly_day_breakdown(&[]).is_empty());
        assert!(geo_totals(&[]).is_empty());
        assert!(anomaly_groups(&[]).is_empty());
    }

    #[test]
    fn weekly_totals_sort_by_day_index_regardless_of_input_order() {
        let patterns = vec![
            pattern(5, "vendredi", 4),
            pattern(1, "lundi", 10),
            pattern(5, "vendredi", 6),
            pattern(3, "mercredi", 1),
        ];
        let totals = weekly_connection_totals(&patterns);
        assert_eq!(totals.len(), 3);
        assert_eq!(
            totals.iter().map(|t| t.day_of_week).collect::<Vec<_>>(),
            vec![1, 3, 5]
        );
        assert_eq!(totals[2].connections, 10);
    }

    #[test]
    fn weekly_breakdown_sums_all_three_counts() {
        let patterns = vec![pattern(2, "mardi", 4), pattern(2, "mardi", 6)];
        let breakdown = weekly_day_breakdown(&patterns);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].connections, 10);
        assert_eq!(breakdown[0].unique_clients, 4);
        assert_eq!(breakdown[0].unique_ips, 6);
    }

    #[test]
    fn geo_totals_order_by_summed_volume_descending() {
        let distributions = vec![
            GeoDistribution {
                operator_id: None,
                country: "FR".to_string(),
                connections: 5,
            },
            GeoDistribution {
                operator_id: None,
                country: "DE".to_string(),
                connections: 20,
            },
            GeoDistribution {
                operator_id: None,
                country: "FR".to_string(),
                connections: 30,
            },
        ];
        let totals = geo_totals(&distributions);
        assert_eq!(totals[0].country, "FR");
        assert_eq!(totals[0].connections, 35);
        assert_eq!(totals[1].country, "DE");
    }

    #[test]
    fn anomaly_groups_split_by_category_on_the_same_date() {
        let anomalies = vec![
            anomaly("a", "2024-01-05", ANOMALY_SPIKE, 10.0, 50.0),
            anomaly("b", "2024-01-05", ANOMALY_DROP, 10.0, 40.0),
        ];
        let groups = anomaly_groups(&anomalies);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date_label, "5 janvier 2024");
        assert_eq!(groups[0].category, ANOMALY_SPIKE);
        assert_eq!(groups[1].category, ANOMALY_DROP);
    }

    #[test]
    fn anomaly_merge_averages_pairwise_not_weighted() {
        let anomalies = vec![
            anomaly("a", "2024-01-05", ANOMALY_SPIKE, 10.0, 30.0),
            anomaly("b", "2024-01-05", ANOMALY_SPIKE, 20.0, 60.0),
            anomaly("c", "2024-01-05", ANOMALY_SPIKE, 40.0, 90.0),
        ];
        let groups = anomaly_groups(&anomalies);
        assert_eq!(groups.len(), 1);
        // ((10 + 20) / 2 + 40) / 2, not (10 + 20 + 40) / 3
        assert_eq!(groups[0].mean_connections, 27.5);
        assert_eq!(groups[0].variation_pct, 67.5);
        assert_eq!(groups[0].connections, 300);
        assert_eq!(groups[0].operator_ids, vec!["a", "b", "c"]);
    }
}
