//! Gap-tracker segments parsed from an operator's pause description.
//!
//! The backend encodes detected pauses in a single text field, one
//! `"<date-range> (<N> jours)"` fragment per pause, joined by `"; "`.
//! Each fragment becomes one colour-coded tracker segment.

use serde::Serialize;

/// Severity tier for a single pause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseTier {
    Short,
    Medium,
    Long,
}

impl PauseTier {
    /// Fixed thresholds: more than 7 days is long, more than 3 is medium
    pub fn from_days(days: u32) -> Self {
        if days > 7 {
            PauseTier::Long
        } else if days > 3 {
            PauseTier::Medium
        } else {
            PauseTier::Short
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PauseTier::Long => "red",
            PauseTier::Medium => "yellow",
            PauseTier::Short => "green",
        }
    }
}

/// One tracker cell, in the same order as the source fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PauseSegment {
    pub key: usize,
    pub tier: PauseTier,
    pub color: &'static str,
    pub tooltip: String,
    pub days: u32,
}

/// Parse the leading integer of the duration fragment, stopping at the
/// first non-digit. No digits means a zero-duration pause.
fn leading_days(fragment: &str) -> u32 {
    let digits: String = fragment
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Split a pause description into tracker segments. Malformed fragments
/// (missing `" ("` or no parseable duration) become zero-duration short
/// segments rather than failing; blank input yields no segments.
pub fn pause_segments(detail: &str) -> Vec<PauseSegment> {
    if detail.trim().is_empty() {
        return Vec::new();
    }
    detail
        .split("; ")
        .enumerate()
        .map(|(key, fragment)| {
            let (dates, days) = match fragment.split_once(" (") {
                Some((dates, duration)) => (dates, leading_days(duration)),
                None => (fragment, 0),
            };
            let tier = PauseTier::from_days(days);
            PauseSegment {
                key,
                tier,
                color: tier.color(),
                tooltip: format!("{dates} ({days} jours)"),
                days,
            }
        })
        .collect()
}
