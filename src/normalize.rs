//! Normalization of parsed entries into typed [`AnalysisRecord`]s.
//!
//! Every coercion here has a documented default instead of an error path:
//! unknown risk tiers become [`RiskLevel::Medium`], unparsable numbers become
//! `0`, and unusable timestamps become the processing time. Defaults are
//! reported through [`Normalized::defaulted`] so callers can tell an explicit
//! value from a substituted one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::parser::{RawEntry, parse_report_content};
use crate::report::Report;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid number pattern"));

/// Naive layouts accepted after RFC 3339; read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Canonical risk tier of a food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// Matches the upper-cased input exactly against `LOW`, `MEDIUM`, `HIGH`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "LOW" => Some(RiskLevel::Low),
            "MEDIUM" => Some(RiskLevel::Medium),
            "HIGH" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    /// Severity rank: `Low = 0`, `Medium = 1`, `High = 2`.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Inverse of [`RiskLevel::rank`], saturating at `High`.
    pub fn from_rank(rank: u8) -> Self {
        match rank {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized value plus whether it came from the default policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Normalized<T> {
    pub fn explicit(value: T) -> Self {
        Normalized {
            value,
            defaulted: false,
        }
    }

    pub fn defaulted(value: T) -> Self {
        Normalized {
            value,
            defaulted: true,
        }
    }
}

/// One food item extracted from a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    /// `{report_id}-{segment}`, unique within one processing run.
    pub id: String,
    pub food: String,
    pub quantity: Option<String>,
    pub calories: Option<String>,
    pub microplastic_level: Option<String>,
    pub risk: RiskLevel,
    pub risk_defaulted: bool,
    pub timestamp: DateTime<Utc>,
    pub timestamp_defaulted: bool,
}

impl AnalysisRecord {
    /// Leading number of the microplastic level, `0` when absent.
    pub fn microplastics_value(&self) -> f64 {
        numeric_or_zero(self.microplastic_level.as_deref())
    }

    /// Leading number of the calorie field, `0` when absent.
    pub fn calories_value(&self) -> f64 {
        numeric_or_zero(self.calories.as_deref())
    }
}

/// First decimal number in `text` (`"5.2 mg/kg"` → `5.2`), if any.
pub fn extract_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

pub fn numeric_or_zero(text: Option<&str>) -> f64 {
    text.and_then(extract_number).unwrap_or(0.0)
}

/// Canonicalizes a risk label; anything unrecognized defaults to `MEDIUM`.
pub fn normalize_risk(value: Option<&str>) -> Normalized<RiskLevel> {
    match value.and_then(RiskLevel::parse) {
        Some(level) => Normalized::explicit(level),
        None => Normalized::defaulted(RiskLevel::Medium),
    }
}

/// Parses RFC 3339, naive date-times, bare dates and epoch milliseconds.
/// Naive values are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Picks the report time: `timestamp`, then `created`, then `now`.
///
/// The first non-blank candidate decides; if it does not parse, `now` is
/// used and the result is flagged as defaulted.
pub fn resolve_timestamp(
    timestamp: Option<&str>,
    created: Option<&str>,
    now: DateTime<Utc>,
) -> Normalized<DateTime<Utc>> {
    let candidate = [timestamp, created]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty());

    match candidate.and_then(parse_timestamp) {
        Some(ts) => Normalized::explicit(ts),
        None => Normalized::defaulted(now),
    }
}

/// Builds a record from a parsed entry. Returns `None` when the entry has no food.
pub fn normalize_entry(
    entry: RawEntry,
    id: String,
    timestamp: Normalized<DateTime<Utc>>,
) -> Option<AnalysisRecord> {
    if !entry.has_food() {
        return None;
    }
    let risk = normalize_risk(entry.risk.as_deref());

    Some(AnalysisRecord {
        id,
        food: entry.food?,
        quantity: entry.quantity,
        calories: entry.calories,
        microplastic_level: entry.microplastics,
        risk: risk.value,
        risk_defaulted: risk.defaulted,
        timestamp: timestamp.value,
        timestamp_defaulted: timestamp.defaulted,
    })
}

/// Parses and normalizes every entry of every report, preserving order.
#[tracing::instrument(skip_all, fields(reports = reports.len()))]
pub fn collect_records(reports: &[Report], now: DateTime<Utc>) -> Vec<AnalysisRecord> {
    let mut records = Vec::new();

    for (index, report) in reports.iter().enumerate() {
        if report.content.trim().is_empty() {
            warn!(report_id = %report.id, "Report has no content, skipping");
            continue;
        }

        let timestamp = resolve_timestamp(
            report.timestamp.as_deref(),
            report.created.as_deref(),
            now,
        );
        if timestamp.defaulted {
            debug!(report_id = %report.id, "Report time missing or invalid, using now");
        }

        for entry in parse_report_content(&report.content) {
            let id = if report.id.trim().is_empty() {
                format!("#{index}-{}", entry.segment)
            } else {
                format!("{}-{}", report.id, entry.segment)
            };
            records.extend(normalize_entry(entry, id, timestamp));
        }
    }

    debug!(records = records.len(), "Reports normalized");
    records
}
