//! Data types produced by the aggregation pipeline.

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::normalize::{AnalysisRecord, RiskLevel};

/// Period size for time-bucket aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => bail!("unknown period '{other}', expected day, week, month or year"),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        })
    }
}

/// Whether sub-buckets without records are emitted (zeroed) or left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyBuckets {
    Emit,
    #[default]
    Omit,
}

/// Per-granularity aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    /// How many calendar months the month view covers, current month included.
    pub months: usize,
    pub week_days: EmptyBuckets,
    pub month_weeks: EmptyBuckets,
    pub year_months: EmptyBuckets,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            months: 3,
            week_days: EmptyBuckets::Omit,
            month_weeks: EmptyBuckets::Omit,
            year_months: EmptyBuckets::Omit,
        }
    }
}

impl AggregationConfig {
    /// Emits empty sub-buckets for the view of `granularity`. Day and week
    /// share the week's day buckets.
    pub fn emit_empty_for(mut self, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day | Granularity::Week => self.week_days = EmptyBuckets::Emit,
            Granularity::Month => self.month_weeks = EmptyBuckets::Emit,
            Granularity::Year => self.year_months = EmptyBuckets::Emit,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
}

/// Direction and relative size of the latest change in a series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Trend {
    pub direction: Direction,
    pub magnitude_percent: f64,
}

impl Trend {
    /// Less exposure is better, so a downward trend is an improvement.
    pub fn is_improvement(&self) -> bool {
        self.direction == Direction::Down
    }
}

/// Aggregated statistics for one time window `[start, end)`.
///
/// Top-level week and year buckets end at the reference instant, inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_count: usize,
    pub average_microplastics: f64,
    pub average_calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_buckets: Vec<PeriodBucket>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<AnalysisRecord>,
}

/// Record counts per risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    pub fn from_records(records: &[AnalysisRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            match record.risk {
                RiskLevel::Low => acc.low += 1,
                RiskLevel::Medium => acc.medium += 1,
                RiskLevel::High => acc.high += 1,
            }
            acc
        })
    }
}

/// One calendar month of the dashboard trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub total_analyses: usize,
    pub average_microplastics: f64,
    pub average_calories: f64,
}

/// Summary shown on the dashboard.
///
/// `Default` is the all-zero fallback used when reports cannot be loaded.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardStats {
    pub total_analyses: usize,
    pub average_microplastics: f64,
    pub average_calories: f64,
    pub risk_distribution: RiskDistribution,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub microplastics_trend: Trend,
    pub recent_analyses: Vec<AnalysisRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Impact {
    #[serde(rename = "High Impact")]
    High,
    #[serde(rename = "Medium Impact")]
    Medium,
    #[serde(rename = "Low Impact")]
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: Impact,
    pub title: String,
    pub description: String,
    pub tips: Vec<String>,
}

/// A food that shows up repeatedly in the analyzed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonItem {
    pub food: String,
    pub count: usize,
    pub average_risk: RiskLevel,
}

/// Per-record exposure gauge and advice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAdvice {
    pub id: String,
    pub food: String,
    pub exposure_percent: u8,
    pub advice: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub recommendations: Vec<Recommendation>,
    pub common_items: Vec<CommonItem>,
    pub items: Vec<ItemAdvice>,
}
