//! Dashboard summary: totals, risk mix and the monthly exposure chart.

use chrono::{DateTime, Utc};

use crate::analyzers::aggregate::{summarize, within};
use crate::analyzers::trend::calculate_trend;
use crate::analyzers::types::{DashboardStats, MonthlyTrend, RiskDistribution};
use crate::analyzers::utility::{mean, month_start, month_window};
use crate::normalize::AnalysisRecord;

/// Calendar months in the chart, current month included.
pub const TREND_MONTHS: u32 = 7;
/// Records listed under "recent analyses".
pub const RECENT_ANALYSES: usize = 10;

/// Builds the dashboard summary for `records` relative to `now`.
///
/// An empty slice yields the zeroed summary with seven empty months, which is
/// what the dashboard shows when reports cannot be loaded.
pub fn dashboard_stats(records: &[AnalysisRecord], now: DateTime<Utc>) -> DashboardStats {
    let microplastics: Vec<f64> = records.iter().map(AnalysisRecord::microplastics_value).collect();
    let calories: Vec<f64> = records.iter().map(AnalysisRecord::calories_value).collect();

    let monthly_trends = monthly_trends(records, now);
    let series: Vec<f64> = monthly_trends.iter().map(|m| m.average_microplastics).collect();

    DashboardStats {
        total_analyses: records.len(),
        average_microplastics: mean(&microplastics),
        average_calories: mean(&calories),
        risk_distribution: RiskDistribution::from_records(records),
        microplastics_trend: calculate_trend(&series),
        monthly_trends,
        recent_analyses: records.iter().take(RECENT_ANALYSES).cloned().collect(),
    }
}

fn monthly_trends(records: &[AnalysisRecord], now: DateTime<Utc>) -> Vec<MonthlyTrend> {
    let today = now.date_naive();
    (0..TREND_MONTHS)
        .rev()
        .filter_map(|back| {
            let first = month_start(today, back)?;
            let (start, end) = month_window(first)?;
            let bucket = summarize(first.format("%b").to_string(), start, end, &within(records, start, end));
            Some(MonthlyTrend {
                month: bucket.label,
                total_analyses: bucket.item_count,
                average_microplastics: bucket.average_microplastics,
                average_calories: bucket.average_calories,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Direction;
    use crate::normalize::RiskLevel;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn record(id: usize, risk: RiskLevel, level: &str, calories: &str, month: u32) -> AnalysisRecord {
        AnalysisRecord {
            id: id.to_string(),
            food: "Item".to_string(),
            quantity: None,
            calories: Some(calories.to_string()),
            microplastic_level: Some(level.to_string()),
            risk,
            risk_defaulted: false,
            timestamp: Utc.with_ymd_and_hms(2026, month, 3, 9, 0, 0).unwrap(),
            timestamp_defaulted: false,
        }
    }

    #[test]
    fn test_empty_dashboard_is_zeroed() {
        let stats = dashboard_stats(&[], now());

        assert_eq!(stats.total_analyses, 0);
        assert_eq!(stats.average_microplastics, 0.0);
        assert_eq!(stats.risk_distribution, RiskDistribution::default());
        assert_eq!(stats.monthly_trends.len(), 7);
        assert_eq!(stats.monthly_trends[0].month, "Apr");
        assert_eq!(stats.monthly_trends[6].month, "Oct");
        assert!(stats.monthly_trends.iter().all(|m| m.total_analyses == 0));
        assert!(stats.recent_analyses.is_empty());
    }

    #[test]
    fn test_dashboard_totals() {
        let records = vec![
            record(1, RiskLevel::Low, "10 mg/kg", "100 kcal", 8),
            record(2, RiskLevel::High, "20 mg/kg", "none", 9),
            record(3, RiskLevel::High, "30 mg/kg", "200 kcal", 10),
            record(4, RiskLevel::Medium, "unknown", "300 kcal", 10),
        ];

        let stats = dashboard_stats(&records, now());

        assert_eq!(stats.total_analyses, 4);
        assert_eq!(stats.average_microplastics, 15.0);
        assert_eq!(stats.average_calories, 150.0);
        assert_eq!(
            stats.risk_distribution,
            RiskDistribution {
                low: 1,
                medium: 1,
                high: 2
            }
        );

        let october = &stats.monthly_trends[6];
        assert_eq!(october.total_analyses, 2);
        assert_eq!(october.average_microplastics, 15.0);
        assert_eq!(october.average_calories, 250.0);

        // September 20 -> October 15
        assert_eq!(stats.microplastics_trend.direction, Direction::Down);
        assert!((stats.microplastics_trend.magnitude_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_recent_analyses_keep_source_order() {
        let records: Vec<_> = (0..15)
            .map(|i| record(i, RiskLevel::Low, "1", "1", 10))
            .collect();
        let stats = dashboard_stats(&records, now());
        assert_eq!(stats.recent_analyses.len(), RECENT_ANALYSES);
        assert_eq!(stats.recent_analyses[0].id, "0");
        assert_eq!(stats.recent_analyses[9].id, "9");
    }
}
