use std::collections::HashMap;

use crate::analyzers::types::{
    CommonItem, Impact, ItemAdvice, Recommendation, RecommendationReport,
};
use crate::normalize::{AnalysisRecord, RiskLevel};

/// Microplastic level (mg/kg) shown as a full exposure gauge.
pub const FULL_SCALE_LEVEL: f64 = 10.0;
/// Levels above this call for switching products.
pub const SWITCH_THRESHOLD: f64 = 5.0;
/// A food must appear this often to count as a common item.
pub const COMMON_ITEM_MIN_COUNT: usize = 2;

/// Converts a microplastic level into a 0-100 exposure gauge.
///
/// | Level (mg/kg) | Exposure |
/// |---------------|----------|
/// | 0             | 0        |
/// | 2.5           | 25       |
/// | 5             | 50       |
/// | >= 10         | 100      |
pub fn exposure_percent(level: f64) -> u8 {
    (level / FULL_SCALE_LEVEL * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn record_advice(record: &AnalysisRecord) -> &'static str {
    if record.microplastics_value() > SWITCH_THRESHOLD {
        "Switch to alternative products"
    } else {
        "Continue monitoring levels"
    }
}

/// Foods seen at least [`COMMON_ITEM_MIN_COUNT`] times, most frequent first.
///
/// Names are grouped case-insensitively and reported as first seen. The
/// average risk is the rounded mean of the tier ranks.
pub fn common_items(records: &[AnalysisRecord]) -> Vec<CommonItem> {
    let mut groups: HashMap<String, (String, usize, u32)> = HashMap::new();
    for record in records {
        let entry = groups
            .entry(record.food.to_lowercase())
            .or_insert_with(|| (record.food.clone(), 0, 0));
        entry.1 += 1;
        entry.2 += u32::from(record.risk.rank());
    }

    let mut items: Vec<CommonItem> = groups
        .into_values()
        .filter(|(_, count, _)| *count >= COMMON_ITEM_MIN_COUNT)
        .map(|(food, count, rank_sum)| {
            let average_rank = (f64::from(rank_sum) / count as f64).round() as u8;
            CommonItem {
                food,
                count,
                average_risk: RiskLevel::from_rank(average_rank),
            }
        })
        .collect();

    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.food.cmp(&b.food)));
    items
}

fn tips(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

/// Rule-based advice for the analyzed records.
pub fn recommendations(records: &[AnalysisRecord], common: &[CommonItem]) -> Vec<Recommendation> {
    let mut out = Vec::new();

    let high = records.iter().filter(|r| r.risk == RiskLevel::High).count();
    if high > 0 {
        out.push(Recommendation {
            category: Impact::High,
            title: "Avoid High-Risk Foods".to_string(),
            description: format!(
                "{high} of your recently analyzed foods showed high microplastic levels."
            ),
            tips: tips(&[
                "Choose fresh alternatives",
                "Check packaging materials",
                "Store in glass containers",
            ]),
        });
    }

    for item in common.iter().filter(|i| i.average_risk == RiskLevel::High) {
        out.push(Recommendation {
            category: Impact::High,
            title: format!("Replace {}", item.food),
            description: "This item appears frequently in your diet with high microplastic levels."
                .to_string(),
            tips: tips(&[
                "Find alternative products",
                "Check for glass-packaged options",
                "Consider making fresh at home",
            ]),
        });
    }

    out.push(Recommendation {
        category: Impact::Medium,
        title: "Water Filtration".to_string(),
        description: "Install a water filtration system to reduce microplastic exposure."
            .to_string(),
        tips: tips(&[
            "Research filter types",
            "Regular maintenance",
            "Use filtered water for cooking",
        ]),
    });
    out.push(Recommendation {
        category: Impact::Low,
        title: "Track Your Progress".to_string(),
        description: "Keep monitoring your food choices to reduce exposure.".to_string(),
        tips: tips(&["Regular scanning", "Note alternatives", "Check improvements"]),
    });

    out
}

pub fn recommendation_report(records: &[AnalysisRecord]) -> RecommendationReport {
    let common = common_items(records);
    RecommendationReport {
        recommendations: recommendations(records, &common),
        items: records
            .iter()
            .map(|r| ItemAdvice {
                id: r.id.clone(),
                food: r.food.clone(),
                exposure_percent: exposure_percent(r.microplastics_value()),
                advice: record_advice(r),
            })
            .collect(),
        common_items: common,
    }
}
