//! Line-oriented parser for free-text food analysis reports.
//!
//! A report body optionally wraps its entries in a `RAW ANALYSIS:` section.
//! Entries start on a line beginning with `FOOD:` and carry `key: value`
//! lines until the next entry.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const RAW_ANALYSIS_MARKER: &str = "RAW ANALYSIS:";
const PARSED_RESULTS_MARKER: &str = "PARSED RESULTS:";

static ENTRY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*food:").expect("valid entry pattern"));

/// Fields captured from one entry segment, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Position of the segment within its report, counted over non-empty segments.
    pub segment: usize,
    pub food: Option<String>,
    pub quantity: Option<String>,
    pub calories: Option<String>,
    pub microplastics: Option<String>,
    /// Upper-cased on capture.
    pub risk: Option<String>,
}

impl RawEntry {
    /// An entry is kept only when it names a food.
    pub fn has_food(&self) -> bool {
        self.food.as_deref().is_some_and(|f| !f.is_empty())
    }
}

/// Returns the text between `RAW ANALYSIS:` and `PARSED RESULTS:` (or the end),
/// or the whole content when there is no raw analysis section.
pub fn raw_analysis_section(content: &str) -> &str {
    let Some(start) = content.find(RAW_ANALYSIS_MARKER) else {
        return content;
    };
    let rest = &content[start + RAW_ANALYSIS_MARKER.len()..];
    let end = rest.find(PARSED_RESULTS_MARKER).unwrap_or(rest.len());
    rest[..end].trim()
}

/// Cuts `text` immediately before every line that starts with `FOOD:`.
///
/// Text preceding the first entry forms its own segment. Blank segments are
/// discarded.
pub fn split_segments(text: &str) -> Vec<&str> {
    let mut cuts: Vec<usize> = ENTRY_START.find_iter(text).map(|m| m.start()).collect();
    cuts.push(text.len());

    let mut segments = Vec::with_capacity(cuts.len());
    let mut from = 0;
    for to in cuts {
        let segment = &text[from..to];
        if !segment.trim().is_empty() {
            segments.push(segment);
        }
        from = to;
    }
    segments
}

/// Splits a line at its first colon into a lower-cased key and a trimmed value.
fn key_value(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim().to_lowercase(), value.trim()))
}

/// Collects the recognized fields of one segment. Later duplicates win.
pub fn parse_segment(segment: &str, index: usize) -> RawEntry {
    let mut entry = RawEntry {
        segment: index,
        ..Default::default()
    };

    for line in segment.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((key, value)) = key_value(line) else {
            continue;
        };
        let value = value.to_string();
        match key.as_str() {
            "food" => entry.food = Some(value),
            "quantity" => entry.quantity = Some(value),
            "calories" => entry.calories = Some(value),
            "microplastics" => entry.microplastics = Some(value),
            "risk" => entry.risk = Some(value.to_uppercase()),
            _ => {}
        }
    }

    entry
}

/// Extracts every food entry from a report body, in source order.
///
/// Never fails: malformed input yields fewer (possibly zero) entries.
pub fn parse_report_content(content: &str) -> Vec<RawEntry> {
    let segments = split_segments(raw_analysis_section(content));
    let total = segments.len();

    let entries: Vec<RawEntry> = segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| parse_segment(segment, index))
        .filter(RawEntry::has_food)
        .collect();

    let dropped = total - entries.len();
    if dropped > 0 {
        debug!(dropped, kept = entries.len(), "Dropped segments without a food name");
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLE: &str =
        "FOOD: Apple\nQUANTITY: 100g\nCALORIES: 52 kcal\nMICROPLASTICS: 0.5 mg/kg\nRISK: low";

    #[test]
    fn test_no_food_line_yields_nothing() {
        assert!(parse_report_content("").is_empty());
        assert!(parse_report_content("Summary: nothing detected\nRISK: HIGH").is_empty());
        assert!(parse_report_content("I ate seafood: shrimp").is_empty());
    }

    #[test]
    fn test_single_entry() {
        let entries = parse_report_content(APPLE);

        assert_eq!(entries.len(), 1);
        let apple = &entries[0];
        assert_eq!(apple.food.as_deref(), Some("Apple"));
        assert_eq!(apple.quantity.as_deref(), Some("100g"));
        assert_eq!(apple.calories.as_deref(), Some("52 kcal"));
        assert_eq!(apple.microplastics.as_deref(), Some("0.5 mg/kg"));
        assert_eq!(apple.risk.as_deref(), Some("LOW"));
    }

    #[test]
    fn test_multiple_entries_keep_order() {
        let content = "FOOD: Rice\nRISK: medium\n\nFOOD: Tuna\nRISK: HIGH\nfood: Milk";
        let foods: Vec<_> = parse_report_content(content)
            .into_iter()
            .map(|e| e.food.unwrap())
            .collect();
        assert_eq!(foods, vec!["Rice", "Tuna", "Milk"]);
    }

    #[test]
    fn test_raw_analysis_section_is_isolated() {
        let content = "Analysis Report\nDate: today\n\nRAW ANALYSIS:\nFOOD: Bread\nCALORIES: 80\n\n\
                       PARSED RESULTS:\nFOOD: Duplicate\n";

        assert_eq!(
            raw_analysis_section(content),
            "FOOD: Bread\nCALORIES: 80"
        );
        let entries = parse_report_content(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].food.as_deref(), Some("Bread"));
    }

    #[test]
    fn test_raw_analysis_without_parsed_results_runs_to_end() {
        let content = "header\nRAW ANALYSIS:\n  FOOD: Yogurt\n";
        assert_eq!(raw_analysis_section(content), "FOOD: Yogurt");
    }

    #[test]
    fn test_preamble_segment_is_dropped_but_counted() {
        let content = "Here is what I found:\nFOOD: Cheese\nRISK: low";
        let entries = parse_report_content(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].segment, 1);
    }

    #[test]
    fn test_lines_without_colon_and_unknown_keys_are_ignored() {
        let content = "FOOD: Soup\nthis line has no separator\nORIGIN: Italy\nQUANTITY: 1 bowl";
        let entry = &parse_report_content(content)[0];
        assert_eq!(entry.food.as_deref(), Some("Soup"));
        assert_eq!(entry.quantity.as_deref(), Some("1 bowl"));
    }

    #[test]
    fn test_value_splits_at_first_colon_only() {
        let entry = parse_segment("Food: Tomato soup: canned", 0);
        assert_eq!(entry.food.as_deref(), Some("Tomato soup: canned"));
    }

    #[test]
    fn test_empty_food_value_is_dropped() {
        assert!(parse_report_content("FOOD:\nRISK: HIGH").is_empty());
    }

    #[test]
    fn test_indented_and_crlf_entries() {
        let content = "  FOOD: Pasta\r\n  RISK: high\r\n";
        let entries = parse_report_content(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].food.as_deref(), Some("Pasta"));
        assert_eq!(entries[0].risk.as_deref(), Some("HIGH"));
    }

    #[test]
    fn test_split_segments_discards_blank_segments() {
        let segments = split_segments("\n\nFOOD: A\nFOOD: B\n");
        assert_eq!(segments, vec!["FOOD: A\n", "FOOD: B\n"]);
    }
}
