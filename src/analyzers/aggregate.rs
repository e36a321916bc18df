use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::analyzers::trend::annotate_trends;
use crate::analyzers::types::{AggregationConfig, EmptyBuckets, Granularity, PeriodBucket};
use crate::analyzers::utility::{mean, month_start, month_window, start_of_day};
use crate::normalize::AnalysisRecord;

/// Days covered by the week view, today included.
const WEEK_DAYS: u64 = 7;
/// Fixed 7-day spans per month; the last one absorbs days 29-31.
const SPANS_PER_MONTH: u64 = 4;

/// Groups `records` into period buckets relative to `now`, earliest first.
///
/// - `Day`: one bucket per calendar day of the last 7 days.
/// - `Week`: a single "This Week" bucket nesting the day buckets.
/// - `Month`: one bucket per recent month, nesting 7-day spans.
/// - `Year`: a single bucket for the current year, nesting calendar months.
///
/// Top-level buckets are always emitted; empty sub-buckets follow the
/// matching [`EmptyBuckets`] policy in `config`.
#[tracing::instrument(skip(records, config), fields(records = records.len()))]
pub fn aggregate(
    records: &[AnalysisRecord],
    granularity: Granularity,
    now: DateTime<Utc>,
    config: &AggregationConfig,
) -> Vec<PeriodBucket> {
    let buckets = match granularity {
        Granularity::Day => aggregate_week(records, now, config.week_days).sub_buckets,
        Granularity::Week => vec![aggregate_week(records, now, config.week_days)],
        Granularity::Month => aggregate_months(records, now, config.months, config.month_weeks),
        Granularity::Year => aggregate_year(records, now, config.year_months)
            .into_iter()
            .collect(),
    };
    debug!(%granularity, buckets = buckets.len(), "Aggregation complete");
    buckets
}

/// Reverses bucket order at every level, for most-recent-first display.
pub fn newest_first(mut buckets: Vec<PeriodBucket>) -> Vec<PeriodBucket> {
    buckets.reverse();
    for bucket in &mut buckets {
        bucket.sub_buckets = newest_first(std::mem::take(&mut bucket.sub_buckets));
    }
    buckets
}

/// Records with `start <= timestamp < end`.
pub(crate) fn within<'a, I>(records: I, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&'a AnalysisRecord>
where
    I: IntoIterator<Item = &'a AnalysisRecord>,
{
    records
        .into_iter()
        .filter(|r| r.timestamp >= start && r.timestamp < end)
        .collect()
}

/// Builds a bucket with count and averages over `members`.
pub(crate) fn summarize(
    label: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    members: &[&AnalysisRecord],
) -> PeriodBucket {
    let microplastics: Vec<f64> = members.iter().map(|r| r.microplastics_value()).collect();
    let calories: Vec<f64> = members.iter().map(|r| r.calories_value()).collect();

    PeriodBucket {
        label,
        start,
        end,
        item_count: members.len(),
        average_microplastics: mean(&microplastics),
        average_calories: mean(&calories),
        trend: None,
        sub_buckets: Vec::new(),
        items: Vec::new(),
    }
}

fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    let date = day.format("%B %-d");
    if day == today {
        format!("Today, {date}")
    } else if today.pred_opt() == Some(day) {
        format!("Yesterday, {date}")
    } else {
        format!("{}, {date}", day.format("%A"))
    }
}

fn aggregate_week(records: &[AnalysisRecord], now: DateTime<Utc>, policy: EmptyBuckets) -> PeriodBucket {
    let today = now.date_naive();
    let first_day = today.checked_sub_days(Days::new(WEEK_DAYS - 1)).unwrap_or(today);
    let start = start_of_day(first_day);

    // The window closes at `now`, inclusive.
    let members: Vec<&AnalysisRecord> = records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= now)
        .collect();
    let mut week = summarize("This Week".to_string(), start, now, &members);

    let mut days = Vec::new();
    for offset in 0..WEEK_DAYS {
        let Some(day) = first_day.checked_add_days(Days::new(offset)) else {
            continue;
        };
        let day_start = start_of_day(day);
        let day_end = day_start + Duration::days(1);
        let day_members = within(members.iter().copied(), day_start, day_end);
        if day_members.is_empty() && policy == EmptyBuckets::Omit {
            continue;
        }

        let mut bucket = summarize(day_label(day, today), day_start, day_end.min(now), &day_members);
        bucket.items = day_members.into_iter().cloned().collect();
        days.push(bucket);
    }

    annotate_trends(&mut days);
    week.sub_buckets = days;
    week
}

fn aggregate_months(
    records: &[AnalysisRecord],
    now: DateTime<Utc>,
    months: usize,
    policy: EmptyBuckets,
) -> Vec<PeriodBucket> {
    let today = now.date_naive();
    let mut buckets: Vec<PeriodBucket> = (0..months)
        .rev()
        .filter_map(|back| u32::try_from(back).ok())
        .filter_map(|back| month_bucket(records, month_start(today, back)?, policy))
        .collect();
    annotate_trends(&mut buckets);
    buckets
}

fn month_bucket(records: &[AnalysisRecord], first: NaiveDate, policy: EmptyBuckets) -> Option<PeriodBucket> {
    let (start, end) = month_window(first)?;
    let members = within(records, start, end);
    let mut month = summarize(first.format("%B %Y").to_string(), start, end, &members);

    let mut spans = Vec::new();
    for span in 0..SPANS_PER_MONTH {
        let Some(span_first) = first.checked_add_days(Days::new(span * 7)) else {
            continue;
        };
        let span_start = start_of_day(span_first);
        let span_end = if span + 1 == SPANS_PER_MONTH {
            end
        } else {
            span_start + Duration::days(7)
        };
        let span_members = within(members.iter().copied(), span_start, span_end);
        if span_members.is_empty() && policy == EmptyBuckets::Omit {
            continue;
        }

        let last_day = (span_end - Duration::days(1)).day();
        let label = format!(
            "Week {} ({} {}-{})",
            span + 1,
            first.format("%b"),
            span_first.day(),
            last_day
        );
        spans.push(summarize(label, span_start, span_end, &span_members));
    }

    annotate_trends(&mut spans);
    month.sub_buckets = spans;
    Some(month)
}

fn aggregate_year(records: &[AnalysisRecord], now: DateTime<Utc>, policy: EmptyBuckets) -> Option<PeriodBucket> {
    let year = now.year();
    let start = start_of_day(NaiveDate::from_ymd_opt(year, 1, 1)?);

    // The window closes at `now`, inclusive.
    let members: Vec<&AnalysisRecord> = records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= now)
        .collect();
    let mut bucket = summarize(year.to_string(), start, now, &members);

    let mut months = Vec::new();
    for month in 1..=12 {
        let Some((from, to)) = NaiveDate::from_ymd_opt(year, month, 1).and_then(month_window)
        else {
            continue;
        };
        let month_members = within(members.iter().copied(), from, to);
        if month_members.is_empty() && policy == EmptyBuckets::Omit {
            continue;
        }
        months.push(summarize(from.format("%B").to_string(), from, to.min(now), &month_members));
    }

    annotate_trends(&mut months);
    bucket.sub_buckets = months;
    Some(bucket)
}
