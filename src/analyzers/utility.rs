use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// First day of the month `back` months before the month containing `date`.
pub fn month_start(date: NaiveDate, back: u32) -> Option<NaiveDate> {
    date.with_day(1)?.checked_sub_months(Months::new(back))
}

/// `[first of month, first of next month)` as UTC instants.
pub fn month_window(first: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let next = first.checked_add_months(Months::new(1))?;
    Some((start_of_day(first), start_of_day(next)))
}
