use crate::analyzers::types::{Direction, PeriodBucket, Trend};

/// Compares the last two values of `values`.
///
/// | Case                 | Direction          | Magnitude                        |
/// |----------------------|--------------------|----------------------------------|
/// | fewer than 2 values  | up                 | 0                                |
/// | previous == 0        | down iff cur < prev| 0                                |
/// | otherwise            | down iff cur < prev| \|cur - prev\| / prev * 100      |
pub fn calculate_trend(values: &[f64]) -> Trend {
    let [.., previous, current] = values else {
        return Trend::default();
    };

    let direction = if current < previous {
        Direction::Down
    } else {
        Direction::Up
    };
    let magnitude_percent = if *previous == 0.0 {
        0.0
    } else {
        ((current - previous) / previous * 100.0).abs()
    };

    Trend {
        direction,
        magnitude_percent,
    }
}

/// Sets each bucket's trend against its predecessor's average microplastics.
pub fn annotate_trends(buckets: &mut [PeriodBucket]) {
    let averages: Vec<f64> = buckets.iter().map(|b| b.average_microplastics).collect();
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.trend = Some(calculate_trend(&averages[..=i]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_defaults_to_flat_up() {
        assert_eq!(calculate_trend(&[]), Trend::default());
        assert_eq!(
            calculate_trend(&[42.0]),
            Trend {
                direction: Direction::Up,
                magnitude_percent: 0.0
            }
        );
    }

    #[test]
    fn test_rising_series() {
        let trend = calculate_trend(&[10.0, 20.0, 30.0]);
        assert_eq!(trend.direction, Direction::Up);
        assert!((trend.magnitude_percent - 50.0).abs() < 1e-9);
        assert!(!trend.is_improvement());
    }

    #[test]
    fn test_falling_series() {
        let trend = calculate_trend(&[40.0, 30.0]);
        assert_eq!(trend.direction, Direction::Down);
        assert!((trend.magnitude_percent - 25.0).abs() < 1e-9);
        assert!(trend.is_improvement());
    }

    #[test]
    fn test_zero_previous_guard() {
        let trend = calculate_trend(&[0.0, 5.0]);
        assert_eq!(trend.direction, Direction::Up);
        assert_eq!(trend.magnitude_percent, 0.0);
    }

    #[test]
    fn test_equal_values_count_as_up() {
        let trend = calculate_trend(&[7.0, 7.0]);
        assert_eq!(trend.direction, Direction::Up);
        assert_eq!(trend.magnitude_percent, 0.0);
    }
}
