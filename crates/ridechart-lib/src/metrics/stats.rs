use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Samples that contributed, including forward-filled gaps.
    pub count: usize,
}

/// Min/max/average with non-finite samples forward-filled.
///
/// Samples before the first finite value have nothing to hold and are skipped.
/// Returns `None` when no finite sample exists.
pub fn series_stats(values: &[f64]) -> Option<SeriesStats> {
    let mut held: Option<f64> = None;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;
    for &raw in values {
        if raw.is_finite() {
            held = Some(raw);
        }
        let Some(v) = held else {
            continue;
        };
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(SeriesStats {
        min,
        max,
        avg: sum / count as f64,
        count,
    })
}

/// Stats over the inclusive window `[start, end]`, clamped to the series.
pub fn window_stats(values: &[f64], start: usize, end: usize) -> Option<SeriesStats> {
    if values.is_empty() || start >= values.len() {
        return None;
    }
    let end = end.min(values.len() - 1).max(start);
    series_stats(&values[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_plain_series() {
        let s = series_stats(&[1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert!((s.avg - 2.0).abs() < 1e-12);
        assert_eq!(s.count, 3);
    }

    #[test]
    fn gaps_are_forward_filled() {
        let s = series_stats(&[f64::NAN, 4.0, f64::NAN, f64::INFINITY, 8.0]).unwrap();
        // leading NaN skipped, two gaps held at 4
        assert_eq!(s.count, 4);
        assert!((s.avg - 5.0).abs() < 1e-12);
        assert_eq!(s.min, 4.0);
        assert_eq!(s.max, 8.0);
    }

    #[test]
    fn no_finite_values_gives_none() {
        assert!(series_stats(&[]).is_none());
        assert!(series_stats(&[f64::NAN, f64::NEG_INFINITY]).is_none());
    }

    #[test]
    fn window_is_clamped() {
        let values = [5.0, 1.0, 9.0, 2.0];
        let s = window_stats(&values, 1, 2).unwrap();
        assert_eq!((s.min, s.max), (1.0, 9.0));
        let s = window_stats(&values, 2, 100).unwrap();
        assert_eq!((s.min, s.max), (2.0, 9.0));
        assert!(window_stats(&values, 4, 5).is_none());
    }
}
